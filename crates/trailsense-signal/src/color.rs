use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SignalError;

/// Status LED color intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalColor {
    Red,
    Green,
    Amber,
    Off,
}

impl SignalColor {
    pub const ALL: [SignalColor; 4] = [
        SignalColor::Red,
        SignalColor::Green,
        SignalColor::Amber,
        SignalColor::Off,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalColor::Red => "RED",
            SignalColor::Green => "GREEN",
            SignalColor::Amber => "AMBER",
            SignalColor::Off => "OFF",
        }
    }

    /// Single-byte command understood by the LED bridge firmware.
    pub fn wire_byte(self) -> u8 {
        match self {
            SignalColor::Red => b'R',
            SignalColor::Green => b'G',
            SignalColor::Amber => b'A',
            SignalColor::Off => b'O',
        }
    }
}

impl fmt::Display for SignalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalColor {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalColor::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SignalError::UnknownColor(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("amber".parse::<SignalColor>().unwrap(), SignalColor::Amber);
        assert_eq!(" Off ".parse::<SignalColor>().unwrap(), SignalColor::Off);
        assert!("BLUE".parse::<SignalColor>().is_err());
    }

    #[test]
    fn wire_bytes_are_distinct() {
        let bytes: Vec<u8> = SignalColor::ALL.iter().map(|c| c.wire_byte()).collect();
        assert_eq!(bytes, b"RGAO".to_vec());
    }

    #[test]
    fn serializes_as_uppercase_name() {
        let json = serde_json::to_string(&SignalColor::Green).unwrap();
        assert_eq!(json, "\"GREEN\"");
    }
}
