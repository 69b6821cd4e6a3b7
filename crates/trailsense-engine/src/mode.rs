use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use trailsense_signal::SignalColor;

use crate::EngineError;

/// Navigation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Capture landmarks while moving through new terrain.
    #[default]
    Explore,
    /// Recognize stored landmarks to find the way back.
    Return,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Explore => "EXPLORE",
            Mode::Return => "RETURN",
        }
    }

    /// Status line shown right after entering this mode.
    pub fn entry_status(self) -> &'static str {
        match self {
            Mode::Explore => "EXPLORATION MODE ACTIVE",
            Mode::Return => "RETURN NAVIGATION ACTIVE",
        }
    }

    /// Signal emitted when entering this mode.
    pub fn entry_signal(self) -> SignalColor {
        match self {
            Mode::Explore => SignalColor::Green,
            Mode::Return => SignalColor::Amber,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match on `"EXPLORE"` / `"RETURN"`.
impl FromStr for Mode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXPLORE" => Ok(Mode::Explore),
            "RETURN" => Ok(Mode::Return),
            other => Err(EngineError::InvalidMode(other.to_string())),
        }
    }
}
