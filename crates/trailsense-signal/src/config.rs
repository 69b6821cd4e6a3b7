use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{SignalError, SignalPort, SimulatedSignal};

/// Environment variable that selects the signal backend at startup.
pub const BACKEND_ENV_VAR: &str = "TRAILBACK_HW";

/// Which implementation drives the status LED.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalBackend {
    #[default]
    Simulated,
    Serial,
}

impl fmt::Display for SignalBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalBackend::Simulated => f.write_str("SIMULATED"),
            SignalBackend::Serial => f.write_str("SERIAL"),
        }
    }
}

impl FromStr for SignalBackend {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIM" | "SIMULATED" => Ok(SignalBackend::Simulated),
            "SERIAL" => Ok(SignalBackend::Serial),
            _ => Err(SignalError::UnknownBackend(s.to_string())),
        }
    }
}

/// Signal port configuration, usually embedded in the top-level config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub backend: SignalBackend,
    /// Serial device path used by the `SERIAL` backend.
    pub port: String,
    pub baud_rate: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            backend: SignalBackend::Simulated,
            port: "/dev/ttyMSM0".to_string(),
            baud_rate: 9600,
        }
    }
}

impl SignalConfig {
    /// Apply `TRAILBACK_HW` if it is set.
    ///
    /// Only an explicit `SERIAL` value switches to the serial bridge; any other
    /// value selects the simulated port.
    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(BACKEND_ENV_VAR).ok();
        self.with_backend_override(value.as_deref())
    }

    pub fn with_backend_override(mut self, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.backend = match value.parse() {
                Ok(SignalBackend::Serial) => SignalBackend::Serial,
                _ => SignalBackend::Simulated,
            };
        }
        self
    }
}

/// Build the port described by `config`.
///
/// A serial device that cannot be opened yields an inert port (see
/// [`crate::SerialSignal::open`]); only a backend missing from this build is
/// reported as an error.
pub fn open_signal_port(config: &SignalConfig) -> Result<Box<dyn SignalPort>, SignalError> {
    match config.backend {
        SignalBackend::Simulated => {
            log::info!(target: "trailsense::hw", "using simulated LED signal port");
            Ok(Box::new(SimulatedSignal))
        }
        #[cfg(feature = "serial")]
        SignalBackend::Serial => Ok(Box::new(crate::SerialSignal::open(
            &config.port,
            config.baud_rate,
        ))),
        #[cfg(not(feature = "serial"))]
        SignalBackend::Serial => Err(SignalError::Unsupported("serial")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_bridge() {
        let cfg = SignalConfig::default();
        assert_eq!(cfg.backend, SignalBackend::Simulated);
        assert_eq!(cfg.port, "/dev/ttyMSM0");
        assert_eq!(cfg.baud_rate, 9600);
    }

    #[test]
    fn override_selects_serial_only_when_asked() {
        let cfg = SignalConfig::default().with_backend_override(Some("SERIAL"));
        assert_eq!(cfg.backend, SignalBackend::Serial);

        let cfg = cfg.with_backend_override(Some("usb"));
        assert_eq!(cfg.backend, SignalBackend::Simulated);

        let serial = SignalConfig {
            backend: SignalBackend::Serial,
            ..SignalConfig::default()
        };
        assert_eq!(
            serial.with_backend_override(None).backend,
            SignalBackend::Serial
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SignalConfig = serde_json::from_str(r#"{ "backend": "SERIAL" }"#).unwrap();
        assert_eq!(cfg.backend, SignalBackend::Serial);
        assert_eq!(cfg.baud_rate, 9600);
    }

    #[test]
    fn simulated_backend_always_opens() {
        let mut port = open_signal_port(&SignalConfig::default()).unwrap();
        port.signal(crate::SignalColor::Green);
    }

    #[cfg(feature = "serial")]
    #[test]
    fn missing_serial_device_yields_inert_port() {
        let cfg = SignalConfig {
            backend: SignalBackend::Serial,
            port: "/nonexistent/trailsense-bridge".to_string(),
            ..SignalConfig::default()
        };
        let mut port = open_signal_port(&cfg).unwrap();
        port.signal(crate::SignalColor::Red);
    }
}
