use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::SignalColor;

/// Sink for status LED color intents.
///
/// Implementations must never fail towards the caller: a color that cannot be
/// delivered is logged and dropped.
pub trait SignalPort: Send {
    fn signal(&mut self, color: SignalColor);
}

impl<T: SignalPort + ?Sized> SignalPort for Box<T> {
    fn signal(&mut self, color: SignalColor) {
        (**self).signal(color)
    }
}

/// Port that ignores every signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSignal;

impl SignalPort for NullSignal {
    fn signal(&mut self, _color: SignalColor) {}
}

/// Development stand-in for the LED bridge: every color goes to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedSignal;

impl SignalPort for SimulatedSignal {
    fn signal(&mut self, color: SignalColor) {
        log::info!(target: "trailsense::hw", "HARDWARE_SIM: LED set to {color}");
    }
}

/// Port that remembers every color it receives.
///
/// Clones share the same history, so a test or a dry-run report can keep one
/// handle while the engine owns another.
#[derive(Clone, Debug, Default)]
pub struct RecordingSignal {
    history: Arc<Mutex<Vec<SignalColor>>>,
}

impl RecordingSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<SignalColor> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<SignalColor> {
        self.lock().last().copied()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SignalColor>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SignalPort for RecordingSignal {
    fn signal(&mut self, color: SignalColor) {
        self.lock().push(color);
    }
}

/// Line protocol over any byte link: one command byte (`R`, `G`, `A`, `O`)
/// followed by `\n`.
///
/// A port constructed without a link is inert; it drops signals silently, as
/// the bridge does when the device is absent at startup.
pub struct SerialSignal {
    label: String,
    link: Option<Box<dyn Write + Send>>,
}

impl SerialSignal {
    /// Wrap an already-open byte link.
    pub fn from_writer(label: impl Into<String>, link: impl Write + Send + 'static) -> Self {
        Self {
            label: label.into(),
            link: Some(Box::new(link)),
        }
    }

    /// A port with no device behind it.
    pub fn disconnected(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: None,
        }
    }

    /// Open the serial device at `path`; on failure log and return an inert port.
    #[cfg(feature = "serial")]
    pub fn open(path: &str, baud_rate: u32) -> Self {
        match Self::try_open(path, baud_rate) {
            Ok(port) => port,
            Err(err) => {
                log::error!(target: "trailsense::hw", "hardware bridge connection failed on {path}: {err}");
                Self::disconnected(path)
            }
        }
    }

    /// Open the serial device at `path` (8N1, no flow control, 1 s timeout).
    #[cfg(feature = "serial")]
    pub fn try_open(path: &str, baud_rate: u32) -> Result<Self, crate::SignalError> {
        use serialport::{DataBits, FlowControl, Parity, StopBits};
        use std::time::Duration;

        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_secs(1))
            .open()?;

        log::info!(target: "trailsense::hw", "connected to hardware bridge at {path} ({baud_rate} baud)");
        Ok(Self::from_writer(path, port))
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl SignalPort for SerialSignal {
    fn signal(&mut self, color: SignalColor) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        let frame = [color.wire_byte(), b'\n'];
        if let Err(err) = link.write_all(&frame).and_then(|_| link.flush()) {
            log::error!(target: "trailsense::hw", "serial transmission error on {}: {err}", self.label);
        }
    }
}

impl std::fmt::Debug for SerialSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialSignal")
            .field("label", &self.label)
            .field("connected", &self.is_connected())
            .finish()
    }
}
