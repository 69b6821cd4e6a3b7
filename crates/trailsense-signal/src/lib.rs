//! Status LED signalling for TrailSense.
//!
//! The recognition engine expresses its verdict as a [`SignalColor`] and hands
//! it to a [`SignalPort`]. Two production ports exist:
//! - [`SimulatedSignal`] logs the color and is the default,
//! - [`SerialSignal`] writes a one-byte command plus newline to the LED bridge
//!   (`serial` feature).
//!
//! Delivery problems are absorbed by the port; the caller never sees them.

mod color;
mod config;
mod error;
mod port;

pub use color::SignalColor;
pub use config::{open_signal_port, SignalBackend, SignalConfig, BACKEND_ENV_VAR};
pub use error::SignalError;
pub use port::{NullSignal, RecordingSignal, SerialSignal, SignalPort, SimulatedSignal};
