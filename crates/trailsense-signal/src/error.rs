/// Errors raised while configuring or driving a signal port.
///
/// Delivery errors never leave a `SignalPort`; they are logged inside
/// `signal`. These variants surface only from construction and parsing.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("unknown signal color: {0:?}")]
    UnknownColor(String),

    #[error("unknown signal backend: {0:?}")]
    UnknownBackend(String),

    #[error("signal backend not compiled in: {0}")]
    Unsupported(&'static str),
}
