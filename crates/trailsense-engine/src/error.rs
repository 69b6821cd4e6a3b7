/// Failures the engine reports to its caller.
///
/// Steady-state conditions (a frame that does not qualify for capture, an
/// empty landmark store) are tracked as state, not raised as errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid mode request: {0:?} (expected \"EXPLORE\" or \"RETURN\")")]
    InvalidMode(String),
    #[error("invalid engine parameters: {0}")]
    InvalidParams(String),
    #[error("invalid landmark: {0}")]
    InvalidLandmark(String),
}
