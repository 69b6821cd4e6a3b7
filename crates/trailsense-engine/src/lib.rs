//! TrailSense recognition engine.
//!
//! During exploration the engine deposits landmarks: frames with enough
//! keypoints, at most one per capture interval. On the way back it scores
//! every frame against all stored landmarks and turns the best score into a
//! confidence, a status line and a status LED color.
//!
//! Feature extraction and descriptor matching are supplied by the caller
//! through the `trailsense-core` capability traits; the LED goes through a
//! `trailsense-signal` port.
//!
//! ```
//! use trailsense_core::{
//!     BinaryDescriptor, DescriptorMatch, DescriptorMatcher, FeatureExtractor, FeatureSet,
//!     GrayImageView, RgbFrame,
//! };
//! use trailsense_engine::{EngineParams, Mode, NullArchive, RecognitionEngine};
//! use trailsense_signal::NullSignal;
//!
//! struct Blind;
//! impl FeatureExtractor for Blind {
//!     fn extract(&self, _: &GrayImageView<'_>) -> FeatureSet {
//!         FeatureSet::default()
//!     }
//! }
//! struct Never;
//! impl DescriptorMatcher for Never {
//!     fn match_descriptors(&self, _: &[BinaryDescriptor], _: &[BinaryDescriptor]) -> Vec<DescriptorMatch> {
//!         Vec::new()
//!     }
//! }
//!
//! let mut engine =
//!     RecognitionEngine::new(EngineParams::default(), Blind, Never, NullSignal, NullArchive)?;
//! engine.set_mode(Mode::Return);
//! engine.process_frame_at(&RgbFrame::new(32, 32), 0.0);
//! assert_eq!(engine.state().status, "NO LANDMARKS STORED");
//! # Ok::<(), trailsense_engine::EngineError>(())
//! ```

mod archive;
pub mod capture;
mod engine;
mod error;
pub mod io;
mod landmark;
mod mode;
mod params;
pub mod recognition;
mod shared;
mod state;

pub use archive::{landmark_file_name, ArchiveError, LandmarkArchive, NullArchive};
pub use capture::SkipReason;
pub use engine::RecognitionEngine;
pub use error::EngineError;
pub use io::{EngineIoError, SessionReport};
pub use landmark::{Landmark, LandmarkStore};
pub use mode::Mode;
pub use params::{CaptureParams, EngineParams, OverlayParams, RecognitionParams};
pub use recognition::MatchBand;
pub use shared::SharedEngine;
pub use state::{
    EngineSnapshot, FrameOutcome, NavigationState, STATUS_INITIALIZING, STATUS_LANDMARK_CAPTURED,
    STATUS_NO_LANDMARKS,
};
