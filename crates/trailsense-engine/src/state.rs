//! Navigation state owned by the engine and the snapshots it publishes.

use serde::{Deserialize, Serialize};
use trailsense_signal::SignalColor;

use crate::{MatchBand, Mode, SkipReason};

/// Status line before the first mode change or frame.
pub const STATUS_INITIALIZING: &str = "SYSTEM INITIALIZING";
pub const STATUS_LANDMARK_CAPTURED: &str = "LANDMARK CAPTURED";
pub const STATUS_NO_LANDMARKS: &str = "NO LANDMARKS STORED";

/// The engine's mutable navigation state.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationState {
    pub mode: Mode,
    pub status: String,
    /// Recognition confidence in `[0, 100]`; only meaningful in return mode.
    pub confidence: f32,
    pub best_match: Option<usize>,
    /// Engine time of the most recent capture.
    pub last_capture_time: Option<f64>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            mode: Mode::Explore,
            status: STATUS_INITIALIZING.to_string(),
            confidence: 0.0,
            best_match: None,
            last_capture_time: None,
        }
    }
}

/// Read-only view handed to the service shell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub mode: Mode,
    pub status: String,
    pub confidence: f32,
    pub landmark_count: usize,
    pub best_match: Option<usize>,
    pub last_signal: Option<SignalColor>,
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        let nav = NavigationState::default();
        Self {
            mode: nav.mode,
            status: nav.status,
            confidence: nav.confidence,
            landmark_count: 0,
            best_match: None,
            last_signal: None,
        }
    }
}

/// What the last processed frame did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// No frame processed yet.
    Idle,
    Captured {
        id: usize,
    },
    CaptureSkipped {
        reason: SkipReason,
    },
    Recognized {
        best_match: Option<usize>,
        score: usize,
        confidence: f32,
        band: MatchBand,
    },
    NoLandmarks,
}
