//! JSON parameter and session report helpers.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{EngineParams, EngineSnapshot, FrameOutcome, Landmark, RecognitionEngine};

#[derive(thiserror::Error, Debug)]
pub enum EngineIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineParams {
    /// Load parameters from a JSON file; missing fields take defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, EngineIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write parameters as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), EngineIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Landmark metadata without its descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSummary {
    pub id: usize,
    pub timestamp: f64,
    pub keypoint_count: usize,
    pub descriptor_count: usize,
    #[serde(default)]
    pub image_ref: Option<PathBuf>,
}

impl From<&Landmark> for LandmarkSummary {
    fn from(lm: &Landmark) -> Self {
        Self {
            id: lm.id,
            timestamp: lm.timestamp,
            keypoint_count: lm.keypoint_count,
            descriptor_count: lm.descriptors.len(),
            image_ref: lm.image_ref.clone(),
        }
    }
}

/// One processed frame in a session report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: usize,
    #[serde(default)]
    pub source: Option<String>,
    pub timestamp_s: f64,
    pub outcome: FrameOutcome,
    pub state: EngineSnapshot,
}

/// Everything a replay session did, frame by frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    #[serde(default)]
    pub params: EngineParams,
    #[serde(default)]
    pub frames: Vec<FrameRecord>,
    #[serde(default)]
    pub mode_requests: Vec<ModeRequestRecord>,
    #[serde(default)]
    pub landmarks: Vec<LandmarkSummary>,
}

/// A mode request issued during a session and whether it was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRequestRecord {
    /// Index of the first frame processed under the request.
    pub before_frame: usize,
    pub requested: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl SessionReport {
    pub fn new(params: EngineParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Append the engine's view of the frame it just processed.
    pub fn record_frame(
        &mut self,
        engine: &RecognitionEngine,
        timestamp_s: f64,
        source: Option<String>,
    ) {
        self.frames.push(FrameRecord {
            index: self.frames.len(),
            source,
            timestamp_s,
            outcome: engine.last_outcome().clone(),
            state: engine.state(),
        });
    }

    pub fn record_mode_request(&mut self, requested: &str, error: Option<String>) {
        self.mode_requests.push(ModeRequestRecord {
            before_frame: self.frames.len(),
            requested: requested.to_string(),
            error,
        });
    }

    /// Copy the landmark list out of the engine at session end.
    pub fn finish(&mut self, engine: &RecognitionEngine) {
        self.landmarks = engine.landmarks().iter().map(LandmarkSummary::from).collect();
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, EngineIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), EngineIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
