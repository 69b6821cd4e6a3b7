//! Top-level JSON configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, EngineIoError, EngineParams, LandmarkArchive, RecognitionEngine};
use crate::features::{BruteForceMatcher, OrbExtractor, OrbParams};
use crate::signal::{SignalConfig, SignalPort};

fn default_landmark_dir() -> PathBuf {
    PathBuf::from("landmarks_data")
}

fn default_true() -> bool {
    true
}

/// Everything needed to assemble a running engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailsenseConfig {
    #[serde(default)]
    pub engine: EngineParams,
    #[serde(default)]
    pub features: OrbParams,
    #[serde(default)]
    pub signal: SignalConfig,
    /// Directory receiving `landmark_<id>.jpg` files.
    #[serde(default = "default_landmark_dir")]
    pub landmark_dir: PathBuf,
    #[serde(default = "default_true")]
    pub archive_landmarks: bool,
}

impl Default for TrailsenseConfig {
    fn default() -> Self {
        Self {
            engine: EngineParams::default(),
            features: OrbParams::default(),
            signal: SignalConfig::default(),
            landmark_dir: default_landmark_dir(),
            archive_landmarks: true,
        }
    }
}

impl TrailsenseConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, EngineIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), EngineIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Engine with the reference ORB extractor and a cross-checking matcher.
    pub fn build_engine(
        &self,
        signal: Box<dyn SignalPort>,
        archive: Box<dyn LandmarkArchive>,
    ) -> Result<RecognitionEngine, EngineError> {
        RecognitionEngine::new(
            self.engine.clone(),
            OrbExtractor::new(self.features.clone()),
            BruteForceMatcher::default(),
            signal,
            archive,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NullArchive;
    use crate::signal::{NullSignal, SignalBackend};

    #[test]
    fn empty_object_is_the_default_config() {
        let cfg: TrailsenseConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, TrailsenseConfig::default());
        assert_eq!(cfg.landmark_dir, PathBuf::from("landmarks_data"));
    }

    #[test]
    fn sections_override_independently() {
        let cfg: TrailsenseConfig = serde_json::from_str(
            r#"{ "signal": { "backend": "SERIAL" }, "features": { "max_features": 300 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.signal.backend, SignalBackend::Serial);
        assert_eq!(cfg.features.max_features, 300);
        assert_eq!(cfg.engine, EngineParams::default());
    }

    #[test]
    fn builds_an_engine_and_rejects_bad_params() {
        let mut cfg = TrailsenseConfig::default();
        assert!(cfg
            .build_engine(Box::new(NullSignal), Box::new(NullArchive))
            .is_ok());
        cfg.engine.capture.interval_s = f64::INFINITY;
        assert!(cfg
            .build_engine(Box::new(NullSignal), Box::new(NullArchive))
            .is_err());
    }
}
