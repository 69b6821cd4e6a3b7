//! Tunable thresholds of the capture and recognition policies.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Capture policy parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureParams {
    /// Minimum time between two captures, in seconds. A frame exactly
    /// `interval_s` after the last capture is still too early.
    pub interval_s: f64,
    /// A frame qualifies only with strictly more keypoints than this.
    pub min_keypoints: usize,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            interval_s: 2.5,
            min_keypoints: 50,
        }
    }
}

/// Recognition scoring parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionParams {
    /// A match is good when its Hamming distance is strictly below this.
    pub good_match_distance: u32,
    /// Good-match count that maps to 100% confidence.
    pub full_confidence_matches: f32,
    /// Confidence strictly above this is a match.
    pub match_threshold: f32,
    /// Confidence strictly above this (and not a match) is a possible match.
    pub possible_threshold: f32,
}

impl Default for RecognitionParams {
    fn default() -> Self {
        Self {
            good_match_distance: 50,
            full_confidence_matches: 50.0,
            match_threshold: 70.0,
            possible_threshold: 30.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    pub enabled: bool,
    /// Radius of keypoint markers, in pixels.
    pub marker_radius: i32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_radius: 4,
        }
    }
}

/// All recognition engine parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    pub capture: CaptureParams,
    pub recognition: RecognitionParams,
    pub overlay: OverlayParams,
}

impl EngineParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        let c = &self.capture;
        if !c.interval_s.is_finite() || c.interval_s < 0.0 {
            return Err(EngineError::InvalidParams(format!(
                "capture.interval_s must be finite and >= 0, got {}",
                c.interval_s
            )));
        }

        let r = &self.recognition;
        if !r.full_confidence_matches.is_finite() || r.full_confidence_matches <= 0.0 {
            return Err(EngineError::InvalidParams(format!(
                "recognition.full_confidence_matches must be > 0, got {}",
                r.full_confidence_matches
            )));
        }
        if !r.match_threshold.is_finite() || !r.possible_threshold.is_finite() {
            return Err(EngineError::InvalidParams(
                "recognition thresholds must be finite".to_string(),
            ));
        }
        if r.possible_threshold >= r.match_threshold {
            return Err(EngineError::InvalidParams(format!(
                "recognition.possible_threshold ({}) must be below match_threshold ({})",
                r.possible_threshold, r.match_threshold
            )));
        }

        if self.overlay.marker_radius < 0 {
            return Err(EngineError::InvalidParams(format!(
                "overlay.marker_radius must be >= 0, got {}",
                self.overlay.marker_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = EngineParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.capture.interval_s, 2.5);
        assert_eq!(params.capture.min_keypoints, 50);
        assert_eq!(params.recognition.good_match_distance, 50);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut params = EngineParams::default();
        params.recognition.possible_threshold = 70.0;
        assert!(matches!(
            params.validate(),
            Err(EngineError::InvalidParams(_))
        ));
    }

    #[test]
    fn rejects_bad_interval_and_scale() {
        let mut params = EngineParams::default();
        params.capture.interval_s = -1.0;
        assert!(params.validate().is_err());

        let mut params = EngineParams::default();
        params.recognition.full_confidence_matches = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn nested_partial_json_keeps_defaults() {
        let params: EngineParams =
            serde_json::from_str(r#"{ "capture": { "interval_s": 1.0 } }"#).unwrap();
        assert_eq!(params.capture.interval_s, 1.0);
        assert_eq!(params.capture.min_keypoints, 50);
        assert_eq!(params.recognition, RecognitionParams::default());
    }
}
