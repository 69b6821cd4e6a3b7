//! Landmark capture policy for exploration frames.

use serde::{Deserialize, Serialize};
use trailsense_core::FeatureSet;

use crate::CaptureParams;

/// Why an exploration frame did not become a landmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The frame timestamp is NaN or infinite.
    InvalidTimestamp,
    /// The capture interval since the last landmark has not elapsed.
    TooSoon,
    /// The frame produced no descriptors.
    NoDescriptors,
    /// The frame has too few keypoints to be distinctive.
    TooFewKeypoints { count: usize },
    /// The landmark store refused the entry.
    Rejected,
}

/// Decide whether the frame at `now_s` qualifies as a new landmark.
///
/// A non-finite `now_s` never captures. The time gate comes next:
/// `now_s - last <= interval_s` skips. With no previous capture the gate is
/// open.
pub fn evaluate(
    params: &CaptureParams,
    last_capture: Option<f64>,
    now_s: f64,
    features: &FeatureSet,
) -> Result<(), SkipReason> {
    if !now_s.is_finite() {
        return Err(SkipReason::InvalidTimestamp);
    }
    if let Some(last) = last_capture {
        let elapsed = now_s - last;
        if elapsed.is_nan() || elapsed <= params.interval_s {
            return Err(SkipReason::TooSoon);
        }
    }
    if !features.has_descriptors() {
        return Err(SkipReason::NoDescriptors);
    }
    let count = features.keypoint_count();
    if count <= params.min_keypoints {
        return Err(SkipReason::TooFewKeypoints { count });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use trailsense_core::{BinaryDescriptor, Keypoint};

    fn features(n: usize) -> FeatureSet {
        let kp = Keypoint {
            position: Point2::new(1.0, 1.0),
            angle: 0.0,
            response: 1.0,
        };
        FeatureSet::new(vec![kp; n], vec![BinaryDescriptor::zeros(); n])
    }

    #[test]
    fn first_qualifying_frame_captures() {
        let p = CaptureParams::default();
        assert_eq!(evaluate(&p, None, 0.0, &features(51)), Ok(()));
    }

    #[test]
    fn interval_is_exclusive() {
        let p = CaptureParams::default();
        let f = features(200);
        assert_eq!(evaluate(&p, Some(1.0), 3.5, &f), Err(SkipReason::TooSoon));
        assert_eq!(evaluate(&p, Some(1.0), 3.6, &f), Ok(()));
        assert_eq!(evaluate(&p, Some(5.0), 4.0, &f), Err(SkipReason::TooSoon));
    }

    #[test]
    fn non_finite_timestamps_never_capture() {
        let p = CaptureParams::default();
        let f = features(200);
        for now in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            for last in [None, Some(1.0)] {
                assert_eq!(evaluate(&p, last, now, &f), Err(SkipReason::InvalidTimestamp));
            }
        }
    }

    #[test]
    fn keypoint_gate_is_exclusive() {
        let p = CaptureParams::default();
        assert_eq!(
            evaluate(&p, None, 0.0, &features(50)),
            Err(SkipReason::TooFewKeypoints { count: 50 })
        );
    }

    #[test]
    fn needs_descriptors() {
        let p = CaptureParams::default();
        let mut f = features(80);
        f.descriptors.clear();
        assert_eq!(evaluate(&p, None, 0.0, &f), Err(SkipReason::NoDescriptors));
    }
}
