//! Reference feature capabilities for TrailSense.
//!
//! This crate provides:
//! - `OrbExtractor`: FAST-9 keypoints ranked by Harris response, one per grid
//!   cell, oriented by intensity centroid and described with 256-bit steered
//!   BRIEF,
//! - `BruteForceMatcher`: exhaustive Hamming matching with cross-check.
//!
//! Both implement the capability traits from `trailsense-core`, so the
//! recognition engine never depends on this crate directly.

mod brief;
mod fast;
mod matcher;

pub use matcher::BruteForceMatcher;

use serde::{Deserialize, Serialize};
use trailsense_core::{FeatureExtractor, FeatureSet, GrayImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::brief::{BriefPattern, PATCH_RADIUS};
use crate::fast::FastParams;

/// Configuration for `OrbExtractor`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbParams {
    /// FAST intensity threshold.
    pub fast_threshold: u8,
    /// Side of the non-maximum suppression grid cell, in pixels.
    pub grid_size: usize,
    /// Maximum number of keypoints kept per frame (strongest first).
    pub max_features: usize,
    /// Harris `k` used to rank FAST candidates.
    pub harris_k: f32,
}

impl Default for OrbParams {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            grid_size: 16,
            max_features: 1000,
            harris_k: 0.04,
        }
    }
}

/// FAST + steered BRIEF feature extractor.
pub struct OrbExtractor {
    params: OrbParams,
    pattern: BriefPattern,
}

impl Default for OrbExtractor {
    fn default() -> Self {
        Self::new(OrbParams::default())
    }
}

impl OrbExtractor {
    pub fn new(params: OrbParams) -> Self {
        Self {
            params,
            pattern: BriefPattern::generate(),
        }
    }

    #[inline]
    pub fn params(&self) -> &OrbParams {
        &self.params
    }
}

impl FeatureExtractor for OrbExtractor {
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, image),
            fields(width = image.width, height = image.height)
        )
    )]
    fn extract(&self, image: &GrayImageView<'_>) -> FeatureSet {
        let fast = FastParams {
            threshold: self.params.fast_threshold,
            grid_size: self.params.grid_size,
            max_features: self.params.max_features,
            harris_k: self.params.harris_k,
            border: PATCH_RADIUS as usize + 1,
        };
        let candidates = fast::detect(image, &fast);

        let smoothed = brief::smooth(image);
        let smoothed = smoothed.view();
        let mut keypoints = Vec::with_capacity(candidates.len());
        let mut descriptors = Vec::with_capacity(candidates.len());
        for kp in candidates {
            if let Some(desc) = self.pattern.describe(&smoothed, &kp) {
                keypoints.push(kp);
                descriptors.push(desc);
            }
        }

        log::trace!(
            "extracted {} keypoints ({}x{})",
            keypoints.len(),
            image.width,
            image.height
        );
        FeatureSet::new(keypoints, descriptors)
    }
}
