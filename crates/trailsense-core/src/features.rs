//! Keypoints, binary descriptors and the two external capability contracts.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::GrayImageView;

/// A detected image keypoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Pixel position (x right, y down).
    pub position: Point2<f32>,
    /// Orientation in radians.
    pub angle: f32,
    /// Detector response used for ranking.
    pub response: f32,
}

/// A 256-bit binary descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinaryDescriptor(pub [u64; 4]);

impl BinaryDescriptor {
    pub const BITS: u32 = 256;

    pub const fn zeros() -> Self {
        Self([0; 4])
    }

    /// Number of differing bits (0..=256).
    #[inline]
    pub fn hamming(&self, other: &Self) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Output of a feature extractor.
///
/// `keypoints[i]` is described by `descriptors[i]` when descriptors are
/// present. An extractor may report keypoints without descriptors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureSet {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<BinaryDescriptor>,
}

impl FeatureSet {
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<BinaryDescriptor>) -> Self {
        Self {
            keypoints,
            descriptors,
        }
    }

    #[inline]
    pub fn keypoint_count(&self) -> usize {
        self.keypoints.len()
    }

    #[inline]
    pub fn has_descriptors(&self) -> bool {
        !self.descriptors.is_empty()
    }
}

/// One mutual nearest-neighbour pairing between a query and a train set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: u32,
}

/// Frame → keypoints + descriptors.
pub trait FeatureExtractor: Send {
    fn extract(&self, image: &GrayImageView<'_>) -> FeatureSet;
}

/// Pairs two descriptor sets one-to-one with cross-check semantics.
pub trait DescriptorMatcher: Send {
    fn match_descriptors(
        &self,
        query: &[BinaryDescriptor],
        train: &[BinaryDescriptor],
    ) -> Vec<DescriptorMatch>;
}

impl<T: FeatureExtractor + ?Sized> FeatureExtractor for Box<T> {
    fn extract(&self, image: &GrayImageView<'_>) -> FeatureSet {
        (**self).extract(image)
    }
}

impl<T: DescriptorMatcher + ?Sized> DescriptorMatcher for Box<T> {
    fn match_descriptors(
        &self,
        query: &[BinaryDescriptor],
        train: &[BinaryDescriptor],
    ) -> Vec<DescriptorMatch> {
        (**self).match_descriptors(query, train)
    }
}
