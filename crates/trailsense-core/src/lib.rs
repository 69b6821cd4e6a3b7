//! Core types for TrailSense landmark recognition.
//!
//! This crate is intentionally small. It defines frame buffers, keypoints,
//! binary descriptors and the two capability traits the recognition engine
//! consumes (`FeatureExtractor`, `DescriptorMatcher`). It does *not* depend on
//! any concrete feature detector or image library.

mod features;
mod image;
mod logger;
pub mod overlay;

pub use features::{
    BinaryDescriptor, DescriptorMatch, DescriptorMatcher, FeatureExtractor, FeatureSet, Keypoint,
};
pub use image::{gray_at, sample_bilinear, FrameError, GrayImage, GrayImageView, RgbFrame};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
