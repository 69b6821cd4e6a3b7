//! Captured landmarks and their append-only store.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use trailsense_core::BinaryDescriptor;

use crate::EngineError;

/// A visually distinctive frame remembered during exploration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Sequential id, equal to the store length at insertion.
    pub id: usize,
    /// Descriptors of the capture frame; never empty.
    pub descriptors: Vec<BinaryDescriptor>,
    /// Number of keypoints in the capture frame.
    pub keypoint_count: usize,
    /// Capture time in engine seconds.
    pub timestamp: f64,
    /// Where the capture frame was persisted, if anywhere.
    pub image_ref: Option<PathBuf>,
}

/// Ordered, append-only landmark collection.
///
/// Landmarks are never removed, reordered or edited once stored.
#[derive(Clone, Debug, Default)]
pub struct LandmarkStore {
    landmarks: Vec<Landmark>,
}

impl LandmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next appended landmark will receive.
    #[inline]
    pub fn next_id(&self) -> usize {
        self.landmarks.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Landmark> {
        self.landmarks.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.landmarks.iter()
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.landmarks.last().map(|lm| lm.timestamp)
    }

    /// Append a landmark and return its id.
    ///
    /// Rejects an empty descriptor set and a timestamp older than the last
    /// stored landmark.
    pub fn append(
        &mut self,
        descriptors: Vec<BinaryDescriptor>,
        keypoint_count: usize,
        timestamp: f64,
        image_ref: Option<PathBuf>,
    ) -> Result<usize, EngineError> {
        if descriptors.is_empty() {
            return Err(EngineError::InvalidLandmark(
                "a landmark needs at least one descriptor".to_string(),
            ));
        }
        if !timestamp.is_finite() {
            return Err(EngineError::InvalidLandmark(format!(
                "non-finite timestamp {timestamp}"
            )));
        }
        if let Some(last) = self.last_timestamp() {
            if timestamp < last {
                return Err(EngineError::InvalidLandmark(format!(
                    "timestamp {timestamp} precedes last capture at {last}"
                )));
            }
        }

        let id = self.next_id();
        self.landmarks.push(Landmark {
            id,
            descriptors,
            keypoint_count,
            timestamp,
            image_ref,
        });
        Ok(id)
    }
}

impl<'a> IntoIterator for &'a LandmarkStore {
    type Item = &'a Landmark;
    type IntoIter = std::slice::Iter<'a, Landmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(n: usize) -> Vec<BinaryDescriptor> {
        (0..n as u64).map(|i| BinaryDescriptor([i, 0, 0, 0])).collect()
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut store = LandmarkStore::new();
        for (i, t) in [0.0, 3.0, 3.0, 9.5].into_iter().enumerate() {
            assert_eq!(store.next_id(), i);
            assert_eq!(store.append(desc(3), 60, t, None), Ok(i));
        }
        let ids: Vec<usize> = store.iter().map(|lm| lm.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(store.last_timestamp(), Some(9.5));
    }

    #[test]
    fn rejects_empty_descriptors() {
        let mut store = LandmarkStore::new();
        assert!(store.append(Vec::new(), 80, 1.0, None).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_time_going_backwards() {
        let mut store = LandmarkStore::new();
        store.append(desc(1), 51, 5.0, None).unwrap();
        assert!(store.append(desc(1), 51, 4.9, None).is_err());
        assert!(store.append(desc(1), 51, f64::NAN, None).is_err());
        assert_eq!(store.len(), 1);
    }
}
