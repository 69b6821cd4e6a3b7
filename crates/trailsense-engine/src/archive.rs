use std::path::PathBuf;

use trailsense_core::RgbFrame;

#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to encode landmark {id}: {reason}")]
    Encode { id: usize, reason: String },
}

/// Persists the source frame of each captured landmark.
///
/// The returned path becomes the landmark's `image_ref`. Images are written
/// once and never read back by the engine.
pub trait LandmarkArchive: Send {
    fn store(&mut self, id: usize, frame: &RgbFrame) -> Result<Option<PathBuf>, ArchiveError>;
}

impl<T: LandmarkArchive + ?Sized> LandmarkArchive for Box<T> {
    fn store(&mut self, id: usize, frame: &RgbFrame) -> Result<Option<PathBuf>, ArchiveError> {
        (**self).store(id, frame)
    }
}

/// Archive that keeps nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullArchive;

impl LandmarkArchive for NullArchive {
    fn store(&mut self, _id: usize, _frame: &RgbFrame) -> Result<Option<PathBuf>, ArchiveError> {
        Ok(None)
    }
}

/// Deterministic file name of a landmark image.
pub fn landmark_file_name(id: usize) -> String {
    format!("landmark_{id}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_derived_from_id() {
        assert_eq!(landmark_file_name(0), "landmark_0.jpg");
        assert_eq!(landmark_file_name(12), "landmark_12.jpg");
    }
}
