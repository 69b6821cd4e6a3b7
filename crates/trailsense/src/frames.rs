//! `image`-crate adapters: frame conversion, directory frame source, on-disk
//! landmark archive and offline session replay.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{FrameError, RgbFrame};
use crate::engine::{
    landmark_file_name, ArchiveError, LandmarkArchive, Mode, RecognitionEngine, SessionReport,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// File extensions picked up by [`list_frames`].
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "pnm", "ppm"];

/// Errors produced while reading or writing frames.
#[derive(thiserror::Error, Debug)]
pub enum FrameSourceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("no frames found in {0}")]
    Empty(PathBuf),

    #[error("frame too large for the image crate ({width}x{height})")]
    TooLarge { width: usize, height: usize },
}

/// Copy an `image::RgbImage` into an engine frame.
pub fn rgb_frame(img: &::image::RgbImage) -> RgbFrame {
    RgbFrame {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Copy an engine frame into an `image::RgbImage`.
pub fn rgb_image(frame: &RgbFrame) -> Result<::image::RgbImage, FrameSourceError> {
    let too_large = || FrameSourceError::TooLarge {
        width: frame.width,
        height: frame.height,
    };
    let width = u32::try_from(frame.width).map_err(|_| too_large())?;
    let height = u32::try_from(frame.height).map_err(|_| too_large())?;
    ::image::RgbImage::from_raw(width, height, frame.data.clone()).ok_or_else(|| {
        FrameSourceError::Frame(FrameError::InvalidBuffer {
            expected: frame.width * frame.height * 3,
            got: frame.data.len(),
        })
    })
}

/// Decode any supported image file into an RGB frame.
pub fn load_frame(path: impl AsRef<Path>) -> Result<RgbFrame, FrameSourceError> {
    let img = ::image::ImageReader::open(path)?.decode()?.to_rgb8();
    Ok(rgb_frame(&img))
}

/// Encode a frame; the format follows the file extension.
pub fn save_frame(path: impl AsRef<Path>, frame: &RgbFrame) -> Result<(), FrameSourceError> {
    rgb_image(frame)?.save(path)?;
    Ok(())
}

/// Image files in `dir`, sorted by file name.
pub fn list_frames(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, FrameSourceError> {
    let dir = dir.as_ref();
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if path.is_file() && is_frame {
            frames.push(path);
        }
    }
    if frames.is_empty() {
        return Err(FrameSourceError::Empty(dir.to_path_buf()));
    }
    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

/// Writes each landmark's source frame to `<dir>/landmark_<id>.jpg`.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    dir: PathBuf,
}

impl DirectoryArchive {
    /// Create the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: usize) -> PathBuf {
        self.dir.join(landmark_file_name(id))
    }
}

impl LandmarkArchive for DirectoryArchive {
    fn store(&mut self, id: usize, frame: &RgbFrame) -> Result<Option<PathBuf>, ArchiveError> {
        let path = self.path_for(id);
        let img = rgb_image(frame).map_err(|e| ArchiveError::Encode {
            id,
            reason: e.to_string(),
        })?;
        img.save(&path).map_err(|e| match e {
            ::image::ImageError::IoError(io) => ArchiveError::Io(io),
            other => ArchiveError::Encode {
                id,
                reason: other.to_string(),
            },
        })?;
        log::debug!("saved landmark {id} to {}", path.display());
        Ok(Some(path))
    }
}

/// A mode request applied before a given frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRequest {
    pub before_frame: usize,
    /// Raw request text; validated by the engine.
    pub mode: String,
}

impl std::str::FromStr for ModeRequest {
    type Err = String;

    /// Parses `INDEX=MODE`, e.g. `12=RETURN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, mode) = s
            .split_once('=')
            .ok_or_else(|| format!("expected INDEX=MODE, got {s:?}"))?;
        let before_frame = index
            .trim()
            .parse()
            .map_err(|_| format!("invalid frame index {index:?}"))?;
        Ok(Self {
            before_frame,
            mode: mode.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Frame rate used to stamp frame `i` at `i / fps` seconds.
    pub fps: f64,
    pub mode_requests: Vec<ModeRequest>,
    /// Where annotated frames go, if anywhere.
    pub annotated_dir: Option<PathBuf>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            fps: 10.0,
            mode_requests: Vec::new(),
            annotated_dir: None,
        }
    }
}

impl ReplayOptions {
    /// Shorthand for a single switch to return mode.
    pub fn return_at(mut self, frame: usize) -> Self {
        self.mode_requests.push(ModeRequest {
            before_frame: frame,
            mode: Mode::Return.as_str().to_string(),
        });
        self
    }
}

/// Feed image files through `engine` in order, the way a live shell would.
///
/// Rejected mode requests are recorded in the report and replay continues.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(frames = frames.len()))
)]
pub fn replay(
    engine: &mut RecognitionEngine,
    frames: &[PathBuf],
    options: &ReplayOptions,
) -> Result<SessionReport, FrameSourceError> {
    if let Some(dir) = &options.annotated_dir {
        fs::create_dir_all(dir)?;
    }
    let fps = if options.fps > 0.0 { options.fps } else { 1.0 };
    let mut report = SessionReport::new(engine.params().clone());

    for (index, path) in frames.iter().enumerate() {
        for request in options
            .mode_requests
            .iter()
            .filter(|r| r.before_frame == index)
        {
            let error = engine.request_mode(&request.mode).err().map(|e| e.to_string());
            report.record_mode_request(&request.mode, error);
        }

        let frame = load_frame(path)?;
        let timestamp_s = index as f64 / fps;
        let annotated = engine.process_frame_at(&frame, timestamp_s);

        if let Some(dir) = &options.annotated_dir {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("frame_{index}"));
            save_frame(dir.join(format!("{name}_annotated.png")), &annotated)?;
        }

        let state = engine.state();
        log::info!(
            "[{index:>4}] {:<7} {:<24} confidence {:>5.1} landmarks {}",
            state.mode.as_str(),
            state.status,
            state.confidence,
            state.landmark_count
        );
        report.record_frame(engine, timestamp_s, Some(path.display().to_string()));
    }

    report.finish(engine);
    Ok(report)
}
