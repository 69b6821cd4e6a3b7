//! High-level facade crate for the `trailsense-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core types, the reference feature capabilities, the
//!   signal ports and the recognition engine,
//! - `TrailsenseConfig`, one JSON file that assembles a complete engine,
//! - (feature `image`) frame conversion, a directory frame source, an on-disk
//!   landmark archive and offline session replay.
//!
//! ## Quickstart
//!
//! ```no_run
//! use trailsense::frames::{list_frames, replay, DirectoryArchive, ReplayOptions};
//! use trailsense::signal::open_signal_port;
//! use trailsense::TrailsenseConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = TrailsenseConfig::default();
//! let signal = open_signal_port(&cfg.signal.clone().with_env_overrides())?;
//! let archive = DirectoryArchive::new(&cfg.landmark_dir)?;
//! let mut engine = cfg.build_engine(signal, Box::new(archive))?;
//!
//! let frames = list_frames("walk")?;
//! let report = replay(&mut engine, &frames, &ReplayOptions::default().return_at(120))?;
//! println!("{} landmarks", report.landmarks.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `trailsense::core`: frames, keypoints, descriptors, capability traits, overlay.
//! - `trailsense::features`: `OrbExtractor` and `BruteForceMatcher`.
//! - `trailsense::signal`: `SignalColor`, `SignalPort` and its implementations.
//! - `trailsense::engine`: `RecognitionEngine`, `SharedEngine`, landmarks, reports.
//! - `trailsense::frames` (feature `image`): `image` crate adapters and replay.

pub use trailsense_core as core;
pub use trailsense_engine as engine;
pub use trailsense_features as features;
pub use trailsense_signal as signal;

pub use trailsense_engine::{
    EngineError, EngineParams, EngineSnapshot, FrameOutcome, Mode, RecognitionEngine,
    SharedEngine,
};
pub use trailsense_signal::SignalColor;

mod config;
pub use config::TrailsenseConfig;

#[cfg(feature = "image")]
pub mod frames;
