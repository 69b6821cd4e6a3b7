//! Thread-safe handle around a `RecognitionEngine`.
//!
//! One writer at a time drives the engine behind a mutex (frame processing and
//! mode changes). Readers never touch that mutex: they clone the snapshot the
//! writer publishes at the end of every frame and every mode change.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use trailsense_core::RgbFrame;

use crate::{EngineError, EngineSnapshot, Mode, RecognitionEngine};

#[derive(Clone)]
pub struct SharedEngine {
    engine: Arc<Mutex<RecognitionEngine>>,
    snapshot: Arc<RwLock<EngineSnapshot>>,
}

impl SharedEngine {
    pub fn new(engine: RecognitionEngine) -> Self {
        let snapshot = engine.state();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            snapshot: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn process_frame(&self, frame: &RgbFrame) -> RgbFrame {
        self.write(|engine| engine.process_frame(frame))
    }

    pub fn process_frame_at(&self, frame: &RgbFrame, now_s: f64) -> RgbFrame {
        self.write(|engine| engine.process_frame_at(frame, now_s))
    }

    pub fn set_mode(&self, mode: Mode) {
        self.write(|engine| engine.set_mode(mode))
    }

    pub fn request_mode(&self, requested: &str) -> Result<Mode, EngineError> {
        self.write(|engine| engine.request_mode(requested))
    }

    /// Run `f` with read access to the engine. Takes the writer lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&RecognitionEngine) -> R) -> R {
        f(&self.lock())
    }

    fn write<R>(&self, f: impl FnOnce(&mut RecognitionEngine) -> R) -> R {
        let mut engine = self.lock();
        let out = f(&mut engine);
        let published = engine.state();
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = published;
        out
    }

    fn lock(&self) -> MutexGuard<'_, RecognitionEngine> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEngine")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
