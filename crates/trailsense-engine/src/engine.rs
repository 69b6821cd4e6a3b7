use std::time::Instant;

use trailsense_core::overlay::{
    draw_circle, draw_confidence_readout, OVERLAY_AMBER, OVERLAY_GREEN, OVERLAY_RED,
};
use trailsense_core::{DescriptorMatcher, FeatureExtractor, FeatureSet, RgbFrame};
use trailsense_signal::{SignalColor, SignalPort};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::recognition::{confidence_from_score, matched_query_indices, scan_landmarks, MatchBand};
use crate::state::{STATUS_LANDMARK_CAPTURED, STATUS_NO_LANDMARKS};
use crate::{
    capture, EngineError, EngineParams, EngineSnapshot, FrameOutcome, LandmarkArchive,
    LandmarkStore, Mode, NavigationState, SkipReason,
};

/// Landmark capture and recognition engine.
///
/// The engine owns the landmark store and the navigation state. Frames are
/// processed one at a time: capture or recognition, then the signal, then the
/// overlay.
pub struct RecognitionEngine {
    params: EngineParams,
    extractor: Box<dyn FeatureExtractor>,
    matcher: Box<dyn DescriptorMatcher>,
    signal: Box<dyn SignalPort>,
    archive: Box<dyn LandmarkArchive>,
    store: LandmarkStore,
    nav: NavigationState,
    last_signal: Option<SignalColor>,
    last_outcome: FrameOutcome,
    clock: Instant,
}

/// Per-frame work product of a policy step, consumed by the overlay.
enum Annotation {
    Keypoints,
    Matches { points: Vec<usize>, band: MatchBand },
    Nothing,
}

impl RecognitionEngine {
    pub fn new(
        params: EngineParams,
        extractor: impl FeatureExtractor + 'static,
        matcher: impl DescriptorMatcher + 'static,
        signal: impl SignalPort + 'static,
        archive: impl LandmarkArchive + 'static,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self {
            params,
            extractor: Box::new(extractor),
            matcher: Box::new(matcher),
            signal: Box::new(signal),
            archive: Box::new(archive),
            store: LandmarkStore::new(),
            nav: NavigationState::default(),
            last_signal: None,
            last_outcome: FrameOutcome::Idle,
            clock: Instant::now(),
        })
    }

    #[inline]
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.nav.mode
    }

    #[inline]
    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    #[inline]
    pub fn landmarks(&self) -> &LandmarkStore {
        &self.store
    }

    #[inline]
    pub fn last_outcome(&self) -> &FrameOutcome {
        &self.last_outcome
    }

    #[inline]
    pub fn last_signal(&self) -> Option<SignalColor> {
        self.last_signal
    }

    /// Seconds since the engine was constructed.
    pub fn elapsed_s(&self) -> f64 {
        self.clock.elapsed().as_secs_f64()
    }

    pub fn state(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.nav.mode,
            status: self.nav.status.clone(),
            confidence: self.nav.confidence,
            landmark_count: self.store.len(),
            best_match: self.nav.best_match,
            last_signal: self.last_signal,
        }
    }

    /// Switch modes. Store, confidence and capture time are kept.
    pub fn set_mode(&mut self, mode: Mode) {
        log::info!("mode -> {mode}");
        self.nav.mode = mode;
        self.nav.status = mode.entry_status().to_string();
        self.emit(mode.entry_signal());
    }

    /// Parse and apply an external mode request; anything other than exactly
    /// `"EXPLORE"` or `"RETURN"` is rejected without touching state.
    pub fn request_mode(&mut self, requested: &str) -> Result<Mode, EngineError> {
        match requested.parse::<Mode>() {
            Ok(mode) => {
                self.set_mode(mode);
                Ok(mode)
            }
            Err(err) => {
                log::warn!("rejected mode request {requested:?}");
                Err(err)
            }
        }
    }

    /// Process a frame stamped with the engine's own monotonic clock.
    pub fn process_frame(&mut self, frame: &RgbFrame) -> RgbFrame {
        let now_s = self.elapsed_s();
        self.process_frame_at(frame, now_s)
    }

    /// Process a frame captured at `now_s` engine seconds and return the
    /// annotated copy. The input frame is not modified.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, frame),
            fields(mode = %self.nav.mode, width = frame.width, height = frame.height)
        )
    )]
    pub fn process_frame_at(&mut self, frame: &RgbFrame, now_s: f64) -> RgbFrame {
        let gray = frame.to_gray();
        let features = self.extractor.extract(&gray.view());

        let annotation = match self.nav.mode {
            Mode::Explore => self.run_capture(frame, &features, now_s),
            Mode::Return => self.run_recognition(&features),
        };

        let mut annotated = frame.clone();
        if self.params.overlay.enabled {
            self.draw(&mut annotated, &features, annotation);
        }
        annotated
    }

    fn run_capture(&mut self, frame: &RgbFrame, features: &FeatureSet, now_s: f64) -> Annotation {
        if let Err(reason) = capture::evaluate(
            &self.params.capture,
            self.nav.last_capture_time,
            now_s,
            features,
        ) {
            log::trace!("capture skipped at {now_s:.3}s: {reason:?}");
            self.last_outcome = FrameOutcome::CaptureSkipped { reason };
            return Annotation::Keypoints;
        }

        let id = self.store.next_id();
        let image_ref = match self.archive.store(id, frame) {
            Ok(path) => path,
            Err(err) => {
                log::warn!("failed to persist landmark {id}: {err}");
                None
            }
        };
        match self.store.append(
            features.descriptors.clone(),
            features.keypoint_count(),
            now_s,
            image_ref,
        ) {
            Ok(id) => {
                log::info!(
                    "landmark {id} captured at {now_s:.3}s ({} keypoints)",
                    features.keypoint_count()
                );
                self.nav.last_capture_time = Some(now_s);
                self.nav.status = STATUS_LANDMARK_CAPTURED.to_string();
                self.last_outcome = FrameOutcome::Captured { id };
                self.emit(SignalColor::Green);
            }
            // Unreachable while the capture gates hold.
            Err(err) => {
                log::error!("landmark store rejected capture: {err}");
                self.last_outcome = FrameOutcome::CaptureSkipped {
                    reason: SkipReason::Rejected,
                };
            }
        }
        Annotation::Keypoints
    }

    fn run_recognition(&mut self, features: &FeatureSet) -> Annotation {
        if self.store.is_empty() || !features.has_descriptors() {
            self.nav.status = STATUS_NO_LANDMARKS.to_string();
            self.nav.confidence = 0.0;
            self.nav.best_match = None;
            self.last_outcome = FrameOutcome::NoLandmarks;
            self.emit(SignalColor::Red);
            return Annotation::Nothing;
        }

        let rec = &self.params.recognition;
        let scan = scan_landmarks(
            self.matcher.as_ref(),
            &features.descriptors,
            &self.store,
            rec.good_match_distance,
        );
        let confidence = confidence_from_score(scan.best_score, rec.full_confidence_matches);
        let band = MatchBand::classify(confidence, rec);

        let points = scan
            .best_match
            .and_then(|id| self.store.get(id))
            .map(|landmark| {
                matched_query_indices(
                    self.matcher.as_ref(),
                    &features.descriptors,
                    landmark,
                    rec.good_match_distance,
                )
            })
            .unwrap_or_default();

        log::debug!(
            "best landmark {:?} score {} confidence {confidence:.1} ({band:?})",
            scan.best_match,
            scan.best_score
        );

        self.nav.confidence = confidence;
        self.nav.best_match = scan.best_match;
        self.nav.status = band.status(scan.best_match);
        self.last_outcome = FrameOutcome::Recognized {
            best_match: scan.best_match,
            score: scan.best_score,
            confidence,
            band,
        };
        self.emit(band.signal());
        Annotation::Matches { points, band }
    }

    fn draw(&self, frame: &mut RgbFrame, features: &FeatureSet, annotation: Annotation) {
        let radius = self.params.overlay.marker_radius;
        match annotation {
            Annotation::Keypoints => {
                for kp in &features.keypoints {
                    draw_circle(frame, kp.position, radius, OVERLAY_GREEN);
                }
            }
            Annotation::Matches { points, band } => {
                let color = band_color(band);
                for kp in points.iter().filter_map(|&i| features.keypoints.get(i)) {
                    draw_circle(frame, kp.position, radius, color);
                }
                draw_confidence_readout(frame, self.nav.confidence, color);
            }
            Annotation::Nothing => {}
        }
    }

    fn emit(&mut self, color: SignalColor) {
        self.last_signal = Some(color);
        self.signal.signal(color);
    }
}

fn band_color(band: MatchBand) -> [u8; 3] {
    match band {
        MatchBand::Match => OVERLAY_GREEN,
        MatchBand::Possible => OVERLAY_AMBER,
        MatchBand::OffTrack => OVERLAY_RED,
    }
}

impl std::fmt::Debug for RecognitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionEngine")
            .field("params", &self.params)
            .field("nav", &self.nav)
            .field("landmarks", &self.store.len())
            .field("last_signal", &self.last_signal)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullArchive;
    use nalgebra::Point2;
    use trailsense_core::{BinaryDescriptor, DescriptorMatch, GrayImageView, Keypoint};
    use trailsense_signal::RecordingSignal;

    /// Reports `n` keypoints where `n` is the first pixel's luma.
    struct CountingExtractor;

    impl FeatureExtractor for CountingExtractor {
        fn extract(&self, image: &GrayImageView<'_>) -> FeatureSet {
            let n = image.data.first().copied().unwrap_or(0) as usize;
            let keypoints = (0..n)
                .map(|i| Keypoint {
                    position: Point2::new((i % 16) as f32 * 4.0 + 2.0, (i / 16) as f32 * 4.0 + 2.0),
                    angle: 0.0,
                    response: 1.0,
                })
                .collect();
            let descriptors = (0..n as u64).map(|i| BinaryDescriptor([i, 0, 0, 0])).collect();
            FeatureSet::new(keypoints, descriptors)
        }
    }

    struct ExactMatcher;

    impl DescriptorMatcher for ExactMatcher {
        fn match_descriptors(
            &self,
            query: &[BinaryDescriptor],
            train: &[BinaryDescriptor],
        ) -> Vec<DescriptorMatch> {
            query
                .iter()
                .enumerate()
                .filter_map(|(qi, q)| {
                    train.iter().position(|t| t == q).map(|ti| DescriptorMatch {
                        query_idx: qi,
                        train_idx: ti,
                        distance: 0,
                    })
                })
                .collect()
        }
    }

    fn frame(keypoints: u8) -> RgbFrame {
        RgbFrame::filled(64, 64, [keypoints; 3])
    }

    fn engine() -> (RecognitionEngine, RecordingSignal) {
        let probe = RecordingSignal::new();
        let engine = RecognitionEngine::new(
            EngineParams::default(),
            CountingExtractor,
            ExactMatcher,
            probe.clone(),
            NullArchive,
        )
        .unwrap();
        (engine, probe)
    }

    #[test]
    fn starts_initializing_in_explore() {
        let (engine, probe) = engine();
        let s = engine.state();
        assert_eq!(s.mode, Mode::Explore);
        assert_eq!(s.status, "SYSTEM INITIALIZING");
        assert_eq!(s.landmark_count, 0);
        assert_eq!(*engine.last_outcome(), FrameOutcome::Idle);
        assert!(probe.history().is_empty());
    }

    #[test]
    fn rejects_invalid_params() {
        let mut params = EngineParams::default();
        params.recognition.match_threshold = 10.0;
        let res = RecognitionEngine::new(
            params,
            CountingExtractor,
            ExactMatcher,
            RecordingSignal::new(),
            NullArchive,
        );
        assert!(matches!(res, Err(EngineError::InvalidParams(_))));
    }

    #[test]
    fn explore_overlay_marks_keypoints_without_touching_input() {
        let (mut engine, _) = engine();
        let input = frame(60);
        let out = engine.process_frame_at(&input, 0.0);
        assert_eq!(input, frame(60));
        assert_ne!(out, input);
        // First keypoint sits at (2, 2); its circle passes through (6, 2).
        assert_eq!(out.pixel(6, 2), Some(OVERLAY_GREEN));
    }

    #[test]
    fn overlay_can_be_disabled() {
        let mut params = EngineParams::default();
        params.overlay.enabled = false;
        let mut engine = RecognitionEngine::new(
            params,
            CountingExtractor,
            ExactMatcher,
            RecordingSignal::new(),
            NullArchive,
        )
        .unwrap();
        let input = frame(60);
        assert_eq!(engine.process_frame_at(&input, 0.0), input);
    }

    #[test]
    fn mode_change_keeps_state() {
        let (mut engine, probe) = engine();
        engine.process_frame_at(&frame(80), 1.0);
        engine.set_mode(Mode::Return);
        engine.set_mode(Mode::Explore);
        assert_eq!(engine.landmarks().len(), 1);
        assert_eq!(engine.navigation().last_capture_time, Some(1.0));
        assert_eq!(
            probe.history(),
            vec![SignalColor::Green, SignalColor::Amber, SignalColor::Green]
        );
        assert_eq!(engine.state().status, "EXPLORATION MODE ACTIVE");
    }

    #[test]
    fn return_overlay_draws_readout_in_band_color() {
        let (mut engine, _) = engine();
        engine.process_frame_at(&frame(80), 0.0);
        engine.set_mode(Mode::Return);
        let out = engine.process_frame_at(&frame(80), 5.0);
        assert_eq!(engine.state().status, "MATCH FOUND (ID: 0)");
        // Full gauge at (10..110, 10..20).
        assert_eq!(out.pixel(50, 15), Some(OVERLAY_GREEN));
    }
}
