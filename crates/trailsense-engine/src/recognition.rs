//! Landmark scan, confidence scoring and classification for return frames.

use serde::{Deserialize, Serialize};
use trailsense_core::{BinaryDescriptor, DescriptorMatch, DescriptorMatcher};
use trailsense_signal::SignalColor;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Landmark, LandmarkStore, RecognitionParams};

/// Confidence band of a recognition verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBand {
    Match,
    Possible,
    OffTrack,
}

impl MatchBand {
    /// Highest band first; both thresholds are strict.
    pub fn classify(confidence: f32, params: &RecognitionParams) -> Self {
        if confidence > params.match_threshold {
            MatchBand::Match
        } else if confidence > params.possible_threshold {
            MatchBand::Possible
        } else {
            MatchBand::OffTrack
        }
    }

    pub fn signal(self) -> SignalColor {
        match self {
            MatchBand::Match => SignalColor::Green,
            MatchBand::Possible => SignalColor::Amber,
            MatchBand::OffTrack => SignalColor::Red,
        }
    }

    pub fn status(self, best_match: Option<usize>) -> String {
        match (self, best_match) {
            (MatchBand::Match, Some(id)) => format!("MATCH FOUND (ID: {id})"),
            (MatchBand::Match, None) => "MATCH FOUND".to_string(),
            (MatchBand::Possible, _) => "POSSIBLE MATCH...".to_string(),
            (MatchBand::OffTrack, _) => "OFF TRACK".to_string(),
        }
    }
}

/// Matches with a Hamming distance strictly below `max_distance`.
pub fn good_matches(
    matches: &[DescriptorMatch],
    max_distance: u32,
) -> impl Iterator<Item = &DescriptorMatch> + '_ {
    matches.iter().filter(move |m| m.distance < max_distance)
}

/// Map a good-match count to a confidence in `[0, 100]`.
pub fn confidence_from_score(score: usize, full_confidence_matches: f32) -> f32 {
    (score as f32 * 100.0 / full_confidence_matches).clamp(0.0, 100.0)
}

/// Outcome of scanning every stored landmark against one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanResult {
    /// First landmark with the highest positive score.
    pub best_match: Option<usize>,
    pub best_score: usize,
    /// Good-match count per landmark, in store order.
    pub scores: Vec<usize>,
}

/// Score the query descriptors against every landmark in store order.
///
/// A landmark only replaces the current best with a strictly greater score,
/// so ties go to the earliest landmark. A best score of zero leaves
/// `best_match` unset.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(landmarks = store.len(), query = query.len()))
)]
pub fn scan_landmarks<M: DescriptorMatcher + ?Sized>(
    matcher: &M,
    query: &[BinaryDescriptor],
    store: &LandmarkStore,
    max_distance: u32,
) -> ScanResult {
    let mut best_match = None;
    let mut best_score = 0usize;
    let mut scores = Vec::with_capacity(store.len());

    for landmark in store {
        let matches = matcher.match_descriptors(query, &landmark.descriptors);
        let score = good_matches(&matches, max_distance).count();
        if score > best_score {
            best_score = score;
            best_match = Some(landmark.id);
        }
        scores.push(score);
    }

    ScanResult {
        best_match,
        best_score,
        scores,
    }
}

/// Query descriptor indices that form good matches with `landmark`.
pub fn matched_query_indices<M: DescriptorMatcher + ?Sized>(
    matcher: &M,
    query: &[BinaryDescriptor],
    landmark: &Landmark,
    max_distance: u32,
) -> Vec<usize> {
    let matches = matcher.match_descriptors(query, &landmark.descriptors);
    good_matches(&matches, max_distance).map(|m| m.query_idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Pairs descriptor `i` with `i` and uses the first word as the distance.
    struct IndexMatcher;

    impl DescriptorMatcher for IndexMatcher {
        fn match_descriptors(
            &self,
            query: &[BinaryDescriptor],
            train: &[BinaryDescriptor],
        ) -> Vec<DescriptorMatch> {
            query
                .iter()
                .zip(train)
                .enumerate()
                .map(|(i, (_, t))| DescriptorMatch {
                    query_idx: i,
                    train_idx: i,
                    distance: t.0[0] as u32,
                })
                .collect()
        }
    }

    fn landmark_with_distances(store: &mut LandmarkStore, distances: &[u64]) {
        let descriptors = distances
            .iter()
            .map(|&d| BinaryDescriptor([d, 0, 0, 0]))
            .collect();
        let t = store.last_timestamp().unwrap_or(0.0);
        store.append(descriptors, 100, t, None).unwrap();
    }

    #[test]
    fn confidence_scale_and_clamp() {
        assert_relative_eq!(confidence_from_score(0, 50.0), 0.0);
        assert_relative_eq!(confidence_from_score(25, 50.0), 50.0);
        assert_relative_eq!(confidence_from_score(50, 50.0), 100.0);
        assert_relative_eq!(confidence_from_score(75, 50.0), 100.0);
        assert_relative_eq!(confidence_from_score(35, 50.0), 70.0);
    }

    #[test]
    fn thresholds_are_strict() {
        let p = RecognitionParams::default();
        assert_eq!(MatchBand::classify(70.0, &p), MatchBand::Possible);
        assert_eq!(MatchBand::classify(70.1, &p), MatchBand::Match);
        assert_eq!(MatchBand::classify(30.0, &p), MatchBand::OffTrack);
        assert_eq!(MatchBand::classify(30.1, &p), MatchBand::Possible);
        assert_eq!(MatchBand::classify(0.0, &p), MatchBand::OffTrack);
    }

    #[test]
    fn band_status_and_signal() {
        assert_eq!(MatchBand::Match.status(Some(3)), "MATCH FOUND (ID: 3)");
        assert_eq!(MatchBand::Possible.status(Some(3)), "POSSIBLE MATCH...");
        assert_eq!(MatchBand::OffTrack.status(None), "OFF TRACK");
        assert_eq!(MatchBand::Possible.signal(), SignalColor::Amber);
    }

    #[test]
    fn good_match_distance_is_strict() {
        let matches = [49, 50, 51, 0].map(|d| DescriptorMatch {
            query_idx: 0,
            train_idx: 0,
            distance: d,
        });
        assert_eq!(good_matches(&matches, 50).count(), 2);
    }

    #[test]
    fn ties_keep_the_earliest_landmark() {
        let mut store = LandmarkStore::new();
        landmark_with_distances(&mut store, &[90, 90]);
        landmark_with_distances(&mut store, &[10, 10, 90]);
        landmark_with_distances(&mut store, &[10, 20, 90]);
        let query = vec![BinaryDescriptor::zeros(); 3];

        let scan = scan_landmarks(&IndexMatcher, &query, &store, 50);
        assert_eq!(scan.scores, vec![0, 2, 2]);
        assert_eq!(scan.best_match, Some(1));
        assert_eq!(scan.best_score, 2);

        let points = matched_query_indices(&IndexMatcher, &query, &store.as_slice()[1], 50);
        assert_eq!(points, vec![0, 1]);
    }

    #[test]
    fn zero_scores_leave_best_unset() {
        let mut store = LandmarkStore::new();
        landmark_with_distances(&mut store, &[200, 200]);
        let scan = scan_landmarks(&IndexMatcher, &[BinaryDescriptor::zeros()], &store, 50);
        assert_eq!(scan.best_match, None);
        assert_eq!(scan.best_score, 0);
    }
}
