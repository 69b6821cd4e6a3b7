//! Brute-force Hamming matching with cross-check.

use trailsense_core::{BinaryDescriptor, DescriptorMatch, DescriptorMatcher};

/// Exhaustive nearest-neighbour matcher over Hamming distance.
///
/// With `cross_check` enabled a pair `(q, t)` is kept only when `t` is the
/// nearest train descriptor of `q` *and* `q` is the nearest query descriptor
/// of `t`. Ties resolve to the lowest index on both sides.
#[derive(Clone, Copy, Debug)]
pub struct BruteForceMatcher {
    cross_check: bool,
}

impl Default for BruteForceMatcher {
    fn default() -> Self {
        Self { cross_check: true }
    }
}

impl BruteForceMatcher {
    pub fn new(cross_check: bool) -> Self {
        Self { cross_check }
    }

    #[inline]
    pub fn cross_check(&self) -> bool {
        self.cross_check
    }
}

impl DescriptorMatcher for BruteForceMatcher {
    fn match_descriptors(
        &self,
        query: &[BinaryDescriptor],
        train: &[BinaryDescriptor],
    ) -> Vec<DescriptorMatch> {
        if query.is_empty() || train.is_empty() {
            return Vec::new();
        }

        let forward: Vec<(usize, u32)> = query.iter().map(|q| nearest(q, train)).collect();
        if !self.cross_check {
            return forward
                .into_iter()
                .enumerate()
                .map(|(query_idx, (train_idx, distance))| DescriptorMatch {
                    query_idx,
                    train_idx,
                    distance,
                })
                .collect();
        }

        let mut backward: Vec<Option<usize>> = vec![None; train.len()];
        let mut out = Vec::new();
        for (query_idx, &(train_idx, distance)) in forward.iter().enumerate() {
            let best_query = *backward[train_idx]
                .get_or_insert_with(|| nearest(&train[train_idx], query).0);
            if best_query == query_idx {
                out.push(DescriptorMatch {
                    query_idx,
                    train_idx,
                    distance,
                });
            }
        }
        out
    }
}

/// Index and distance of the closest candidate; first index wins on ties.
fn nearest(needle: &BinaryDescriptor, haystack: &[BinaryDescriptor]) -> (usize, u32) {
    let mut best = (0usize, u32::MAX);
    for (idx, cand) in haystack.iter().enumerate() {
        let d = needle.hamming(cand);
        if d < best.1 {
            best = (idx, d);
            if d == 0 {
                break;
            }
        }
    }
    best
}
