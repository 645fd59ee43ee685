//! Batch selection and per-image decision state.

use crate::discover::ImageCandidate;
use crate::error::{PicsweepError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::path::Path;

/// Images are reviewed in working sets of up to this many.
pub const BATCH_SIZE: usize = 3;

/// The user's verdict on one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Trash,
}

/// Per-member state within a batch. `Keep` and `Trashed` are terminal;
/// no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionState {
    Pending,
    Keep,
    Trashed,
}

/// A working set of up to [`BATCH_SIZE`] images with exactly one decision
/// slot per member.
#[derive(Debug, Clone)]
pub struct Batch {
    members: Vec<ImageCandidate>,
    decisions: Vec<DecisionState>,
}

impl Batch {
    fn new(members: Vec<ImageCandidate>) -> Self {
        let decisions = vec![DecisionState::Pending; members.len()];
        Batch { members, decisions }
    }

    pub fn members(&self) -> &[ImageCandidate] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn decision_for(&self, path: &Path) -> Option<DecisionState> {
        self.members
            .iter()
            .position(|m| m.path == path)
            .map(|i| self.decisions[i])
    }

    /// Transitions the member at `path` from Pending to the terminal state
    /// for `decision`. Fails with `InvalidTransition` if the path is not a
    /// member or the member is no longer Pending; state is unchanged on
    /// failure.
    pub fn apply_decision(&mut self, path: &Path, decision: Decision) -> Result<()> {
        let index = self
            .members
            .iter()
            .position(|m| m.path == path)
            .ok_or_else(|| {
                PicsweepError::invalid_transition(path, "path is not a member of this batch")
            })?;

        if self.decisions[index] != DecisionState::Pending {
            return Err(PicsweepError::invalid_transition(
                path,
                "member already decided",
            ));
        }

        self.decisions[index] = match decision {
            Decision::Keep => DecisionState::Keep,
            Decision::Trash => DecisionState::Trashed,
        };
        Ok(())
    }

    /// True iff no member remains Pending.
    pub fn is_complete(&self) -> bool {
        self.decisions.iter().all(|d| *d != DecisionState::Pending)
    }

    /// Members still Pending, in their original order. Drives the
    /// redraw-after-partial-decision paths (screen clear, restart).
    pub fn undecided_members(&self) -> Vec<&ImageCandidate> {
        self.members
            .iter()
            .zip(&self.decisions)
            .filter(|(_, d)| **d == DecisionState::Pending)
            .map(|(m, _)| m)
            .collect()
    }
}

/// Hands out batches from the discovered candidates.
///
/// Selection policy: sequential in discovery order. With [`shuffle`], the
/// whole candidate list is permuted once up front with a seeded RNG, after
/// which batching stays sequential - so selection is deterministic given the
/// seed.
///
/// [`shuffle`]: BatchSelector::shuffle
#[derive(Debug)]
pub struct BatchSelector {
    remaining: VecDeque<ImageCandidate>,
}

impl BatchSelector {
    pub fn new(candidates: Vec<ImageCandidate>) -> Self {
        BatchSelector {
            remaining: candidates.into(),
        }
    }

    /// Permutes the not-yet-batched candidates with `StdRng` seeded from
    /// `seed`.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut candidates: Vec<ImageCandidate> = self.remaining.drain(..).collect();
        candidates.shuffle(&mut rng);
        self.remaining = candidates.into();
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    /// Pulls up to [`BATCH_SIZE`] candidates. The final batch may be smaller;
    /// `None` means the source is exhausted (a batch is never empty).
    pub fn next_batch(&mut self) -> Option<Batch> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = BATCH_SIZE.min(self.remaining.len());
        let members: Vec<ImageCandidate> = self.remaining.drain(..take).collect();
        Some(Batch::new(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn candidate(name: &str, ordinal: usize) -> ImageCandidate {
        ImageCandidate {
            path: PathBuf::from(format!("/pics/{}", name)),
            depth: 0,
            discovered_at: ordinal,
        }
    }

    fn seven() -> Vec<ImageCandidate> {
        (0..7).map(|i| candidate(&format!("{}.png", i), i)).collect()
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_seven_images_batch_as_3_3_1() {
            let mut selector = BatchSelector::new(seven());

            let sizes: Vec<usize> = std::iter::from_fn(|| selector.next_batch())
                .map(|b| b.len())
                .collect();
            assert_eq!(sizes, vec![3, 3, 1]);
        }

        #[test]
        fn test_every_candidate_appears_exactly_once() {
            let mut selector = BatchSelector::new(seven());
            let mut seen = Vec::new();

            while let Some(batch) = selector.next_batch() {
                for m in batch.members() {
                    seen.push(m.discovered_at);
                }
            }

            seen.sort();
            assert_eq!(seen, (0..7).collect::<Vec<_>>());
        }

        #[test]
        fn test_exhausted_selector_yields_none_not_empty() {
            let mut selector = BatchSelector::new(vec![candidate("only.png", 0)]);

            let first = selector.next_batch().unwrap();
            assert_eq!(first.len(), 1);
            assert!(selector.next_batch().is_none());
        }

        #[test]
        fn test_sequential_order_preserved() {
            let mut selector = BatchSelector::new(seven());
            let batch = selector.next_batch().unwrap();

            let ordinals: Vec<_> = batch.members().iter().map(|m| m.discovered_at).collect();
            assert_eq!(ordinals, vec![0, 1, 2]);
        }

        #[test]
        fn test_shuffle_deterministic_given_seed() {
            let mut a = BatchSelector::new(seven());
            let mut b = BatchSelector::new(seven());
            a.shuffle(42);
            b.shuffle(42);

            let batch_a = a.next_batch().unwrap();
            let batch_b = b.next_batch().unwrap();
            assert_eq!(batch_a.members(), batch_b.members());
        }

        #[test]
        fn test_shuffle_covers_all_candidates() {
            let mut selector = BatchSelector::new(seven());
            selector.shuffle(7);

            let mut seen = Vec::new();
            while let Some(batch) = selector.next_batch() {
                for m in batch.members() {
                    seen.push(m.discovered_at);
                }
            }
            seen.sort();
            assert_eq!(seen, (0..7).collect::<Vec<_>>());
        }
    }

    mod batch_tests {
        use super::*;

        fn three_member_batch() -> Batch {
            let mut selector = BatchSelector::new(seven());
            selector.next_batch().unwrap()
        }

        #[test]
        fn test_new_batch_all_pending() {
            let batch = three_member_batch();
            assert!(!batch.is_complete());
            assert_eq!(batch.undecided_members().len(), 3);
            for m in batch.members() {
                assert_eq!(batch.decision_for(&m.path), Some(DecisionState::Pending));
            }
        }

        #[test]
        fn test_apply_keep_and_trash() {
            let mut batch = three_member_batch();
            let first = batch.members()[0].path.clone();
            let second = batch.members()[1].path.clone();

            batch.apply_decision(&first, Decision::Keep).unwrap();
            batch.apply_decision(&second, Decision::Trash).unwrap();

            assert_eq!(batch.decision_for(&first), Some(DecisionState::Keep));
            assert_eq!(batch.decision_for(&second), Some(DecisionState::Trashed));
            assert!(!batch.is_complete());
        }

        #[test]
        fn test_apply_decision_twice_is_invalid_and_state_unchanged() {
            let mut batch = three_member_batch();
            let path = batch.members()[0].path.clone();

            batch.apply_decision(&path, Decision::Keep).unwrap();
            let err = batch.apply_decision(&path, Decision::Trash).unwrap_err();

            assert!(matches!(err, PicsweepError::InvalidTransition { .. }));
            assert_eq!(batch.decision_for(&path), Some(DecisionState::Keep));
        }

        #[test]
        fn test_apply_decision_non_member_is_invalid() {
            let mut batch = three_member_batch();
            let outsider = PathBuf::from("/elsewhere/stranger.png");

            let err = batch.apply_decision(&outsider, Decision::Keep).unwrap_err();
            assert!(matches!(err, PicsweepError::InvalidTransition { .. }));
        }

        #[test]
        fn test_complete_after_all_decided() {
            let mut batch = three_member_batch();
            let paths: Vec<_> = batch.members().iter().map(|m| m.path.clone()).collect();

            for path in &paths {
                batch.apply_decision(path, Decision::Keep).unwrap();
            }
            assert!(batch.is_complete());
            assert!(batch.undecided_members().is_empty());
        }

        #[test]
        fn test_undecided_members_preserve_order() {
            let mut batch = three_member_batch();
            let middle = batch.members()[1].path.clone();

            batch.apply_decision(&middle, Decision::Trash).unwrap();

            let undecided = batch.undecided_members();
            assert_eq!(undecided.len(), 2);
            assert_eq!(undecided[0].discovered_at, 0);
            assert_eq!(undecided[1].discovered_at, 2);
        }
    }
}
