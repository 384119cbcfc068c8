//! Candidate ranking
//!
//! Scores every candidate against a target and returns the best `top_k`,
//! sorted by aggregate score descending with candidate id ascending as the
//! tie-break, so equal scores always come back in the same order.

use crate::scorer::{CompatibilityScore, Scorer};
use cohort_core::{UserId, UserProfile};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

/// Number of matches returned when the caller does not say otherwise
pub const DEFAULT_TOP_K: usize = 5;

/// A scored candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch {
    pub candidate_id: UserId,
    pub aggregate_score: f32,
    /// Full per-attribute breakdown
    pub score: CompatibilityScore,
}

impl RankedMatch {
    fn cmp_rank(&self, other: &Self) -> Ordering {
        OrderedFloat(other.aggregate_score)
            .cmp(&OrderedFloat(self.aggregate_score))
            .then_with(|| self.candidate_id.cmp(&other.candidate_id))
    }
}

/// Orders candidate pools with a [`Scorer`]
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    scorer: Scorer,
}

impl Ranker {
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Rank `candidates` for `target`
    ///
    /// The target itself (same id) is skipped. Returns at most `top_k`
    /// entries, fewer when the pool is smaller.
    pub fn rank(
        &self,
        target: &UserProfile,
        candidates: &[UserProfile],
        top_k: usize,
    ) -> Vec<RankedMatch> {
        if top_k == 0 {
            return Vec::new();
        }

        let mut results: Vec<RankedMatch> = candidates
            .par_iter()
            .filter(|candidate| candidate.id != target.id)
            .map(|candidate| {
                let score = self.scorer.score(target, candidate);
                RankedMatch {
                    candidate_id: candidate.id.clone(),
                    aggregate_score: score.aggregate,
                    score,
                }
            })
            .collect();

        results.sort_by(RankedMatch::cmp_rank);
        results.truncate(top_k);
        results
    }
}
