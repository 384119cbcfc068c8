//! Output shapes handed to callers of the ranker
//!
//! [`MatchResponse`] is the compact `{candidate_id, aggregate_score}` list a
//! notification collaborator consumes; [`MatchStats`] summarises a ranking.

use crate::rank::RankedMatch;
use cohort_core::{Attribute, UserId};
use serde::Serialize;

/// Compact entry of a ranking without the attribute breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub candidate_id: UserId,
    pub aggregate_score: f32,
}

impl From<&RankedMatch> for MatchSummary {
    fn from(ranked: &RankedMatch) -> Self {
        Self {
            candidate_id: ranked.candidate_id.clone(),
            aggregate_score: ranked.aggregate_score,
        }
    }
}

/// Ranking result for one target user
#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub user_id: UserId,
    pub matches: Vec<MatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<MatchStats>,
}

impl MatchResponse {
    pub fn from_ranked(user_id: UserId, ranked: &[RankedMatch]) -> Self {
        Self {
            user_id,
            matches: ranked.iter().map(MatchSummary::from).collect(),
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: MatchStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Summary statistics for a ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStats {
    /// Number of candidates considered
    pub candidates_count: usize,
    /// Number of results returned
    pub results_count: usize,
    pub avg_score: f32,
    pub best_score: f32,
    /// Attribute that contributed most to the best match
    pub top_contributing_attribute: Option<Attribute>,
}

impl MatchStats {
    /// Compute stats from ranked results (assumed sorted best first)
    pub fn compute(results: &[RankedMatch], candidates_count: usize) -> Self {
        let Some(best) = results.first() else {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_attribute: None,
            };
        };

        let avg_score =
            results.iter().map(|r| r.aggregate_score).sum::<f32>() / results.len() as f32;

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score,
            best_score: best.aggregate_score,
            top_contributing_attribute: best.score.top_contributor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::Ranker;
    use cohort_core::UserProfile;

    fn ranked() -> Vec<RankedMatch> {
        let target = UserProfile::new("t")
            .with_role("SE")
            .with_hometown("Tokyo")
            .with_preferences([Attribute::Hometown]);
        let candidates = vec![
            UserProfile::new("1").with_role("SE").with_hometown("Tokyo"),
            UserProfile::new("2").with_role("SE"),
            UserProfile::new("3").with_role("sales"),
        ];
        Ranker::default().rank(&target, &candidates, 5)
    }

    #[test]
    fn test_match_stats() {
        let results = ranked();
        let stats = MatchStats::compute(&results, 3);

        assert_eq!(stats.candidates_count, 3);
        assert_eq!(stats.results_count, 3);
        assert_eq!(stats.best_score, 2.5);
        assert!((stats.avg_score - 3.5 / 3.0).abs() < 0.01);
        assert_eq!(stats.top_contributing_attribute, Some(Attribute::Hometown));
    }

    #[test]
    fn test_empty_stats() {
        let stats = MatchStats::compute(&[], 5);
        assert_eq!(stats.candidates_count, 5);
        assert_eq!(stats.results_count, 0);
        assert_eq!(stats.best_score, 0.0);
        assert_eq!(stats.top_contributing_attribute, None);
    }

    #[test]
    fn test_match_response_serialization() {
        let results = ranked();
        let response = MatchResponse::from_ranked(UserId::new("t"), &results)
            .with_stats(MatchStats::compute(&results, 3));
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"matches\""));
        assert!(json.contains("\"candidate_id\":\"1\""));
        assert!(json.contains("\"aggregate_score\":2.5"));
        assert!(json.contains("\"top_contributing_attribute\":\"hometown\""));
    }

    #[test]
    fn test_stats_omitted_when_absent() {
        let response = MatchResponse::from_ranked(UserId::new("t"), &ranked());
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("\"stats\""));
    }
}
