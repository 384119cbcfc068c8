//! Per-attribute similarity functions
//!
//! Every function is total: missing or unparsable values score 0.0 rather
//! than failing. Results are bounded to [0.0, 1.0].

use cohort_core::vector::cosine_similarity;
use cohort_core::{HobbyEmbeddings, PersonalityTable, PersonalityType};
use std::collections::BTreeSet;

/// Personality score when both users share a type
pub const IDENTICAL_PERSONALITY_SCORE: f32 = 0.8;

/// Personality score when the candidate is a listed best match for the target
pub const BEST_MATCH_PERSONALITY_SCORE: f32 = 1.0;

/// Divisor applied to the summed hobby cosine similarities in embedding mode
pub const DEFAULT_EMBEDDING_NORMALIZATION: f32 = 3.0;

/// Exact equality of two categorical values
///
/// # Returns
/// 1.0 if both are present and equal, 0.0 otherwise
pub fn categorical_similarity(a: Option<&str>, b: Option<&str>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    }
}

/// Directional personality compatibility, keyed by the target's type
pub fn personality_similarity(
    table: &PersonalityTable,
    target: Option<&str>,
    candidate: Option<&str>,
) -> f32 {
    let parse = |v: Option<&str>| v.and_then(|s| s.parse::<PersonalityType>().ok());
    match (parse(target), parse(candidate)) {
        (Some(t), Some(c)) if t == c => IDENTICAL_PERSONALITY_SCORE,
        (Some(t), Some(c)) if table.is_best_match(t, c) => BEST_MATCH_PERSONALITY_SCORE,
        _ => 0.0,
    }
}

/// Share of the target's hobbies the candidate also has: `|T ∩ C| / |T|`
///
/// 0.0 when the target has no hobbies.
pub fn containment_ratio(target: &BTreeSet<String>, candidate: &BTreeSet<String>) -> f32 {
    if target.is_empty() {
        return 0.0;
    }
    let shared = target.intersection(candidate).count();
    shared as f32 / target.len() as f32
}

/// Embedding-based hobby similarity
///
/// Sums the cosine similarity of every (target, candidate) hobby pair where
/// both tokens have an embedding, divides by `normalization` and clamps to
/// [0.0, 1.0].
///
/// Pairs are summed, not averaged, so more shared hobbies score higher until
/// the clamp. A negative sum (mostly opposed hobbies) clamps to 0.0 and is
/// indistinguishable from having no known hobbies.
pub fn embedding_similarity(
    table: &HobbyEmbeddings,
    target: &BTreeSet<String>,
    candidate: &BTreeSet<String>,
    normalization: f32,
) -> f32 {
    if normalization <= 0.0 {
        return 0.0;
    }

    let candidate_vectors: Vec<&[f32]> = candidate.iter().filter_map(|h| table.get(h)).collect();
    if candidate_vectors.is_empty() {
        return 0.0;
    }

    let total: f32 = target
        .iter()
        .filter_map(|h| table.get(h))
        .map(|t| {
            candidate_vectors
                .iter()
                .map(|c| cosine_similarity(t, c))
                .sum::<f32>()
        })
        .sum();

    (total / normalization).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_categorical_similarity() {
        assert_eq!(categorical_similarity(Some("SE"), Some("SE")), 1.0);
        assert_eq!(categorical_similarity(Some("SE"), Some("sales")), 0.0);
        assert_eq!(categorical_similarity(None, Some("SE")), 0.0);
        assert_eq!(categorical_similarity(None, None), 0.0);
    }

    #[test]
    fn test_personality_similarity() {
        let table = PersonalityTable::default();
        assert_eq!(personality_similarity(&table, Some("INTJ"), Some("INTJ")), 0.8);
        assert_eq!(personality_similarity(&table, Some("INTJ"), Some("ESFJ")), 1.0);
        assert_eq!(personality_similarity(&table, Some("INTJ"), Some("ESTP")), 0.0);
        assert_eq!(personality_similarity(&table, Some("INTJ"), Some("????")), 0.0);
        assert_eq!(personality_similarity(&table, None, Some("INTJ")), 0.0);
    }

    #[test]
    fn test_personality_similarity_is_directional() {
        let table = PersonalityTable::default();
        assert_eq!(personality_similarity(&table, Some("INTJ"), Some("ESFJ")), 1.0);
        assert_eq!(personality_similarity(&table, Some("ESFJ"), Some("INTJ")), 0.0);
    }

    #[test]
    fn test_containment_ratio() {
        let target = set(&["reading", "travel"]);
        let candidate = set(&["reading", "movies"]);
        assert_eq!(containment_ratio(&target, &candidate), 0.5);
        assert_eq!(containment_ratio(&set(&[]), &candidate), 0.0);
        assert_eq!(containment_ratio(&target, &set(&[])), 0.0);
        assert_eq!(containment_ratio(&target, &target), 1.0);

        // directional: |T| is the denominator
        let wide = set(&["reading", "travel", "movies", "games"]);
        assert_eq!(containment_ratio(&target, &wide), 1.0);
        assert_eq!(containment_ratio(&wide, &target), 0.5);
    }

    #[test]
    fn test_embedding_similarity() {
        let mut map = HashMap::new();
        map.insert("soccer".to_string(), vec![1.0, 0.0]);
        map.insert("futsal".to_string(), vec![1.0, 0.0]);
        map.insert("chess".to_string(), vec![0.0, 1.0]);
        let table = HobbyEmbeddings::from_map(map).unwrap();

        let sim = embedding_similarity(&table, &set(&["soccer"]), &set(&["futsal"]), 3.0);
        assert!((sim - 1.0 / 3.0).abs() < 1e-6);

        let orthogonal = embedding_similarity(&table, &set(&["soccer"]), &set(&["chess"]), 3.0);
        assert_eq!(orthogonal, 0.0);

        let unknown = embedding_similarity(&table, &set(&["soccer"]), &set(&["karaoke"]), 3.0);
        assert_eq!(unknown, 0.0);

        // clamped to 1.0
        let many = embedding_similarity(
            &table,
            &set(&["soccer", "futsal"]),
            &set(&["soccer", "futsal"]),
            3.0,
        );
        assert_eq!(many, 1.0);
    }

    #[test]
    fn test_embedding_similarity_sums_pairs_and_clamps_negative() {
        let mut map = HashMap::new();
        map.insert("soccer".to_string(), vec![1.0, 0.0]);
        map.insert("futsal".to_string(), vec![1.0, 0.0]);
        map.insert("napping".to_string(), vec![-1.0, 0.0]);
        let table = HobbyEmbeddings::from_map(map).unwrap();

        let opposed = embedding_similarity(&table, &set(&["soccer"]), &set(&["napping"]), 3.0);
        assert_eq!(opposed, 0.0);

        // two matching pairs sum to 2/3 where an average would give 1/3
        let two_pairs = embedding_similarity(
            &table,
            &set(&["soccer", "futsal"]),
            &set(&["futsal"]),
            3.0,
        );
        assert!((two_pairs - 2.0 / 3.0).abs() < 1e-6);
    }
}
