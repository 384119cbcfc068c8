//! # cohort Similarity
//!
//! Compatibility scoring and ranking between user profiles.
//!
//! ## Features
//!
//! - **Per-attribute scoring**: exact match for categorical attributes, a
//!   directional personality lookup, and a hobby overlap policy
//! - **Preference weighting**: attributes the target flags as important are
//!   multiplied by a weight (1.5 by default)
//! - **Deterministic ranking**: score descending, candidate id ascending on ties
//! - **Explainability**: per-attribute raw score, weight and contribution
//!
//! ## Example
//!
//! ```rust
//! use cohort_core::{Attribute, UserProfile};
//! use cohort_similarity::{Ranker, Scorer};
//!
//! let target = UserProfile::new("t")
//!     .with_personality_type("INTJ")
//!     .with_hobbies(["reading", "travel"])
//!     .with_preferences([Attribute::PersonalityType]);
//! let candidates = vec![
//!     UserProfile::new("a").with_personality_type("ESFJ").with_hobbies(["reading"]),
//!     UserProfile::new("b").with_personality_type("ESTP").with_hobbies(["movies"]),
//! ];
//!
//! let ranker = Ranker::new(Scorer::default());
//! let matches = ranker.rank(&target, &candidates, 5);
//! assert_eq!(matches[0].candidate_id.as_str(), "a");
//! assert_eq!(matches[0].aggregate_score, 2.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Profiles   │────>│   Scorer    │────>│   Ranker    │
//! │ (target, c) │     │ (per attr)  │     │ (top_k)     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │   Weights   │     │   Explain   │
//!                     │ (prefs)     │     │  (stats)    │
//!                     └─────────────┘     └─────────────┘
//! ```

pub mod distance;
pub mod explain;
pub mod rank;
pub mod scorer;
pub mod weights;

pub use distance::{
    BEST_MATCH_PERSONALITY_SCORE, DEFAULT_EMBEDDING_NORMALIZATION, IDENTICAL_PERSONALITY_SCORE,
};
pub use explain::{MatchResponse, MatchStats, MatchSummary};
pub use rank::{RankedMatch, Ranker, DEFAULT_TOP_K};
pub use scorer::{AttributeScore, CompatibilityScore, HobbySimilarity, Scorer};
pub use weights::{PreferenceWeights, DEFAULT_PREFERENCE_WEIGHT};
