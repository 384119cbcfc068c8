//! # cohort
//!
//! Compatibility ranking and cohort clustering for peer-introduction features.
//!
//! cohort turns user attribute records into comparable features, scores how
//! well two users fit each other, ranks candidate pools, and groups the whole
//! population into small cohorts. Newcomers are placed into an existing cohort
//! without retraining.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! cohort rank --profiles users.json --user alice --top-k 5
//! cohort cluster --profiles users.json
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use cohort::prelude::*;
//!
//! let engine = Engine::init(EngineConfig::default()).unwrap();
//!
//! let alice = UserProfile::new("alice")
//!     .with_personality_type("INTJ")
//!     .with_hobbies(["reading", "travel"])
//!     .with_preferences([Attribute::PersonalityType]);
//! let pool = vec![
//!     UserProfile::new("bob").with_personality_type("ENFP"),
//!     UserProfile::new("carol").with_hobbies(["reading"]),
//! ];
//!
//! let matches = engine.rank(&alice, &pool, None);
//! assert_eq!(matches[0].candidate_id.as_str(), "bob");
//! assert_eq!(matches[0].aggregate_score, 1.5);
//!
//! let assignments = engine.fit_population(&pool).unwrap();
//! assert_eq!(assignments.len(), 2);
//! let placed = engine.assign(&alice).unwrap();
//! assert_eq!(placed.cluster_label, ClusterLabel::new(0));
//! ```
//!
//! ## Crate Structure
//!
//! - `cohort-core` - profiles, personality table, hobby embeddings, feature encoder, errors
//! - `cohort-similarity` - compatibility scorer, ranker, match statistics
//! - `cohort-cluster` - k-means fitting and nearest-centroid assignment

pub mod config;
pub mod engine;
pub mod refit;

pub use config::{EncoderConfig, EngineConfig, ScoringConfig};
pub use engine::{Engine, Snapshot};
pub use refit::{RefitTicket, RefitWorker};

// Re-export core types
pub use cohort_core::{
    Attribute, EncodingSchema, Error, FeatureEncoder, FeatureVector, HobbyEmbeddings, HobbyMode,
    PersonalityTable, PersonalityType, ProfileRecord, Result, SchemaVersion, UserId, UserProfile,
};

// Re-export scoring
pub use cohort_similarity::{
    CompatibilityScore, MatchResponse, MatchStats, PreferenceWeights, RankedMatch, Ranker, Scorer,
};

// Re-export clustering
pub use cohort_cluster::{
    ClusterAssignment, ClusterConfig, ClusterFit, ClusterLabel, ClusterModel, KMeans, ModelVersion,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Attribute, ClusterAssignment, ClusterLabel, CompatibilityScore, Engine, EngineConfig,
        Error, HobbyMode, ProfileRecord, RankedMatch, Result, UserId, UserProfile,
    };
}
