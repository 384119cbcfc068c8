//! # cohort Core
//!
//! Core types for the cohort matching and clustering engine.
//!
//! This crate provides the data model and the feature encoder:
//!
//! - [`UserProfile`] - Scoreable user attributes, plus [`ProfileRecord`] for raw store rows
//! - [`PersonalityTable`] - Directional personality best-match lookup
//! - [`HobbyEmbeddings`] - Pretrained hobby vectors, loaded once and shared
//! - [`FeatureEncoder`] / [`EncodingSchema`] - Frozen vocabularies and profile encoding
//! - [`FeatureVector`] - Fixed-length numeric encoding tagged with its schema version
//!
//! ## Example
//!
//! ```rust
//! use cohort_core::{FeatureEncoder, UserProfile};
//!
//! let profiles = vec![
//!     UserProfile::new("u1").with_role("SE").with_hobbies(["reading", "travel"]),
//!     UserProfile::new("u2").with_role("sales").with_hobbies(["movies"]),
//! ];
//!
//! let schema = FeatureEncoder::multi_hot().fit(&profiles).unwrap();
//! let vector = schema.encode(&profiles[0]);
//! assert_eq!(vector.dim(), schema.dim());
//!
//! // Late arrivals with unseen values still encode against the same schema
//! let newcomer = UserProfile::new("u3").with_role("consultant");
//! assert_eq!(schema.encode(&newcomer).schema_version(), schema.version());
//! ```

pub mod embedding;
pub mod encoder;
pub mod error;
pub mod personality;
pub mod profile;
pub mod vector;

pub use embedding::HobbyEmbeddings;
pub use encoder::{CategoryVocabulary, EncodingSchema, FeatureEncoder, HobbyMode, SchemaVersion};
pub use error::{Error, Result};
pub use personality::{PersonalityTable, PersonalityType};
pub use profile::{Attribute, ProfileRecord, UserId, UserProfile};
pub use vector::FeatureVector;
