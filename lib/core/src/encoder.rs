//! Feature encoding
//!
//! [`FeatureEncoder::fit`] freezes an [`EncodingSchema`] from a population:
//! one ordered vocabulary per categorical attribute plus a hobby encoding
//! (multi-hot vocabulary or an embedding table). [`EncodingSchema::encode`]
//! turns a profile into a fixed-length [`FeatureVector`] against that schema.
//!
//! Layout of an encoded vector, in [`Attribute::CATEGORICAL`] order:
//!
//! ```text
//! [ hometown one-hot | field one-hot | role one-hot | personality one-hot | alma_mater one-hot | hobbies ]
//! ```
//!
//! Values never seen at fit time encode to an all-zero block, so encoding
//! against a schema cannot fail.

use crate::embedding::HobbyEmbeddings;
use crate::profile::{Attribute, UserProfile};
use crate::vector::FeatureVector;
use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifies the frozen vocabulary an encoding was built against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(u64);

impl SchemaVersion {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema:{:016x}", self.0)
    }
}

/// How the multi-valued hobby attribute is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HobbyMode {
    /// One slot per distinct hobby token seen at fit time
    #[default]
    MultiHot,
    /// Mean of the pretrained vectors of the user's known hobbies
    Embedding,
}

/// Ordered set of observed values for one categorical attribute
#[derive(Debug, Clone)]
pub struct CategoryVocabulary {
    values: Vec<String>,
    index: AHashMap<String, usize>,
}

impl CategoryVocabulary {
    fn from_values(values: BTreeSet<String>) -> Self {
        let values: Vec<String> = values.into_iter().collect();
        let index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();
        Self { values, index }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn position(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[derive(Debug, Clone)]
enum HobbyEncoding {
    MultiHot(CategoryVocabulary),
    Embedding(Arc<HobbyEmbeddings>),
}

impl HobbyEncoding {
    fn dim(&self) -> usize {
        match self {
            HobbyEncoding::MultiHot(vocabulary) => vocabulary.len(),
            HobbyEncoding::Embedding(table) => table.dim(),
        }
    }
}

/// A frozen encoding schema. Immutable once fit.
#[derive(Debug, Clone)]
pub struct EncodingSchema {
    version: SchemaVersion,
    categories: Vec<(Attribute, CategoryVocabulary)>,
    hobbies: HobbyEncoding,
    population: usize,
}

impl EncodingSchema {
    #[inline]
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Number of profiles the schema was fit over
    #[inline]
    pub fn population(&self) -> usize {
        self.population
    }

    pub fn hobby_mode(&self) -> HobbyMode {
        match self.hobbies {
            HobbyEncoding::MultiHot(_) => HobbyMode::MultiHot,
            HobbyEncoding::Embedding(_) => HobbyMode::Embedding,
        }
    }

    /// Total length of every vector encoded against this schema
    pub fn dim(&self) -> usize {
        self.categories.iter().map(|(_, v)| v.len()).sum::<usize>() + self.hobbies.dim()
    }

    pub fn vocabulary(&self, attribute: Attribute) -> Option<&CategoryVocabulary> {
        self.categories
            .iter()
            .find(|(a, _)| *a == attribute)
            .map(|(_, v)| v)
    }

    /// Hobby tokens in slot order; `None` in embedding mode
    pub fn hobby_vocabulary(&self) -> Option<&[String]> {
        match &self.hobbies {
            HobbyEncoding::MultiHot(vocabulary) => Some(vocabulary.values()),
            HobbyEncoding::Embedding(_) => None,
        }
    }

    /// Human-readable name of every vector slot, e.g. `role=SE` or `hobbies[3]`
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim());
        for (attribute, vocabulary) in &self.categories {
            names.extend(vocabulary.values().iter().map(|v| format!("{}={}", attribute, v)));
        }
        match &self.hobbies {
            HobbyEncoding::MultiHot(vocabulary) => {
                names.extend(vocabulary.values().iter().map(|v| format!("hobbies={}", v)));
            }
            HobbyEncoding::Embedding(table) => {
                names.extend((0..table.dim()).map(|i| format!("hobbies[{}]", i)));
            }
        }
        names
    }

    /// Encode one profile. Unknown values leave their block zeroed.
    pub fn encode(&self, profile: &UserProfile) -> FeatureVector {
        let mut data = vec![0.0f32; self.dim()];
        let mut offset = 0;

        for (attribute, vocabulary) in &self.categories {
            if let Some(slot) = profile
                .categorical(*attribute)
                .and_then(|value| vocabulary.position(value))
            {
                data[offset + slot] = 1.0;
            }
            offset += vocabulary.len();
        }

        match &self.hobbies {
            HobbyEncoding::MultiHot(vocabulary) => {
                for slot in profile.hobbies.iter().filter_map(|h| vocabulary.position(h)) {
                    data[offset + slot] = 1.0;
                }
            }
            HobbyEncoding::Embedding(table) => {
                if let Some(mean) = table.mean_vector(profile.hobbies.iter().map(String::as_str)) {
                    data[offset..offset + table.dim()].copy_from_slice(&mean);
                }
            }
        }

        FeatureVector::new(self.version, data)
    }

    /// Encode a population in input order
    pub fn encode_batch(&self, profiles: &[UserProfile]) -> Vec<FeatureVector> {
        profiles.iter().map(|p| self.encode(p)).collect()
    }

    fn compute_version(
        categories: &[(Attribute, CategoryVocabulary)],
        hobbies: &HobbyEncoding,
    ) -> SchemaVersion {
        let mut hasher = DefaultHasher::new();
        for (attribute, vocabulary) in categories {
            attribute.hash(&mut hasher);
            vocabulary.values().hash(&mut hasher);
        }
        match hobbies {
            HobbyEncoding::MultiHot(vocabulary) => {
                0u8.hash(&mut hasher);
                vocabulary.values().hash(&mut hasher);
            }
            HobbyEncoding::Embedding(table) => {
                1u8.hash(&mut hasher);
                table.dim().hash(&mut hasher);
                table.fingerprint().hash(&mut hasher);
            }
        }
        SchemaVersion(hasher.finish())
    }
}

/// Fits encoding schemas over a population
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    mode: HobbyMode,
    embeddings: Option<Arc<HobbyEmbeddings>>,
}

impl FeatureEncoder {
    /// Create an encoder. Embedding mode requires an embedding table.
    pub fn new(mode: HobbyMode, embeddings: Option<Arc<HobbyEmbeddings>>) -> Result<Self> {
        if mode == HobbyMode::Embedding && embeddings.is_none() {
            return Err(Error::InvalidConfig(
                "embedding hobby mode requires an embedding table".to_string(),
            ));
        }
        Ok(Self { mode, embeddings })
    }

    pub fn multi_hot() -> Self {
        Self {
            mode: HobbyMode::MultiHot,
            embeddings: None,
        }
    }

    pub fn with_embeddings(table: Arc<HobbyEmbeddings>) -> Self {
        Self {
            mode: HobbyMode::Embedding,
            embeddings: Some(table),
        }
    }

    pub fn mode(&self) -> HobbyMode {
        self.mode
    }

    /// Scan the population once and freeze a schema
    pub fn fit(&self, profiles: &[UserProfile]) -> Result<EncodingSchema> {
        if profiles.is_empty() {
            return Err(Error::Schema(
                "cannot fit an encoding schema on an empty profile list".to_string(),
            ));
        }

        let mut observed: Vec<BTreeSet<String>> = vec![BTreeSet::new(); Attribute::CATEGORICAL.len()];
        let mut hobby_tokens = BTreeSet::new();
        for profile in profiles {
            for (values, attribute) in observed.iter_mut().zip(Attribute::CATEGORICAL) {
                if let Some(value) = profile.categorical(attribute) {
                    values.insert(value.to_string());
                }
            }
            if self.mode == HobbyMode::MultiHot {
                hobby_tokens.extend(profile.hobbies.iter().cloned());
            }
        }

        let categories: Vec<(Attribute, CategoryVocabulary)> = Attribute::CATEGORICAL
            .into_iter()
            .zip(observed)
            .map(|(attribute, values)| (attribute, CategoryVocabulary::from_values(values)))
            .collect();

        let hobbies = match (&self.mode, &self.embeddings) {
            (HobbyMode::Embedding, Some(table)) => HobbyEncoding::Embedding(Arc::clone(table)),
            (HobbyMode::Embedding, None) => {
                return Err(Error::InvalidConfig(
                    "embedding hobby mode requires an embedding table".to_string(),
                ))
            }
            (HobbyMode::MultiHot, _) => {
                HobbyEncoding::MultiHot(CategoryVocabulary::from_values(hobby_tokens))
            }
        };

        let version = EncodingSchema::compute_version(&categories, &hobbies);
        let schema = EncodingSchema {
            version,
            categories,
            hobbies,
            population: profiles.len(),
        };

        tracing::debug!(
            %version,
            dim = schema.dim(),
            population = profiles.len(),
            mode = ?self.mode,
            "fit encoding schema"
        );
        Ok(schema)
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::multi_hot()
    }
}
