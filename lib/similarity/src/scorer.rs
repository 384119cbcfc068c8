//! Compatibility scoring between two profiles
//!
//! Computes one bounded sub-score per attribute, multiplies the sub-scores of
//! the attributes the *target* prefers by their weight, and sums them into an
//! aggregate rounded to two decimals. Scoring is a pure function of the two
//! profiles and the scorer's immutable tables.

use crate::distance::{
    categorical_similarity, containment_ratio, embedding_similarity, personality_similarity,
    DEFAULT_EMBEDDING_NORMALIZATION,
};
use crate::weights::PreferenceWeights;
use cohort_core::{Attribute, HobbyEmbeddings, HobbyMode, PersonalityTable, UserProfile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Round to two decimal places
#[inline]
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Score of a single attribute for one (target, candidate) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttributeScore {
    /// Unweighted similarity in [0.0, 1.0]
    pub raw: f32,
    /// Multiplier applied (1.0 unless the target prefers this attribute)
    pub weight: f32,
    /// `raw * weight`, the amount added to the aggregate
    pub contribution: f32,
}

/// Per-pair result: per-attribute breakdown plus the rounded aggregate.
///
/// Not symmetric: `score(a, b)` and `score(b, a)` may differ.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityScore {
    pub attributes: BTreeMap<Attribute, AttributeScore>,
    pub aggregate: f32,
}

impl CompatibilityScore {
    /// Unweighted sub-score of an attribute
    pub fn raw(&self, attribute: Attribute) -> f32 {
        self.attributes.get(&attribute).map_or(0.0, |s| s.raw)
    }

    /// Weighted contribution of an attribute to the aggregate
    pub fn contribution(&self, attribute: Attribute) -> f32 {
        self.attributes.get(&attribute).map_or(0.0, |s| s.contribution)
    }

    /// Attribute with the largest non-zero contribution; earliest attribute wins ties
    pub fn top_contributor(&self) -> Option<Attribute> {
        let mut best: Option<(Attribute, f32)> = None;
        for (attribute, score) in &self.attributes {
            if score.contribution <= 0.0 {
                continue;
            }
            match best {
                Some((_, c)) if c >= score.contribution => {}
                _ => best = Some((*attribute, score.contribution)),
            }
        }
        best.map(|(a, _)| a)
    }
}

/// Hobby similarity policy, chosen once to match the encoder's hobby mode
#[derive(Debug, Clone)]
pub enum HobbySimilarity {
    /// `|T ∩ C| / |T|`
    Containment,
    /// Summed pairwise embedding cosine similarity over a normalization constant
    Embedding {
        table: Arc<HobbyEmbeddings>,
        normalization: f32,
    },
}

impl HobbySimilarity {
    pub fn embedding(table: Arc<HobbyEmbeddings>) -> Self {
        HobbySimilarity::Embedding {
            table,
            normalization: DEFAULT_EMBEDDING_NORMALIZATION,
        }
    }

    pub fn mode(&self) -> HobbyMode {
        match self {
            HobbySimilarity::Containment => HobbyMode::MultiHot,
            HobbySimilarity::Embedding { .. } => HobbyMode::Embedding,
        }
    }
}

/// Computes [`CompatibilityScore`]s
#[derive(Debug, Clone)]
pub struct Scorer {
    personality: Arc<PersonalityTable>,
    weights: PreferenceWeights,
    hobbies: HobbySimilarity,
}

impl Scorer {
    pub fn new(
        personality: Arc<PersonalityTable>,
        weights: PreferenceWeights,
        hobbies: HobbySimilarity,
    ) -> Self {
        Self {
            personality,
            weights,
            hobbies,
        }
    }

    pub fn with_weights(mut self, weights: PreferenceWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_personality_table(mut self, personality: Arc<PersonalityTable>) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_hobby_similarity(mut self, hobbies: HobbySimilarity) -> Self {
        self.hobbies = hobbies;
        self
    }

    pub fn weights(&self) -> &PreferenceWeights {
        &self.weights
    }

    pub fn hobby_similarity(&self) -> &HobbySimilarity {
        &self.hobbies
    }

    /// Unweighted similarity of one attribute, in [0.0, 1.0]
    pub fn attribute_similarity(
        &self,
        attribute: Attribute,
        target: &UserProfile,
        candidate: &UserProfile,
    ) -> f32 {
        match attribute {
            Attribute::Hometown | Attribute::Field | Attribute::Role | Attribute::AlmaMater => {
                categorical_similarity(target.categorical(attribute), candidate.categorical(attribute))
            }
            Attribute::PersonalityType => personality_similarity(
                &self.personality,
                target.personality_type.as_deref(),
                candidate.personality_type.as_deref(),
            ),
            Attribute::Hobbies => match &self.hobbies {
                HobbySimilarity::Containment => {
                    containment_ratio(&target.hobbies, &candidate.hobbies)
                }
                HobbySimilarity::Embedding {
                    table,
                    normalization,
                } => embedding_similarity(table, &target.hobbies, &candidate.hobbies, *normalization),
            },
        }
    }

    /// Score `candidate` from `target`'s point of view
    pub fn score(&self, target: &UserProfile, candidate: &UserProfile) -> CompatibilityScore {
        let mut attributes = BTreeMap::new();
        let mut total = 0.0f32;

        for attribute in Attribute::ALL {
            let raw = self.attribute_similarity(attribute, target, candidate);
            let weight = if target.prefers(attribute) {
                self.weights.weight(attribute)
            } else {
                1.0
            };
            let contribution = raw * weight;
            total += contribution;
            attributes.insert(
                attribute,
                AttributeScore {
                    raw,
                    weight,
                    contribution,
                },
            );
        }

        CompatibilityScore {
            attributes,
            aggregate: round2(total),
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(
            Arc::new(PersonalityTable::default()),
            PreferenceWeights::default(),
            HobbySimilarity::Containment,
        )
    }
}
