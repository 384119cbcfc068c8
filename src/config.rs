//! Engine configuration
//!
//! Loaded from a JSON file (or built in code from `Default`) and validated
//! once before the engine is constructed.

use cohort_cluster::ClusterConfig;
use cohort_core::{Attribute, Error, HobbyMode, Result};
use cohort_similarity::{
    PreferenceWeights, DEFAULT_EMBEDDING_NORMALIZATION, DEFAULT_PREFERENCE_WEIGHT, DEFAULT_TOP_K,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub hobby_mode: HobbyMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Multiplier for every attribute the target prefers
    pub preference_weight: f32,
    /// Per-attribute replacements for `preference_weight`
    pub attribute_weights: BTreeMap<Attribute, f32>,
    /// Divisor for summed hobby embedding similarity
    pub embedding_normalization: f32,
    pub top_k: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            preference_weight: DEFAULT_PREFERENCE_WEIGHT,
            attribute_weights: BTreeMap::new(),
            embedding_normalization: DEFAULT_EMBEDDING_NORMALIZATION,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ScoringConfig {
    pub fn preference_weights(&self) -> Result<PreferenceWeights> {
        let mut weights = PreferenceWeights::uniform(self.preference_weight)?;
        for (attribute, weight) in &self.attribute_weights {
            weights = weights.with_override(*attribute, *weight)?;
        }
        Ok(weights)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub encoder: EncoderConfig,
    pub scoring: ScoringConfig,
    pub cluster: ClusterConfig,
    /// Pretrained hobby vectors in word2vec text format
    pub embeddings_path: Option<PathBuf>,
    /// JSON map of personality type to best matches; built-in table if unset
    pub personality_table_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Read and validate a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.cluster.validate()?;
        self.scoring.preference_weights()?;

        let norm = self.scoring.embedding_normalization;
        if !norm.is_finite() || norm <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "embedding_normalization must be finite and positive, got {}",
                norm
            )));
        }
        if self.encoder.hobby_mode == HobbyMode::Embedding && self.embeddings_path.is_none() {
            return Err(Error::InvalidConfig(
                "hobby_mode = embedding requires embeddings_path".to_string(),
            ));
        }
        Ok(())
    }
}
