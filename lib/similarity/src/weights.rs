//! Preference weights
//!
//! When a target user flags an attribute as personally important, that
//! attribute's sub-score is multiplied by its weight. Weights apply from the
//! target's side only, which makes scoring asymmetric.

use cohort_core::{Attribute, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multiplier applied to a preferred attribute unless overridden
pub const DEFAULT_PREFERENCE_WEIGHT: f32 = 1.5;

fn default_weight() -> f32 {
    DEFAULT_PREFERENCE_WEIGHT
}

/// Attribute → weight lookup, validated on construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeights {
    /// Weight for every preferred attribute without an override
    #[serde(default = "default_weight")]
    default: f32,

    /// Per-attribute weights replacing the default
    #[serde(default)]
    overrides: BTreeMap<Attribute, f32>,
}

impl PreferenceWeights {
    /// Same weight for every attribute
    pub fn uniform(weight: f32) -> Result<Self> {
        let weights = Self {
            default: weight,
            overrides: BTreeMap::new(),
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Replace the weight of a single attribute
    pub fn with_override(mut self, attribute: Attribute, weight: f32) -> Result<Self> {
        self.overrides.insert(attribute, weight);
        self.validate()?;
        Ok(self)
    }

    /// Check that every weight is finite and positive
    pub fn validate(&self) -> Result<()> {
        check_weight("default", self.default)?;
        for (attribute, weight) in &self.overrides {
            check_weight(attribute.as_str(), *weight)?;
        }
        Ok(())
    }

    /// Multiplier applied when `attribute` is preferred
    #[inline]
    pub fn weight(&self, attribute: Attribute) -> f32 {
        self.overrides
            .get(&attribute)
            .copied()
            .unwrap_or(self.default)
    }
}

fn check_weight(name: &str, weight: f32) -> Result<()> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "preference weight for '{}' must be finite and positive, got {}",
            name, weight
        )));
    }
    Ok(())
}

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self {
            default: DEFAULT_PREFERENCE_WEIGHT,
            overrides: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = PreferenceWeights::default();
        for attribute in Attribute::ALL {
            assert_eq!(weights.weight(attribute), 1.5);
        }
    }

    #[test]
    fn test_override() {
        let weights = PreferenceWeights::default()
            .with_override(Attribute::Hobbies, 2.0)
            .unwrap();
        assert_eq!(weights.weight(Attribute::Hobbies), 2.0);
        assert_eq!(weights.weight(Attribute::Role), 1.5);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        assert!(matches!(
            PreferenceWeights::uniform(0.0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(PreferenceWeights::uniform(f32::NAN).is_err());
        assert!(PreferenceWeights::default()
            .with_override(Attribute::Field, -1.0)
            .is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let weights: PreferenceWeights =
            serde_json::from_str(r#"{"overrides": {"mbti": 3.0}}"#).unwrap();
        weights.validate().unwrap();
        assert_eq!(weights.weight(Attribute::PersonalityType), 3.0);
        assert_eq!(weights.weight(Attribute::Hometown), 1.5);
    }
}
