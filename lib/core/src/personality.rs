//! Personality types and the best-match lookup table.
//!
//! The table is directional: `A` listing `B` says nothing about `B` listing
//! `A`. It is validated for referential completeness when loaded, so every
//! type has an entry and every listed type is a known type.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One of the 16 four-letter personality classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PersonalityType {
    Intj,
    Intp,
    Entj,
    Entp,
    Infj,
    Infp,
    Enfj,
    Enfp,
    Istj,
    Isfj,
    Estj,
    Esfj,
    Istp,
    Isfp,
    Estp,
    Esfp,
}

impl PersonalityType {
    pub const ALL: [PersonalityType; 16] = [
        PersonalityType::Intj,
        PersonalityType::Intp,
        PersonalityType::Entj,
        PersonalityType::Entp,
        PersonalityType::Infj,
        PersonalityType::Infp,
        PersonalityType::Enfj,
        PersonalityType::Enfp,
        PersonalityType::Istj,
        PersonalityType::Isfj,
        PersonalityType::Estj,
        PersonalityType::Esfj,
        PersonalityType::Istp,
        PersonalityType::Isfp,
        PersonalityType::Estp,
        PersonalityType::Esfp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityType::Intj => "INTJ",
            PersonalityType::Intp => "INTP",
            PersonalityType::Entj => "ENTJ",
            PersonalityType::Entp => "ENTP",
            PersonalityType::Infj => "INFJ",
            PersonalityType::Infp => "INFP",
            PersonalityType::Enfj => "ENFJ",
            PersonalityType::Enfp => "ENFP",
            PersonalityType::Istj => "ISTJ",
            PersonalityType::Isfj => "ISFJ",
            PersonalityType::Estj => "ESTJ",
            PersonalityType::Esfj => "ESFJ",
            PersonalityType::Istp => "ISTP",
            PersonalityType::Isfp => "ISFP",
            PersonalityType::Estp => "ESTP",
            PersonalityType::Esfp => "ESFP",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonalityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        PersonalityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown personality type '{}'", s)))
    }
}

/// Static lookup: personality type → its best-match types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalityTable {
    best_matches: Vec<Vec<PersonalityType>>,
}

impl PersonalityTable {
    /// Build a table from typed entries, requiring an entry for every type.
    pub fn from_entries(entries: BTreeMap<PersonalityType, Vec<PersonalityType>>) -> Result<Self> {
        Self::build(entries)
    }

    /// Sort and dedup every match list, rejecting tables that miss a type.
    fn build(entries: BTreeMap<PersonalityType, Vec<PersonalityType>>) -> Result<Self> {
        let missing: Vec<&str> = PersonalityType::ALL
            .iter()
            .filter(|t| !entries.contains_key(t))
            .map(|t| t.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "personality table has no entry for {}",
                missing.join(", ")
            )));
        }

        let mut best_matches = vec![Vec::new(); PersonalityType::ALL.len()];
        for (personality, mut matches) in entries {
            matches.sort();
            matches.dedup();
            best_matches[personality.index()] = matches;
        }

        Ok(Self { best_matches })
    }

    /// Entries of the built-in compatibility chart
    fn builtin_entries() -> BTreeMap<PersonalityType, Vec<PersonalityType>> {
        use PersonalityType::*;

        [
            (Intj, vec![Enfp, Entp, Esfj]),
            (Intp, vec![Entj, Estj]),
            (Entj, vec![Infp, Intp]),
            (Entp, vec![Infj, Intj]),
            (Infj, vec![Enfp, Entp]),
            (Infp, vec![Enfj, Entj]),
            (Enfj, vec![Infp, Isfp]),
            (Enfp, vec![Infj, Intj]),
            (Istj, vec![Esfp, Estp]),
            (Isfj, vec![Esfp, Estp]),
            (Estj, vec![Intp, Isfp, Istp]),
            (Esfj, vec![Isfp, Istp]),
            (Istp, vec![Esfj, Estj]),
            (Isfp, vec![Enfj, Esfj, Estj]),
            (Estp, vec![Isfj, Istj]),
            (Esfp, vec![Isfj, Istj]),
        ]
        .into_iter()
        .collect()
    }

    /// Parse a JSON object of the form `{"INTJ": ["ENFP", ...], ...}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;

        let mut entries = BTreeMap::new();
        for (key, values) in raw {
            let personality: PersonalityType = key.parse()?;
            let matches = values
                .iter()
                .map(|v| v.parse::<PersonalityType>())
                .collect::<Result<Vec<_>>>()?;
            if entries.insert(personality, matches).is_some() {
                return Err(Error::InvalidConfig(format!(
                    "duplicate personality table entry for {}",
                    personality
                )));
            }
        }

        Self::from_entries(entries)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn best_matches(&self, personality: PersonalityType) -> &[PersonalityType] {
        &self.best_matches[personality.index()]
    }

    /// Whether `candidate` is listed as a best match for `target`
    pub fn is_best_match(&self, target: PersonalityType, candidate: PersonalityType) -> bool {
        self.best_matches(target).contains(&candidate)
    }
}

impl Default for PersonalityTable {
    /// The built-in compatibility chart
    fn default() -> Self {
        Self::build(Self::builtin_entries()).expect("built-in personality table covers every type")
    }
}
