//! User profiles as supplied by the attribute store.
//!
//! A [`UserProfile`] is the only input the engine scores, encodes and
//! clusters. [`ProfileRecord`] mirrors the raw attribute-store row (comma
//! joined hobbies and preferences) and converts into a profile leniently.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A scored attribute of a profile.
///
/// The declaration order is the canonical order used by the encoder and by
/// every per-attribute map the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Hometown,
    Field,
    Role,
    #[serde(alias = "mbti")]
    PersonalityType,
    AlmaMater,
    Hobbies,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Hometown,
        Attribute::Field,
        Attribute::Role,
        Attribute::PersonalityType,
        Attribute::AlmaMater,
        Attribute::Hobbies,
    ];

    /// Single-valued attributes, one-hot encoded.
    pub const CATEGORICAL: [Attribute; 5] = [
        Attribute::Hometown,
        Attribute::Field,
        Attribute::Role,
        Attribute::PersonalityType,
        Attribute::AlmaMater,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Hometown => "hometown",
            Attribute::Field => "field",
            Attribute::Role => "role",
            Attribute::PersonalityType => "personality_type",
            Attribute::AlmaMater => "alma_mater",
            Attribute::Hobbies => "hobbies",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hometown" => Ok(Attribute::Hometown),
            "field" => Ok(Attribute::Field),
            "role" => Ok(Attribute::Role),
            "personality_type" | "mbti" => Ok(Attribute::PersonalityType),
            "alma_mater" => Ok(Attribute::AlmaMater),
            "hobbies" => Ok(Attribute::Hobbies),
            other => Err(Error::InvalidConfig(format!("unknown attribute '{}'", other))),
        }
    }
}

/// Identity key of a user
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A user's scoreable attributes.
///
/// Missing categorical values are `None`; they contribute nothing to a score
/// and encode to an all-zero block. Free-text fields are not part of the
/// profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub hometown: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub personality_type: Option<String>,
    #[serde(default)]
    pub alma_mater: Option<String>,
    #[serde(default)]
    pub hobbies: BTreeSet<String>,
    /// Attributes this user flagged as personally important
    #[serde(default)]
    pub preferences: BTreeSet<Attribute>,
}

impl UserProfile {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            hometown: None,
            field: None,
            role: None,
            personality_type: None,
            alma_mater: None,
            hobbies: BTreeSet::new(),
            preferences: BTreeSet::new(),
        }
    }

    pub fn with_hometown(mut self, value: impl Into<String>) -> Self {
        self.hometown = Some(value.into());
        self
    }

    pub fn with_field(mut self, value: impl Into<String>) -> Self {
        self.field = Some(value.into());
        self
    }

    pub fn with_role(mut self, value: impl Into<String>) -> Self {
        self.role = Some(value.into());
        self
    }

    pub fn with_personality_type(mut self, value: impl Into<String>) -> Self {
        self.personality_type = Some(value.into());
        self
    }

    pub fn with_alma_mater(mut self, value: impl Into<String>) -> Self {
        self.alma_mater = Some(value.into());
        self
    }

    pub fn with_hobbies<I, S>(mut self, hobbies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hobbies = hobbies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preferences<I>(mut self, preferences: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        self.preferences = preferences.into_iter().collect();
        self
    }

    /// Value of a single-valued attribute. Always `None` for [`Attribute::Hobbies`].
    pub fn categorical(&self, attribute: Attribute) -> Option<&str> {
        let value = match attribute {
            Attribute::Hometown => &self.hometown,
            Attribute::Field => &self.field,
            Attribute::Role => &self.role,
            Attribute::PersonalityType => &self.personality_type,
            Attribute::AlmaMater => &self.alma_mater,
            Attribute::Hobbies => return None,
        };
        value.as_deref()
    }

    pub fn prefers(&self, attribute: Attribute) -> bool {
        self.preferences.contains(&attribute)
    }
}

/// A raw attribute-store row.
///
/// `hobbies` and `preferences` arrive comma-joined; `mbti` is the store's
/// column name for the personality type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: String,
    #[serde(default)]
    pub hometown: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub mbti: Option<String>,
    #[serde(default)]
    pub alma_mater: Option<String>,
    #[serde(default)]
    pub hobbies: String,
    #[serde(default)]
    pub preferences: String,
    #[serde(default)]
    pub self_introductions: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(',').map(str::trim).filter(|s| !s.is_empty())
}

impl From<ProfileRecord> for UserProfile {
    fn from(record: ProfileRecord) -> Self {
        let hobbies = split_list(&record.hobbies).map(str::to_string).collect();

        let mut preferences = BTreeSet::new();
        for name in split_list(&record.preferences) {
            match name.parse::<Attribute>() {
                Ok(attribute) => {
                    preferences.insert(attribute);
                }
                Err(_) => {
                    tracing::warn!(
                        user_id = %record.user_id,
                        preference = name,
                        "dropping unknown preference"
                    );
                }
            }
        }

        Self {
            id: UserId::new(record.user_id),
            hometown: non_blank(record.hometown),
            field: non_blank(record.field),
            role: non_blank(record.role),
            personality_type: non_blank(record.mbti),
            alma_mater: non_blank(record.alma_mater),
            hobbies,
            preferences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_parse_and_alias() {
        assert_eq!("hometown".parse::<Attribute>().unwrap(), Attribute::Hometown);
        assert_eq!("MBTI".parse::<Attribute>().unwrap(), Attribute::PersonalityType);
        assert_eq!(
            " personality_type ".parse::<Attribute>().unwrap(),
            Attribute::PersonalityType
        );
        assert!(matches!(
            "salary".parse::<Attribute>(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_attribute_serde_alias() {
        let parsed: Attribute = serde_json::from_str("\"mbti\"").unwrap();
        assert_eq!(parsed, Attribute::PersonalityType);
        assert_eq!(
            serde_json::to_string(&Attribute::AlmaMater).unwrap(),
            "\"alma_mater\""
        );
    }

    #[test]
    fn test_categorical_accessor() {
        let profile = UserProfile::new("u1")
            .with_hometown("Osaka")
            .with_personality_type("INTJ")
            .with_hobbies(["reading"]);

        assert_eq!(profile.categorical(Attribute::Hometown), Some("Osaka"));
        assert_eq!(profile.categorical(Attribute::PersonalityType), Some("INTJ"));
        assert_eq!(profile.categorical(Attribute::Field), None);
        assert_eq!(profile.categorical(Attribute::Hobbies), None);
    }

    #[test]
    fn test_record_conversion() {
        let record = ProfileRecord {
            user_id: "u1".to_string(),
            hometown: Some(" Tokyo ".to_string()),
            field: Some(String::new()),
            role: Some("SE".to_string()),
            mbti: Some("ENFP".to_string()),
            alma_mater: None,
            hobbies: "reading, travel,  ,cooking".to_string(),
            preferences: "mbti, hobbies, salary".to_string(),
            self_introductions: Some("hello".to_string()),
        };

        let profile = UserProfile::from(record);
        assert_eq!(profile.id.as_str(), "u1");
        assert_eq!(profile.hometown.as_deref(), Some("Tokyo"));
        assert_eq!(profile.field, None);
        assert_eq!(profile.personality_type.as_deref(), Some("ENFP"));
        assert_eq!(profile.hobbies.len(), 3);
        assert!(profile.hobbies.contains("travel"));
        assert_eq!(profile.preferences.len(), 2);
        assert!(profile.prefers(Attribute::PersonalityType));
        assert!(profile.prefers(Attribute::Hobbies));
    }

    #[test]
    fn test_record_deserialize_with_missing_columns() {
        let record: ProfileRecord =
            serde_json::from_str(r#"{"user_id": "u9", "hobbies": "games"}"#).unwrap();
        let profile = UserProfile::from(record);
        assert!(profile.preferences.is_empty());
        assert_eq!(profile.hobbies.len(), 1);
    }
}
