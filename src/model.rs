use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a family member as issued by the API server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MemberId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            "other" => Self::Other,
            _ => Self::Unspecified,
        }
    }
}

// The server sends "" for an unset choice; unknown values are not an error.
impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Gender::from_token).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parent_ids: Vec<MemberId>,
    #[serde(default)]
    pub spouse: Option<MemberId>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nickname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationship: String,
    #[serde(default)]
    pub is_alive: Option<bool>,
    #[serde(default)]
    pub tree: Option<u64>,
    #[serde(default)]
    pub added_by: Option<u64>,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            gender: Gender::Unspecified,
            birth_date: None,
            death_date: None,
            parent_ids: Vec::new(),
            spouse: None,
            photo: None,
            nickname: String::new(),
            notes: String::new(),
            location: String::new(),
            relationship: String::new(),
            is_alive: None,
            tree: None,
            added_by: None,
        }
    }

    pub fn with_parents(mut self, parents: &[u64]) -> Self {
        self.parent_ids = parents.iter().copied().map(MemberId).collect();
        self
    }

    pub fn with_spouse(mut self, spouse: u64) -> Self {
        self.spouse = Some(MemberId(spouse));
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// A member with no recorded parents starts a branch.
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// An explicit `is_alive = false` wins; otherwise a death date marks the member deceased.
    pub fn is_living(&self) -> bool {
        match self.is_alive {
            Some(false) => false,
            _ => self.death_date.is_none(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .into_iter()
            .chain(self.last_name.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Plain,
    Branches,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub created_by: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTree {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub member: Option<MemberId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A post in a tree's family feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyUpdate {
    pub id: u64,
    pub member: MemberId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub created_by: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFamilyUpdate {
    pub member: MemberId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_member_record() {
        let raw = r#"{
            "id": 7, "tree": 2, "first_name": "Ada", "last_name": "Lovelace",
            "gender": "", "birth_date": "1815-12-10", "death_date": null,
            "relationship": "", "notes": "", "photo": null, "nickname": "",
            "location": "London", "parent_ids": [3, 4], "spouse": null,
            "is_alive": true, "added_by": 1
        }"#;
        let member: Member = serde_json::from_str(raw).unwrap();
        assert_eq!(member.id, MemberId(7));
        assert_eq!(member.gender, Gender::Unspecified);
        assert_eq!(member.parent_ids, vec![MemberId(3), MemberId(4)]);
        assert_eq!(member.birth_date, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert!(member.is_living());
        assert!(!member.is_root());
    }

    #[test]
    fn missing_optional_fields_default() {
        let member: Member = serde_json::from_str(r#"{"id": 1, "parent_ids": null}"#).unwrap();
        assert!(member.is_root());
        assert_eq!(member.spouse, None);
        assert!(member.is_living());
        assert_eq!(member.initials(), "");
    }

    #[test]
    fn explicit_deceased_flag_overrides_missing_date() {
        let mut member = Member::new(1, "Jean", "Dupont");
        assert!(member.is_living());
        member.is_alive = Some(false);
        assert!(!member.is_living());
        member.is_alive = Some(true);
        member.death_date = NaiveDate::from_ymd_opt(1990, 1, 1);
        assert!(!member.is_living());
    }

    #[test]
    fn names_and_initials() {
        let member = Member::new(1, "élodie", "martin");
        assert_eq!(member.display_name(), "élodie martin");
        assert_eq!(member.initials(), "ÉM");
    }

    #[test]
    fn gender_tokens() {
        assert_eq!(Gender::from_token("Female"), Gender::Female);
        assert_eq!(Gender::from_token("unknown"), Gender::Unspecified);
        let gender: Gender = serde_json::from_str("null").unwrap();
        assert_eq!(gender, Gender::Unspecified);
    }
}
