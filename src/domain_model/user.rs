use crate::domain_model::ConnectionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque, stable user identifier.
///
/// Backends disagree on the wire type (the REST API emits integers, the mock
/// data uses strings), so both are accepted and normalized to a string.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("user id must not be empty".to_string());
        }
        Ok(UserId(trimmed.to_string()))
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Ok(UserId(s)),
            Raw::Number(n) => Ok(UserId(n.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Case-insensitive substring match over name, email and mobile.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self.mobile.contains(&term)
    }
}

/// A user as seen by the caller, including the relationship between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub connection_status: ConnectionStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterInput {
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub mobile: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_integer_and_string() {
        let from_int: UserId = serde_json::from_str("42").unwrap();
        let from_str: UserId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_int, from_str);
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "\"42\"");
    }

    #[test]
    fn profile_defaults_missing_status_to_none() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Jane Smith",
            "email": "jane@example.com",
            "mobile": "+1234567891",
            "is_active": true
        }))
        .unwrap();
        assert_eq!(profile.user.id, UserId::new("7"));
        assert_eq!(profile.connection_status, ConnectionStatus::None);
    }

    #[test]
    fn matches_is_case_insensitive() {
        let user = User {
            id: UserId::new("1"),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            mobile: "+1234567890".to_string(),
            created_at: None,
        };
        assert!(user.matches("JOHN"));
        assert!(user.matches("example.COM"));
        assert!(user.matches("4567"));
        assert!(!user.matches("alice"));
    }
}
