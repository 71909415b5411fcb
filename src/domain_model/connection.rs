use crate::domain_model::{User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relationship between two users from one side's point of view.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    None,
    Pending,
    Accepted,
    Rejected,
}

impl<'de> Deserialize<'de> for ConnectionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // backends send `null` or omit the field when there is no edge
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") | Some("none") => Ok(ConnectionStatus::None),
            Some(other) => other
                .parse::<RequestStatus>()
                .map(ConnectionStatus::from)
                .map_err(serde::de::Error::custom),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::None => f.write_str("none"),
            ConnectionStatus::Pending => f.write_str("pending"),
            ConnectionStatus::Accepted => f.write_str("accepted"),
            ConnectionStatus::Rejected => f.write_str("rejected"),
        }
    }
}

/// The states a stored request edge can be in.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    #[default]
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown connection status: {other}")),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RequestStatus> for ConnectionStatus {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => ConnectionStatus::Pending,
            RequestStatus::Accepted => ConnectionStatus::Accepted,
            RequestStatus::Rejected => ConnectionStatus::Rejected,
        }
    }
}

/// A directed request edge, with both ends resolved to full profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub user_from: User,
    pub user_to: User,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Connection {
    /// The side of the edge that is not `me`.
    pub fn counterpart(&self, me: &UserId) -> &User {
        if &self.user_from.id == me {
            &self.user_to
        } else {
            &self.user_from
        }
    }
}

/// Unordered pair of users, normalized so that `(a, b)` and `(b, a)` are equal.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct UserPair(UserId, UserId);

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn first(&self) -> &UserId {
        &self.0
    }

    pub fn second(&self) -> &UserId {
        &self.1
    }

    pub fn contains(&self, user: &UserId) -> bool {
        &self.0 == user || &self.1 == user
    }

    pub fn other(&self, me: &UserId) -> &UserId {
        if &self.0 == me { &self.1 } else { &self.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_deserializes_null_as_none() {
        let status: ConnectionStatus = serde_json::from_str("null").unwrap();
        assert_eq!(status, ConnectionStatus::None);
        let status: ConnectionStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, ConnectionStatus::Rejected);
        assert!(serde_json::from_str::<ConnectionStatus>("\"blocked\"").is_err());
    }

    #[test]
    fn user_pair_is_order_independent() {
        let a = UserId::new("1");
        let b = UserId::new("2");
        assert_eq!(UserPair::new(a.clone(), b.clone()), UserPair::new(b.clone(), a.clone()));
        assert_eq!(UserPair::new(b.clone(), a.clone()).other(&a), &b);
    }

    #[test]
    fn user_pair_membership() {
        let pair = UserPair::new(UserId::new("4"), UserId::new("2"));
        assert_eq!(pair.first(), &UserId::new("2"));
        assert_eq!(pair.second(), &UserId::new("4"));
        assert!(pair.contains(&UserId::new("4")));
        assert!(!pair.contains(&UserId::new("1")));
    }
}
