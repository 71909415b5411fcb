//! Response shapes that differ between backend versions.

use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A user embedded either as a full object or as a bare id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Full(User),
    Id(UserId),
}

impl UserRef {
    pub fn id(&self) -> &UserId {
        match self {
            UserRef::Full(user) => &user.id,
            UserRef::Id(id) => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireConnection {
    pub user_from: UserRef,
    pub user_to: UserRef,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `{count, connections}` as returned by the connection list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConnectionList {
    Wrapped { connections: Vec<WireConnection> },
    Bare(Vec<WireConnection>),
}

impl ConnectionList {
    pub fn into_vec(self) -> Vec<WireConnection> {
        match self {
            ConnectionList::Wrapped { connections } => connections,
            ConnectionList::Bare(connections) => connections,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PostList {
    Paged { posts: Vec<Post> },
    Bare(Vec<Post>),
}

impl PostList {
    pub fn into_vec(self) -> Vec<Post> {
        match self {
            PostList::Paged { posts } => posts,
            PostList::Bare(posts) => posts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserList {
    Bare(Vec<User>),
    Wrapped { users: Vec<User> },
}

impl UserList {
    pub fn into_vec(self) -> Vec<User> {
        match self {
            UserList::Bare(users) => users,
            UserList::Wrapped { users } => users,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProfileList {
    Bare(Vec<UserProfile>),
    Wrapped { users: Vec<UserProfile> },
}

impl ProfileList {
    pub fn into_vec(self) -> Vec<UserProfile> {
        match self {
            ProfileList::Bare(users) => users,
            ProfileList::Wrapped { users } => users,
        }
    }
}
