//! Demo accounts and posts loaded into a seeded mock backend.
//!
//! Users 1, 2 and 3 are all connected to each other; user 4 has no
//! connections. Every seed account logs in with [`SEED_PASSWORD`].

use crate::domain_model::*;
use chrono::{DateTime, TimeZone, Utc};

pub const SEED_PASSWORD: &str = "password123";

pub(crate) struct SeedUser {
    pub user: User,
    pub connections: &'static [&'static str],
}

pub(crate) struct SeedPost {
    pub id: &'static str,
    pub author: &'static str,
    pub content: &'static str,
    pub image: Option<&'static str>,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub likes: &'static [&'static str],
    pub comments: Vec<Comment>,
}

fn at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn user(id: &str, name: &str, email: &str, mobile: &str) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        email: email.to_string(),
        mobile: mobile.to_string(),
        created_at: Some(at(3, 1, 9, 0)),
    }
}

fn comment(id: &str, author: &str, content: &str, created_at: DateTime<Utc>) -> Comment {
    Comment {
        id: CommentId(id.to_string()),
        author: Some(UserId::new(author)),
        content: content.to_string(),
        created_at: Some(created_at),
    }
}

pub(crate) fn users() -> Vec<SeedUser> {
    vec![
        SeedUser {
            user: user("1", "John Doe", "john@example.com", "+1234567890"),
            connections: &["2", "3"],
        },
        SeedUser {
            user: user("2", "Jane Smith", "jane@example.com", "+1234567891"),
            connections: &["1", "3"],
        },
        SeedUser {
            user: user("3", "Alice Johnson", "alice@example.com", "+1234567892"),
            connections: &["1", "2"],
        },
        SeedUser {
            user: user("4", "Bob Wilson", "bob@example.com", "+1234567893"),
            connections: &[],
        },
    ]
}

pub(crate) fn posts() -> Vec<SeedPost> {
    vec![
        SeedPost {
            id: "1",
            author: "1",
            content: "Just finished a great coding session! #programming #javascript",
            image: Some("https://images.pexels.com/photos/546819/pexels-photo-546819.jpeg"),
            visibility: Visibility::Public,
            created_at: at(3, 15, 10, 30),
            likes: &["2", "3"],
            comments: vec![
                comment("1", "2", "Great work!", at(3, 15, 10, 35)),
                comment("2", "3", "What were you working on?", at(3, 15, 10, 40)),
            ],
        },
        SeedPost {
            id: "2",
            author: "2",
            content: "Beautiful sunset today!",
            image: Some("https://images.pexels.com/photos/1237119/pexels-photo-1237119.jpeg"),
            visibility: Visibility::Connections,
            created_at: at(3, 15, 9, 0),
            likes: &["1"],
            comments: Vec::new(),
        },
        SeedPost {
            id: "3",
            author: "3",
            content: "Just started learning React. Any tips?",
            image: None,
            visibility: Visibility::Public,
            created_at: at(3, 14, 15, 20),
            likes: &["1", "2", "4"],
            comments: vec![comment("3", "1", "Practice makes perfect!", at(3, 14, 15, 25))],
        },
    ]
}
