//! User entity definitions

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// First and last name joined, or the username when both are blank.
    pub fn full_name(&self) -> String {
        full_name(&self.username, &self.first_name, &self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// The public face of a user as shown next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub full_name: String,
}

impl Author {
    pub fn new(id: i64, username: String, first_name: &str, last_name: &str) -> Self {
        let full_name = full_name(&username, first_name, last_name);
        Self {
            id,
            username,
            full_name,
        }
    }
}

fn full_name(username: &str, first_name: &str, last_name: &str) -> String {
    let joined = format!("{} {}", first_name.trim(), last_name.trim());
    let joined = joined.trim();
    if joined.is_empty() {
        username.to_string()
    } else {
        joined.to_string()
    }
}
