//! Domain entities for the blog

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{Comment, CreateCommentRequest};
pub use follow::Follow;
pub use group::{CreateGroupRequest, Group};
pub use post::{CreatePostRequest, Post, UpdatePostRequest};
pub use user::{Author, CreateUserRequest, User};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{DatabaseError, DatabaseResult};

/// Fixed-width UTC timestamp, so text ordering in SQLite matches time ordering.
pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> DatabaseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryError(format!("invalid timestamp {value}: {e}")))
}
