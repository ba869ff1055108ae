//! Comment entity definitions

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Author;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author: Author,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}
