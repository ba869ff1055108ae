//! Post entity definitions

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Author, Group};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: Author,
    pub group: Option<Group>,
    /// Path of the uploaded image relative to the media root, e.g. `posts/small.gif`.
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostRequest {
    pub text: String,
    pub group_id: Option<i64>,
    /// `None` keeps the current image.
    pub image: Option<String>,
}
