//! Follow entity definitions

use serde::Serialize;

/// A directed subscription: `user_id` follows `author_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}
