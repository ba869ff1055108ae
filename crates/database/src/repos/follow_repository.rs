//! Follow repository for database operations.

use sqlx::SqlitePool;
use tracing::info;

use crate::entities::Follow;
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct FollowRepository {
    pool: SqlitePool,
}

impl FollowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, user_id: i64, author_id: i64) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a follow. A second follow of the same author is rejected as a duplicate
    /// by the `posts_follow_name_unique` constraint.
    pub async fn create(&self, user_id: i64, author_id: i64) -> DatabaseResult<Follow> {
        let id = sqlx::query("INSERT INTO follows (user_id, author_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!(follow_id = id, user_id, author_id, "created follow");

        Ok(Follow {
            id,
            user_id,
            author_id,
        })
    }

    /// Remove a follow. Returns `false` when there was nothing to remove.
    pub async fn delete(&self, user_id: i64, author_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(user_id, author_id, "removed follow");
        }
        Ok(removed)
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM follows")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
