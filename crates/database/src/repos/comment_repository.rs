//! Comment repository for database operations.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::{format_timestamp, parse_timestamp, Author, Comment, CreateCommentRequest};
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateCommentRequest) -> DatabaseResult<Comment> {
        let now = Utc::now();

        let id = sqlx::query(
            "INSERT INTO comments (post_id, author_id, text, created) VALUES (?, ?, ?, ?)",
        )
        .bind(request.post_id)
        .bind(request.author_id)
        .bind(&request.text)
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(
            comment_id = id,
            post_id = request.post_id,
            author_id = request.author_id,
            "created comment"
        );

        let row = sqlx::query(
            "SELECT c.id, c.post_id, c.text, c.created,
                    u.id AS author_id, u.username AS author_username,
                    u.first_name AS author_first_name, u.last_name AS author_last_name
             FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("comment {id}")))?;

        comment_from_row(&row)
    }

    /// Comments on a post, oldest first.
    pub async fn list_for_post(&self, post_id: i64) -> DatabaseResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT c.id, c.post_id, c.text, c.created,
                    u.id AS author_id, u.username AS author_username,
                    u.first_name AS author_first_name, u.last_name AS author_last_name
             FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.post_id = ?
             ORDER BY c.created ASC, c.id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(comment_from_row).collect()
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn comment_from_row(row: &SqliteRow) -> DatabaseResult<Comment> {
    let created: String = row.try_get("created")?;
    let first_name: String = row.try_get("author_first_name")?;
    let last_name: String = row.try_get("author_last_name")?;

    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author: Author::new(
            row.try_get("author_id")?,
            row.try_get("author_username")?,
            &first_name,
            &last_name,
        ),
        text: row.try_get("text")?,
        created: parse_timestamp(&created)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CreatePostRequest;
    use crate::test_support::{seed_user, test_pool};
    use crate::PostRepository;

    #[tokio::test]
    async fn comments_are_listed_oldest_first() {
        let (pool, _dir) = test_pool().await;
        let author = seed_user(&pool, "author").await;
        let post = PostRepository::new(pool.clone())
            .create(&CreatePostRequest {
                author_id: author.id,
                text: "post".to_string(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        let repo = CommentRepository::new(pool);

        for text in ["first", "second"] {
            repo.create(&CreateCommentRequest {
                post_id: post.id,
                author_id: author.id,
                text: text.to_string(),
            })
            .await
            .unwrap();
        }

        let comments = repo.list_for_post(post.id).await.unwrap();
        assert_eq!(
            comments.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        assert_eq!(comments[0].author.username, "author");
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_rejected() {
        let (pool, _dir) = test_pool().await;
        let author = seed_user(&pool, "author").await;
        let repo = CommentRepository::new(pool);

        let result = repo
            .create(&CreateCommentRequest {
                post_id: 999,
                author_id: author.id,
                text: "orphan".to_string(),
            })
            .await;

        assert!(result.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
