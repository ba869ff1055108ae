//! Yatube Database Crate
//!
//! Connection management, embedded migrations, and the repositories behind
//! posts, groups, comments and follows.

use sqlx::SqlitePool;
use yatube_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod pagination;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;
pub use pagination::{Page, PageWindow, Paginator};

pub use repos::{
    CommentRepository, FollowRepository, GroupRepository, PostFilter, PostRepository,
    UserRepository,
};

pub use entities::{
    Author, Comment, CreateCommentRequest, CreateGroupRequest, CreatePostRequest,
    CreateUserRequest, Follow, Group, Post, UpdatePostRequest, User,
};

pub use types::{DatabaseError, DatabaseResult};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[tokio::test]
    async fn initialization_runs_migrations() {
        let (pool, _dir) = test_pool().await;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_posts_and_follows() {
        let (pool, _dir) = test_pool().await;
        let author = seed_user(&pool, "author").await;
        let reader = seed_user(&pool, "reader").await;

        super::PostRepository::new(pool.clone())
            .create(&super::CreatePostRequest {
                author_id: author.id,
                text: "text".to_string(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        super::FollowRepository::new(pool.clone())
            .create(reader.id, author.id)
            .await
            .unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(author.id)
            .execute(&pool)
            .await
            .unwrap();

        let posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&pool)
            .await
            .unwrap();
        let follows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((posts, follows), (0, 0));
    }
}
