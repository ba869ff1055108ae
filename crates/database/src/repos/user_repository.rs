//! User repository for database operations.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::{format_timestamp, parse_timestamp, CreateUserRequest, User};
use crate::types::{DatabaseError, DatabaseResult};

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, created_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Returns the user id and stored password hash for a username.
    pub async fn find_credentials(&self, username: &str) -> DatabaseResult<Option<(i64, String)>> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some((row.try_get("id")?, row.try_get("password_hash")?))),
            None => Ok(None),
        }
    }

    pub async fn create(&self, request: &CreateUserRequest) -> DatabaseResult<User> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, first_name, last_name, email, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.username)
        .bind(&request.password_hash)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::Duplicate(_) => {
                DatabaseError::Duplicate(format!("username {} is taken", request.username))
            }
            other => other,
        })?;

        let id = result.last_insert_rowid();
        info!(user_id = id, username = %request.username, "created user");

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {id}")))
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn user_from_row(row: &SqliteRow) -> DatabaseResult<User> {
    let created_at: String = row.try_get("created_at")?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        created_at: parse_timestamp(&created_at)?,
    })
}
