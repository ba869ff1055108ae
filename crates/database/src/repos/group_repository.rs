//! Group repository for database operations.

use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::{CreateGroupRequest, Group};
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct GroupRepository {
    pool: SqlitePool,
}

impl GroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateGroupRequest) -> DatabaseResult<Group> {
        let slug = request.slug.trim();
        if request.title.trim().is_empty() || slug.is_empty() {
            return Err(DatabaseError::ValidationError(
                "group title and slug are required".to_string(),
            ));
        }

        let id = sqlx::query("INSERT INTO groups (title, slug, description) VALUES (?, ?, ?)")
            .bind(request.title.trim())
            .bind(slug)
            .bind(&request.description)
            .execute(&self.pool)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                DatabaseError::Duplicate(_) => {
                    DatabaseError::Duplicate(format!("group slug {slug} already exists"))
                }
                other => other,
            })?
            .last_insert_rowid();

        info!(group_id = id, slug = %slug, "created group");

        Ok(Group {
            id,
            title: request.title.trim().to_string(),
            slug: slug.to_string(),
            description: request.description.clone(),
        })
    }

    pub async fn find_by_slug(&self, slug: &str) -> DatabaseResult<Option<Group>> {
        let row = sqlx::query("SELECT id, title, slug, description FROM groups WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Group {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                slug: row.try_get("slug")?,
                description: row.try_get("description")?,
            })),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, id: i64) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM groups WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// All groups ordered by title, for the post form's group choice.
    pub async fn list(&self) -> DatabaseResult<Vec<Group>> {
        let rows = sqlx::query("SELECT id, title, slug, description FROM groups ORDER BY title ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Group {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    slug: row.try_get("slug")?,
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }
}
