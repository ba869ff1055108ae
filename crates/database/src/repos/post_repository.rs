//! Post repository for database operations.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::{
    format_timestamp, parse_timestamp, Author, CreatePostRequest, Group, Post, UpdatePostRequest,
};
use crate::pagination::{Page, Paginator};
use crate::types::{DatabaseError, DatabaseResult};

const POST_SELECT: &str = "
    SELECT p.id, p.text, p.pub_date, p.image,
           u.id AS author_id, u.username AS author_username,
           u.first_name AS author_first_name, u.last_name AS author_last_name,
           g.id AS group_id, g.title AS group_title, g.slug AS group_slug,
           g.description AS group_description
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id";

const NEWEST_FIRST: &str = "ORDER BY p.pub_date DESC, p.id DESC";

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by every author the given user follows.
    FollowedBy(i64),
}

impl PostFilter {
    fn clause(&self) -> &'static str {
        match self {
            PostFilter::All => "",
            PostFilter::Group(_) => "WHERE p.group_id = ?",
            PostFilter::Author(_) => "WHERE p.author_id = ?",
            PostFilter::FollowedBy(_) => {
                "WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ?)"
            }
        }
    }

    fn param(&self) -> Option<i64> {
        match *self {
            PostFilter::All => None,
            PostFilter::Group(id) | PostFilter::Author(id) | PostFilter::FollowedBy(id) => Some(id),
        }
    }
}

#[derive(Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a post stamped with the current time.
    pub async fn create(&self, request: &CreatePostRequest) -> DatabaseResult<Post> {
        let now = Utc::now();

        let id = sqlx::query(
            "INSERT INTO posts (text, pub_date, author_id, group_id, image) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&request.text)
        .bind(format_timestamp(now))
        .bind(request.author_id)
        .bind(request.group_id)
        .bind(&request.image)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(
            post_id = id,
            author_id = request.author_id,
            group_id = ?request.group_id,
            "created post"
        );

        self.get(id).await
    }

    /// Rewrite text, group and optionally the image. Author and pub date stay as they are.
    pub async fn update(&self, id: i64, request: &UpdatePostRequest) -> DatabaseResult<Post> {
        let result = sqlx::query(
            "UPDATE posts SET text = ?, group_id = ?, image = COALESCE(?, image) WHERE id = ?",
        )
        .bind(&request.text)
        .bind(request.group_id)
        .bind(&request.image)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("post {id}")));
        }

        info!(post_id = id, group_id = ?request.group_id, "updated post");
        self.get(id).await
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Post>> {
        let row = sqlx::query(&format!("{POST_SELECT} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn get(&self, id: i64) -> DatabaseResult<Post> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("post {id}")))
    }

    pub async fn count(&self, filter: PostFilter) -> DatabaseResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM posts p {}", filter.clause());
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(param) = filter.param() {
            query = query.bind(param);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    /// Fetch one page of a listing, newest posts first.
    pub async fn page(
        &self,
        filter: PostFilter,
        paginator: &Paginator,
        requested: Option<&str>,
    ) -> DatabaseResult<Page<Post>> {
        let count = self.count(filter).await?;
        let window = paginator.window(count, requested);

        let sql = format!(
            "{POST_SELECT} {} {NEWEST_FIRST} LIMIT ? OFFSET ?",
            filter.clause()
        );
        let mut query = sqlx::query(&sql);
        if let Some(param) = filter.param() {
            query = query.bind(param);
        }
        let rows = query
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let posts = rows
            .iter()
            .map(post_from_row)
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok(Page::new(posts, window, count))
    }

    /// Every post, newest first. Used by the management CLI.
    pub async fn list_all(&self) -> DatabaseResult<Vec<Post>> {
        let rows = sqlx::query(&format!("{POST_SELECT} {NEWEST_FIRST}"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(post_from_row).collect()
    }
}

fn post_from_row(row: &SqliteRow) -> DatabaseResult<Post> {
    let pub_date: String = row.try_get("pub_date")?;
    let author_first_name: String = row.try_get("author_first_name")?;
    let author_last_name: String = row.try_get("author_last_name")?;

    let group_id: Option<i64> = row.try_get("group_id")?;
    let group = match group_id {
        Some(id) => Some(Group {
            id,
            title: row.try_get("group_title")?,
            slug: row.try_get("group_slug")?,
            description: row.try_get("group_description")?,
        }),
        None => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        pub_date: parse_timestamp(&pub_date)?,
        author: Author::new(
            row.try_get("author_id")?,
            row.try_get("author_username")?,
            &author_first_name,
            &author_last_name,
        ),
        group,
        image: row.try_get("image")?,
    })
}
