use tracing::debug;
use yatube_database::{
    Comment, CreateCommentRequest, CreatePostRequest, DatabaseResult, Group, Page, Post,
    PostFilter, UpdatePostRequest, User,
};

use super::error::ServiceError;
use crate::forms::{CleanPost, CommentForm};
use crate::AppState;

pub struct ProfileData {
    pub author: User,
    pub count_posts: i64,
    pub following: bool,
    pub page_obj: Page<Post>,
}

pub struct PostDetailData {
    pub post: Post,
    pub count_posts: i64,
    pub comments: Vec<Comment>,
}

/// Whether a user may change a post.
pub enum EditAccess {
    Author(Post),
    NotAuthor(Post),
}

pub async fn listing(
    state: &AppState,
    filter: PostFilter,
    page: Option<&str>,
) -> Result<Page<Post>, ServiceError> {
    let page = state.posts().page(filter, state.paginator(), page).await?;
    Ok(page)
}

pub async fn group_listing(
    state: &AppState,
    slug: &str,
    page: Option<&str>,
) -> Result<(Group, Page<Post>), ServiceError> {
    let group = state
        .groups()
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("group {slug}")))?;

    let page_obj = listing(state, PostFilter::Group(group.id), page).await?;
    Ok((group, page_obj))
}

pub async fn profile(
    state: &AppState,
    username: &str,
    viewer: Option<&User>,
    page: Option<&str>,
) -> Result<ProfileData, ServiceError> {
    let author = state
        .users()
        .find_by_username(username)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("user {username}")))?;

    let following = match viewer {
        Some(viewer) => state.follows().exists(viewer.id, author.id).await?,
        None => false,
    };
    let page_obj = listing(state, PostFilter::Author(author.id), page).await?;

    Ok(ProfileData {
        count_posts: page_obj.count,
        author,
        following,
        page_obj,
    })
}

pub async fn post_detail(state: &AppState, post_id: i64) -> Result<PostDetailData, ServiceError> {
    let post = find_post(state, post_id).await?;
    let count_posts = state
        .posts()
        .count(PostFilter::Author(post.author.id))
        .await?;
    let comments = state.comments().list_for_post(post.id).await?;

    Ok(PostDetailData {
        post,
        count_posts,
        comments,
    })
}

pub async fn find_post(state: &AppState, post_id: i64) -> Result<Post, ServiceError> {
    state
        .posts()
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("post {post_id}")))
}

pub async fn edit_access(
    state: &AppState,
    post_id: i64,
    user: &User,
) -> Result<EditAccess, ServiceError> {
    let post = find_post(state, post_id).await?;
    if post.author.id == user.id {
        Ok(EditAccess::Author(post))
    } else {
        debug!(post_id, user_id = user.id, "edit refused for non-author");
        Ok(EditAccess::NotAuthor(post))
    }
}

pub async fn create_post(
    state: &AppState,
    author: &User,
    clean: CleanPost,
) -> Result<Post, ServiceError> {
    let image = match &clean.image {
        Some(upload) => Some(state.media().save(upload).await?),
        None => None,
    };

    let created = state
        .posts()
        .create(&CreatePostRequest {
            author_id: author.id,
            text: clean.text,
            group_id: clean.group_id,
            image: image.clone(),
        })
        .await;

    discard_image_on_error(state, image.as_deref(), created).await
}

pub async fn update_post(
    state: &AppState,
    post: &Post,
    clean: CleanPost,
) -> Result<Post, ServiceError> {
    let image = match &clean.image {
        Some(upload) => Some(state.media().save(upload).await?),
        None => None,
    };

    let updated = state
        .posts()
        .update(
            post.id,
            &UpdatePostRequest {
                text: clean.text,
                group_id: clean.group_id,
                image: image.clone(),
            },
        )
        .await;

    discard_image_on_error(state, image.as_deref(), updated).await
}

/// The image is written before its row. A failed write must not leave the file behind.
async fn discard_image_on_error(
    state: &AppState,
    image: Option<&str>,
    result: DatabaseResult<Post>,
) -> Result<Post, ServiceError> {
    match result {
        Ok(post) => Ok(post),
        Err(error) => {
            if let Some(stored) = image {
                state.media().remove(stored).await;
            }
            Err(error.into())
        }
    }
}

/// Store a comment. Invalid forms are dropped without an error.
pub async fn add_comment(
    state: &AppState,
    post_id: i64,
    author: &User,
    form: CommentForm,
) -> Result<Option<Comment>, ServiceError> {
    let post = find_post(state, post_id).await?;

    let text = match form.clean() {
        Ok(text) => text,
        Err(form) => {
            debug!(post_id, user_id = author.id, errors = ?form.errors, "comment rejected");
            return Ok(None);
        }
    };

    let comment = state
        .comments()
        .create(&CreateCommentRequest {
            post_id: post.id,
            author_id: author.id,
            text,
        })
        .await?;

    Ok(Some(comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Utc;
    use tempfile::TempDir;
    use yatube_auth::Authenticator;
    use yatube_config::AppConfig;

    use crate::media::{tests::SMALL_GIF, Upload};

    async fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", dir.path().join("posts.db").display());
        config.blog.media_root = dir.path().join("media").to_string_lossy().into_owned();

        let pool = yatube_database::initialize_database(&config.database)
            .await
            .unwrap();
        let authenticator = Authenticator::new(pool.clone(), &config.auth);
        (AppState::new(pool, authenticator, &config), dir)
    }

    fn with_image(text: &str) -> CleanPost {
        CleanPost {
            text: text.to_string(),
            group_id: None,
            image: Some(Upload {
                file_name: "small.gif".to_string(),
                data: Bytes::from_static(SMALL_GIF),
            }),
        }
    }

    fn stored_images(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path().join("media/posts"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn failed_insert_removes_the_saved_image() {
        let (state, dir) = test_state().await;
        let ghost = User {
            id: 9999,
            username: "ghost".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            created_at: Utc::now(),
        };

        let result = create_post(&state, &ghost, with_image("orphan")).await;

        assert!(result.is_err());
        assert_eq!(stored_images(&dir), 0);
        let posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(state.db_pool())
            .await
            .unwrap();
        assert_eq!(posts, 0);
    }

    #[tokio::test]
    async fn successful_insert_keeps_the_image() {
        let (state, dir) = test_state().await;
        let user = state
            .authenticator()
            .register(&yatube_auth::NewAccount {
                username: "leo".to_string(),
                password: "leo-password-1".to_string(),
                ..yatube_auth::NewAccount::default()
            })
            .await
            .unwrap();

        let post = create_post(&state, &user, with_image("kept")).await.unwrap();

        assert_eq!(post.image.as_deref(), Some("posts/small.gif"));
        assert_eq!(stored_images(&dir), 1);
    }
}
