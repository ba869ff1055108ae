use tracing::debug;
use yatube_database::{DatabaseError, Page, Post, PostFilter, User};

use super::error::ServiceError;
use super::posts::listing;
use crate::AppState;

async fn find_author(state: &AppState, username: &str) -> Result<User, ServiceError> {
    state
        .users()
        .find_by_username(username)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("user {username}")))
}

/// Subscribe `user` to `username`. Following yourself or an author twice is a no-op.
pub async fn follow(state: &AppState, user: &User, username: &str) -> Result<User, ServiceError> {
    let author = find_author(state, username).await?;
    if author.id == user.id {
        debug!(user_id = user.id, "ignoring self-follow");
        return Ok(author);
    }

    let follows = state.follows();
    if follows.exists(user.id, author.id).await? {
        return Ok(author);
    }

    match follows.create(user.id, author.id).await {
        Ok(_) => Ok(author),
        // Lost a race with a concurrent request for the same pair.
        Err(DatabaseError::Duplicate(_)) => Ok(author),
        Err(error) => Err(error.into()),
    }
}

pub async fn unfollow(
    state: &AppState,
    user: &User,
    username: &str,
) -> Result<User, ServiceError> {
    let author = find_author(state, username).await?;
    if !state.follows().delete(user.id, author.id).await? {
        return Err(ServiceError::not_found(format!(
            "user {} does not follow {username}",
            user.username
        )));
    }
    Ok(author)
}

pub async fn feed(
    state: &AppState,
    user: &User,
    page: Option<&str>,
) -> Result<Page<Post>, ServiceError> {
    listing(state, PostFilter::FollowedBy(user.id), page).await
}
