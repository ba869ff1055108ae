use axum::extract::{Path, Query, State};

use super::{PageQuery, View};
use crate::{
    extract::RequireUser,
    services::follow as follow_service,
    templates::{posts::FollowFeed, Page},
    util::profile_url,
    ApiError, AppState,
};

pub async fn follow_index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<PageQuery>,
) -> Result<Page, ApiError> {
    let page_obj = follow_service::feed(&state, &user, query.page.as_deref()).await?;
    Ok(state.render(&FollowFeed { page_obj }, Some(&user)))
}

pub async fn profile_follow(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(username): Path<String>,
) -> Result<View, ApiError> {
    let author = follow_service::follow(&state, &user, &username).await?;
    Ok(View::Redirect(profile_url(&author.username)))
}

pub async fn profile_unfollow(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(username): Path<String>,
) -> Result<View, ApiError> {
    let author = follow_service::unfollow(&state, &user, &username).await?;
    Ok(View::Redirect(profile_url(&author.username)))
}
