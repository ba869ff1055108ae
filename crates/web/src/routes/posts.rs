use axum::{
    extract::{Path, Query, State},
    Form,
};
use serde::Deserialize;
use yatube_database::PostFilter;

use super::{parse_id, PageQuery, View};
use crate::{
    extract::{CurrentUser, PostSubmission, RequireUser},
    forms::{CommentForm, PostForm},
    services::posts::{self as post_service, EditAccess},
    templates::{posts as pages, Page},
    util::{post_url, profile_url},
    ApiError, AppState,
};

pub async fn index(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Page, ApiError> {
    let page_obj = post_service::listing(&state, PostFilter::All, query.page.as_deref()).await?;
    Ok(state.render(&pages::Index { page_obj }, viewer.as_ref()))
}

pub async fn group_posts(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Page, ApiError> {
    let (group, page_obj) =
        post_service::group_listing(&state, &slug, query.page.as_deref()).await?;
    Ok(state.render(&pages::GroupList { group, page_obj }, viewer.as_ref()))
}

pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Page, ApiError> {
    let data =
        post_service::profile(&state, &username, viewer.as_ref(), query.page.as_deref()).await?;

    let template = pages::Profile {
        author: data.author,
        count_posts: data.count_posts,
        following: data.following,
        page_obj: data.page_obj,
    };
    Ok(state.render(&template, viewer.as_ref()))
}

pub async fn post_detail(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Page, ApiError> {
    let post_id = parse_id(&post_id)?;
    let data = post_service::post_detail(&state, post_id).await?;

    let can_edit = viewer.as_ref().map(|user| user.id) == Some(data.post.author.id);
    let template = pages::PostDetail {
        post: data.post,
        count_posts: data.count_posts,
        comments: data.comments,
        form: CommentForm::default(),
        can_edit,
    };
    Ok(state.render(&template, viewer.as_ref()))
}

pub async fn post_create_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Page, ApiError> {
    let groups = state.groups().list().await?;
    let template = pages::CreatePost {
        form: PostForm::blank(groups),
        is_edit: false,
        post_id: None,
    };
    Ok(state.render(&template, Some(&user)))
}

pub async fn post_create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    submission: PostSubmission,
) -> Result<View, ApiError> {
    let groups = state.groups().list().await?;
    let form = PostForm::bind(submission.text, submission.group, submission.image, groups)
        .oversized(submission.oversized);

    match form.clean(state.media()) {
        Ok(clean) => {
            post_service::create_post(&state, &user, clean).await?;
            Ok(View::Redirect(profile_url(&user.username)))
        }
        Err(form) => {
            let template = pages::CreatePost {
                form,
                is_edit: false,
                post_id: None,
            };
            Ok(state.render(&template, Some(&user)).into())
        }
    }
}

pub async fn post_edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> Result<View, ApiError> {
    let post_id = parse_id(&post_id)?;
    let post = match post_service::edit_access(&state, post_id, &user).await? {
        EditAccess::Author(post) => post,
        EditAccess::NotAuthor(post) => return Ok(View::Redirect(post_url(post.id))),
    };

    let groups = state.groups().list().await?;
    let template = pages::CreatePost {
        form: PostForm::for_post(&post, groups),
        is_edit: true,
        post_id: Some(post.id),
    };
    Ok(state.render(&template, Some(&user)).into())
}

pub async fn post_edit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    submission: PostSubmission,
) -> Result<View, ApiError> {
    let post_id = parse_id(&post_id)?;
    let post = match post_service::edit_access(&state, post_id, &user).await? {
        EditAccess::Author(post) => post,
        EditAccess::NotAuthor(post) => return Ok(View::Redirect(post_url(post.id))),
    };

    let groups = state.groups().list().await?;
    let mut form = PostForm::bind(submission.text, submission.group, submission.image, groups)
        .oversized(submission.oversized);
    form.current_image = post.image.clone();

    match form.clean(state.media()) {
        Ok(clean) => {
            post_service::update_post(&state, &post, clean).await?;
            Ok(View::Redirect(post_url(post.id)))
        }
        Err(form) => {
            let template = pages::CreatePost {
                form,
                is_edit: true,
                post_id: Some(post.id),
            };
            Ok(state.render(&template, Some(&user)).into())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentFields {
    #[serde(default)]
    pub text: String,
}

/// Always answers with a redirect to the post, whether or not the comment was stored.
pub async fn add_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    fields: Option<Form<CommentFields>>,
) -> Result<View, ApiError> {
    let post_id = parse_id(&post_id)?;
    let text = fields
        .map(|Form(fields)| fields.text)
        .unwrap_or_default();

    post_service::add_comment(&state, post_id, &user, CommentForm::bind(text)).await?;
    Ok(View::Redirect(post_url(post_id)))
}
