mod error;
mod extract;
mod forms;
mod media;
mod middleware;
mod services;
mod state;
mod util;

pub mod routes;
pub mod templates;

pub use error::ApiError;
pub use media::{MediaStore, MAX_IMAGE_BYTES};
pub use state::{AppState, PageCache};

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    let media = ServeDir::new(state.media().root());
    let media_path = state.media().mount_path();

    Router::new()
        .route("/health", get(routes::health::health_check))
        // Listings
        .route(
            "/",
            get(routes::posts::index)
                .layer(from_fn_with_state(state.clone(), middleware::cache_page)),
        )
        .route("/group/:slug/", get(routes::posts::group_posts))
        .route("/profile/:username/", get(routes::posts::profile))
        .route("/follow/", get(routes::follow::follow_index))
        .route(
            "/profile/:username/follow/",
            get(routes::follow::profile_follow),
        )
        .route(
            "/profile/:username/unfollow/",
            get(routes::follow::profile_unfollow),
        )
        // Posts
        .route("/posts/:post_id/", get(routes::posts::post_detail))
        .route(
            "/create/",
            get(routes::posts::post_create_form).post(routes::posts::post_create),
        )
        .route(
            "/posts/:post_id/edit/",
            get(routes::posts::post_edit_form).post(routes::posts::post_edit),
        )
        .route(
            "/posts/:post_id/comment/",
            get(routes::posts::add_comment).post(routes::posts::add_comment),
        )
        // Accounts
        .route(
            "/auth/signup/",
            get(routes::auth::signup_form).post(routes::auth::signup),
        )
        .route(
            "/auth/login/",
            get(routes::auth::login_form).post(routes::auth::login),
        )
        .route(
            "/auth/logout/",
            get(routes::auth::logout).post(routes::auth::logout),
        )
        .nest_service(&media_path, media)
        .fallback(routes::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES * 2))
        .layer(TraceLayer::new_for_http())
}
