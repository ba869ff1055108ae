use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::state::PageCache;
use crate::util::session_token;
use crate::AppState;

/// Serve successful GET responses from the page cache while they are fresh.
pub async fn cache_page(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let cache = state.page_cache();
    if !cache.enabled() || request.method() != Method::GET {
        return next.run(request).await;
    }

    let viewer = session_token(request.headers(), state.cookie_name());
    let key = PageCache::key(request.uri(), viewer.as_deref());

    if let Some(body) = cache.get(&key).await {
        debug!(path = %request.uri(), "page cache hit");
        return Html(body).into_response();
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            cache.insert(key, bytes.clone()).await;
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(error) => {
            warn!(?error, "failed to buffer response for the page cache");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
