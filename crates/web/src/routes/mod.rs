pub mod auth;
pub mod follow;
pub mod health;
pub mod posts;

use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::templates::Page;
use crate::util::found;
use crate::ApiError;

/// Either a rendered page or a `302` to another location.
pub enum View {
    Page(Page),
    Redirect(String),
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        match self {
            View::Page(page) => page.into_response(),
            View::Redirect(location) => found(&location),
        }
    }
}

impl From<Page> for View {
    fn from(page: Page) -> Self {
        View::Page(page)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Numeric path ids; anything else is a missing page.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::not_found(format!("no such id: {raw}")))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("The requested page does not exist.")
}
