use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use yatube_auth::AuthError;
use yatube_database::DatabaseError;

use crate::templates::{self, errors::ErrorPage};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let page = templates::render(&ErrorPage::new(self.status, &self.message), None, "");
        (self.status, page).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(error = ?error, "internal error");
        Self::internal_server_error(error.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(message) => Self::not_found(message),
            DatabaseError::ValidationError(message) => Self::bad_request(message),
            other => {
                error!(error = ?other, "database error");
                Self::internal_server_error("database operation failed")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        error!(error = ?error, "auth error");
        let status = match error {
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession => StatusCode::FORBIDDEN,
            AuthError::UserExists
            | AuthError::InvalidUsername(_)
            | AuthError::InvalidPassword(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Repository(_) | AuthError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, error.to_string())
    }
}
