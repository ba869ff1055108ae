use yatube_database::DatabaseError;

use crate::media::MediaError;
use crate::ApiError;

#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    Database(DatabaseError),
    Media(MediaError),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Database(db_err) => ApiError::from(db_err),
            ServiceError::Media(media_err) => {
                tracing::error!("media storage error: {}", media_err);
                ApiError::internal_server_error("Failed to store upload")
            }
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => Self::NotFound(msg),
            other => Self::Database(other),
        }
    }
}

impl From<MediaError> for ServiceError {
    fn from(err: MediaError) -> Self {
        Self::Media(err)
    }
}
