//! Request extractors for the viewer and post submissions.

use axum::{
    async_trait,
    extract::{multipart::Field, FromRequest, FromRequestParts, Multipart, Request},
    http::{header::CONTENT_TYPE, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use bytes::{Bytes, BytesMut};
use serde::Deserialize;
use tracing::debug;
use yatube_auth::AuthError;
use yatube_database::User;

use crate::media::{Upload, MAX_IMAGE_BYTES};
use crate::util::{login_redirect, session_token};
use crate::{ApiError, AppState};

/// The logged-in user, if any. Unknown or expired sessions count as anonymous.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers, state.cookie_name()) else {
            return Ok(Self(None));
        };

        match state.authenticator().authenticate_token(&token).await {
            Ok((user, _)) => Ok(Self(Some(user))),
            Err(AuthError::SessionNotFound | AuthError::SessionExpired | AuthError::InvalidSession) => {
                debug!("ignoring stale session");
                Ok(Self(None))
            }
            Err(error) => Err(ApiError::from(error)),
        }
    }
}

/// Like [`CurrentUser`] but sends anonymous visitors to the login page.
pub struct RequireUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match user {
            Some(user) => Ok(Self(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|value| value.as_str())
                    .unwrap_or("/");
                Err(login_redirect(next))
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PostFields {
    #[serde(default)]
    text: String,
    #[serde(default)]
    group: String,
}

/// Raw post form data, from either a urlencoded or a multipart body.
#[derive(Debug, Default)]
pub struct PostSubmission {
    pub text: String,
    pub group: String,
    pub image: Option<Upload>,
    /// The body hit the request size limit before every part was read.
    pub oversized: bool,
}

#[async_trait]
impl FromRequest<AppState> for PostSubmission {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(fields) = Form::<PostFields>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
            return Ok(Self {
                text: fields.text,
                group: fields.group,
                ..Self::default()
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|_| ApiError::bad_request("invalid multipart"))?;
        let mut submission = Self::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(error) if error.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                    debug!("request body limit reached between parts");
                    submission.oversized = true;
                    break;
                }
                Err(_) => return Err(ApiError::bad_request("invalid multipart")),
            };
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "text" => {
                    submission.text = field
                        .text()
                        .await
                        .map_err(|_| ApiError::bad_request("invalid text"))?;
                }
                "group" => {
                    submission.group = field
                        .text()
                        .await
                        .map_err(|_| ApiError::bad_request("invalid group"))?;
                }
                "image" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let Some(data) = read_image(field).await? else {
                        debug!("request body limit reached inside the image part");
                        submission.oversized = true;
                        break;
                    };
                    // An untouched file input arrives as an empty, unnamed part.
                    if !file_name.is_empty() || !data.is_empty() {
                        submission.image = Some(Upload { file_name, data });
                    }
                }
                _ => {}
            }
        }

        Ok(submission)
    }
}

/// Buffers an image part, keeping at most one byte past [`MAX_IMAGE_BYTES`] so
/// validation can still report the size. `None` means the request body limit
/// cut the part short and nothing after it can be read.
async fn read_image(mut field: Field<'_>) -> Result<Option<Bytes>, ApiError> {
    let cap = MAX_IMAGE_BYTES + 1;
    let mut data = BytesMut::new();

    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                let room = cap.saturating_sub(data.len());
                data.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }
            Ok(None) => return Ok(Some(data.freeze())),
            Err(error) if error.status() == StatusCode::PAYLOAD_TOO_LARGE => return Ok(None),
            Err(_) => return Err(ApiError::bad_request("invalid image")),
        }
    }
}
