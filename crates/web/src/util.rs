use axum::http::{
    header::{AUTHORIZATION, LOCATION},
    HeaderMap, HeaderValue, StatusCode,
};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use url::form_urlencoded;

use crate::ApiError;

pub const LOGIN_URL: &str = "/auth/login/";

/// Session token from the session cookie, falling back to a bearer header.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    bearer_token(headers)
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    parts
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// A plain `302 Found`.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => ApiError::internal_server_error("invalid redirect target").into_response(),
    }
}

pub fn login_redirect(next: &str) -> Response {
    found(&format!("{LOGIN_URL}?next={}", encode(next)))
}

/// Only same-site paths are accepted as post-login targets.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path
        }
        _ => "/",
    }
}

pub fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", encode(username))
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

pub fn group_url(slug: &str) -> String {
    format!("/group/{}/", encode(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("sessionid=FROMCOOKIE"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer FROMHEADER"));

        assert_eq!(
            session_token(&headers, "sessionid").as_deref(),
            Some("FROMCOOKIE")
        );
    }

    #[test]
    fn bearer_token_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer TOKEN123"));

        assert_eq!(
            session_token(&headers, "sessionid").as_deref(),
            Some("TOKEN123")
        );
    }

    #[test]
    fn bearer_without_token_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));

        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn next_must_stay_on_site() {
        assert_eq!(safe_next(Some("/create/")), "/create/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn login_redirect_keeps_the_target() {
        let response = login_redirect("/posts/1/comment/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/auth/login/?next=%2Fposts%2F1%2Fcomment%2F"
        );
    }

    #[test]
    fn profile_urls_are_encoded() {
        assert_eq!(profile_url("leo"), "/profile/leo/");
        assert_eq!(profile_url("a+b@c"), "/profile/a%2Bb%40c/");
    }
}
