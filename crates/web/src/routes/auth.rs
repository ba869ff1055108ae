use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{debug, info};
use yatube_auth::{AuthError, NewAccount};

use super::View;
use crate::{
    extract::CurrentUser,
    forms::{LoginForm, SignupForm, NON_FIELD_ERRORS},
    templates::{
        users::{LoggedOut, Login, Signup},
        Page,
    },
    util::{safe_next, session_token},
    ApiError, AppState,
};

const BAD_LOGIN: &str = "Please enter a correct username and password.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginFields {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn session_cookie(name: &str, token: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub async fn login_form(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Query(query): Query<NextQuery>,
) -> Page {
    let template = Login {
        form: LoginForm::default(),
        next: query.next,
    };
    state.render(&template, viewer.as_ref())
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
    Form(fields): Form<LoginFields>,
) -> Result<(CookieJar, View), ApiError> {
    let next = fields.next.or(query.next);

    match state
        .authenticator()
        .login_with_password(&fields.username, &fields.password)
        .await
    {
        Ok(session) => {
            info!(user_id = session.user_id, "user logged in");
            let jar = jar.add(session_cookie(state.cookie_name(), session.token));
            let target = safe_next(next.as_deref()).to_string();
            Ok((jar, View::Redirect(target)))
        }
        Err(AuthError::InvalidCredentials) => {
            debug!(username = %fields.username, "rejected login");
            let mut form = LoginForm {
                username: fields.username,
                ..LoginForm::default()
            };
            form.errors.add(NON_FIELD_ERRORS, BAD_LOGIN);
            let page = state.render(&Login { form, next }, None);
            Ok((jar, page.into()))
        }
        Err(error) => Err(error.into()),
    }
}

pub async fn signup_form(State(state): State<AppState>, CurrentUser(viewer): CurrentUser) -> Page {
    state.render(
        &Signup {
            form: SignupForm::default(),
        },
        viewer.as_ref(),
    )
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(fields): Form<SignupFields>,
) -> Result<(CookieJar, View), ApiError> {
    let account = NewAccount {
        username: fields.username,
        password: fields.password,
        first_name: fields.first_name,
        last_name: fields.last_name,
        email: fields.email,
    };

    let mut form = SignupForm {
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        username: account.username.clone(),
        email: account.email.clone(),
        ..SignupForm::default()
    };

    match state.authenticator().register(&account).await {
        Ok(user) => {
            let session = state
                .authenticator()
                .login_with_password(&user.username, &account.password)
                .await?;
            let jar = jar.add(session_cookie(state.cookie_name(), session.token));
            Ok((jar, View::Redirect("/".to_string())))
        }
        Err(AuthError::UserExists) => {
            form.errors
                .add("username", "A user with that username already exists.");
            Ok((jar, state.render(&Signup { form }, None).into()))
        }
        Err(AuthError::InvalidUsername(message)) => {
            form.errors.add("username", message);
            Ok((jar, state.render(&Signup { form }, None).into()))
        }
        Err(AuthError::InvalidPassword(message)) => {
            form.errors.add("password", message);
            Ok((jar, state.render(&Signup { form }, None).into()))
        }
        Err(error) => Err(error.into()),
    }
}

/// Ends the session behind the request, if any, and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Page), ApiError> {
    if let Some(token) = session_token(&headers, state.cookie_name()) {
        state.authenticator().logout(&token).await?;
    }

    let removal = Cookie::build((state.cookie_name().to_string(), ""))
        .path("/")
        .build();
    let jar = jar.remove(removal);
    Ok((jar, state.render(&LoggedOut {}, None)))
}
