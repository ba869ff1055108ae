use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};
use yatube_config::{AuthConfig, MAX_SESSION_TTL_SECONDS};
use yatube_database::{CreateUserRequest, DatabaseError, User, UserRepository};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_USERNAME_LENGTH: usize = 150;

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    users: UserRepository,
    session_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user with that username already exists")]
    UserExists,
    #[error("please enter a correct username and password")]
    InvalidCredentials,
    #[error("{0}")]
    InvalidUsername(String),
    #[error("{0}")]
    InvalidPassword(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("repository error: {0}")]
    Repository(DatabaseError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session token")]
    InvalidSession,
}

impl From<DatabaseError> for AuthError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Duplicate(_) => AuthError::UserExists,
            other => AuthError::Repository(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Sign-up data for a new account.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        let ttl_seconds = config.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS);
        let session_ttl = Duration::seconds(ttl_seconds as i64);

        Self {
            users: UserRepository::new(pool.clone()),
            pool,
            session_ttl,
        }
    }

    pub async fn register(&self, account: &NewAccount) -> Result<User, AuthError> {
        let username = account.username.trim();
        validate_username(username)?;
        validate_password(&account.password)?;

        let password_hash = self.hash_password(&account.password)?;
        let user = self
            .users
            .create(&CreateUserRequest {
                username: username.to_string(),
                password_hash,
                first_name: account.first_name.trim().to_string(),
                last_name: account.last_name.trim().to_string(),
                email: account.email.trim().to_string(),
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "registered account");
        Ok(user)
    }

    pub async fn login_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let Some((user_id, secret)) = self.users.find_credentials(username.trim()).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = PasswordHash::new(&secret).map_err(|_| AuthError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &stored_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        self.issue_session(user_id).await
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::SessionNotFound);
        };

        let user_id: i64 = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|_| AuthError::InvalidSession)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            debug!(user_id, "expired session discarded");
            return Err(AuthError::SessionExpired);
        }

        let user = self.user_profile(user_id).await?;
        let session = AuthSession {
            token: token.to_owned(),
            user_id,
            expires_at,
        };

        Ok((user, session))
    }

    /// Drop the session behind a token. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!("session closed");
        }
        Ok(())
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidSession)
    }

    async fn issue_session(&self, user_id: i64) -> Result<AuthSession, AuthError> {
        let token = self.generate_session_token();
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(now.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(expires_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        info!(user_id, "issued session");

        Ok(AuthSession {
            token,
            user_id,
            expires_at,
        })
    }

    fn hash_password(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn generate_session_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// Letters, digits and `@.+-_`, at most 150 characters.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::InvalidUsername(
            "username is required".to_string(),
        ));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidUsername(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !USERNAME_PATTERN.is_match(username) {
        return Err(AuthError::InvalidUsername(
            "username may contain only letters, digits and @/./+/-/_".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_follow_the_account_pattern() {
        assert!(validate_username("newname").is_ok());
        assert!(validate_username("Лев_Толстой").is_ok());
        assert!(validate_username("mail@host.org").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("with space").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }
}
