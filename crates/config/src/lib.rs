use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "yatube.toml",
    "config/yatube.toml",
    "crates/config/yatube.toml",
    "../yatube.toml",
    "../config/yatube.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub blog: BlogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://yatube.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_cookie_name")]
    pub cookie_name: String,
}

impl AuthConfig {
    const fn default_session_ttl() -> u64 {
        1_209_600
    }

    fn default_cookie_name() -> String {
        "sessionid".to_string()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
            cookie_name: Self::default_cookie_name(),
        }
    }
}

/// Settings for the post listings and uploaded media.
///
/// ```
/// use yatube_config::BlogConfig;
///
/// let blog = BlogConfig::default();
/// assert_eq!(blog.page_size, 10);
/// assert_eq!(blog.index_cache_seconds, 20);
/// assert_eq!(blog.media_url, "/media/");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Number of posts per listing page.
    #[serde(default = "BlogConfig::default_page_size")]
    pub page_size: usize,
    /// How long a rendered index page is served from cache. Zero disables caching.
    #[serde(default = "BlogConfig::default_index_cache_seconds")]
    pub index_cache_seconds: u64,
    #[serde(default = "BlogConfig::default_media_root")]
    pub media_root: String,
    #[serde(default = "BlogConfig::default_media_url")]
    pub media_url: String,
}

impl BlogConfig {
    const fn default_page_size() -> usize {
        10
    }

    const fn default_index_cache_seconds() -> u64 {
        20
    }

    fn default_media_root() -> String {
        "media".to_string()
    }

    fn default_media_url() -> String {
        "/media/".to_string()
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
            index_cache_seconds: Self::default_index_cache_seconds(),
            media_root: Self::default_media_root(),
            media_url: Self::default_media_url(),
        }
    }
}

/// Upper bound for session lifetimes, roughly one hundred years.
pub const MAX_SESSION_TTL_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use yatube_config::load;
///
/// std::env::remove_var("YATUBE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(config.blog.page_size > 0);
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = i64::try_from(defaults.auth.session_ttl_seconds).unwrap_or(i64::MAX);
    let page_size = i64::try_from(defaults.blog.page_size).unwrap_or(i64::MAX);
    let cache_seconds = i64::try_from(defaults.blog.index_cache_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.session_ttl_seconds", session_ttl)?
        .set_default("auth.cookie_name", defaults.auth.cookie_name.clone())?
        .set_default("blog.page_size", page_size)?
        .set_default("blog.index_cache_seconds", cache_seconds)?
        .set_default("blog.media_root", defaults.blog.media_root.clone())?
        .set_default("blog.media_url", defaults.blog.media_url.clone())?;

    let environment_overrides = config::Environment::with_prefix("YATUBE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("YATUBE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via YATUBE_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.blog.page_size == 0 {
        bail!("invalid configuration: blog.page_size must be at least 1");
    }

    if config.auth.session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
        config.auth.session_ttl_seconds = MAX_SESSION_TTL_SECONDS;
    }

    if !config.blog.media_url.ends_with('/') {
        config.blog.media_url.push('/');
    }

    debug!(?config, "loaded blog configuration");
    Ok(config)
}
