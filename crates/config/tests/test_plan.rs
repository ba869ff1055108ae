//! Tests for the `yatube-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and validation behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use yatube_config::{load, AppConfig, AuthConfig, BlogConfig, HttpConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "YATUBE_CONFIG",
    "YATUBE__AUTH__COOKIE_NAME",
    "YATUBE__AUTH__SESSION_TTL_SECONDS",
    "YATUBE__BLOG__INDEX_CACHE_SECONDS",
    "YATUBE__BLOG__MEDIA_ROOT",
    "YATUBE__BLOG__MEDIA_URL",
    "YATUBE__BLOG__PAGE_SIZE",
    "YATUBE__DATABASE__MAX_CONNECTIONS",
    "YATUBE__DATABASE__URL",
    "YATUBE__HTTP__ADDRESS",
    "YATUBE__HTTP__PORT",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

fn isolated() -> (TempDir, TestContext) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    (temp_dir, ctx)
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let (_temp_dir, _ctx) = isolated();

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(
        config.database.max_connections,
        defaults.database.max_connections
    );
    assert_eq!(config.auth.session_ttl_seconds, defaults.auth.session_ttl_seconds);
    assert_eq!(config.auth.cookie_name, "sessionid");
    assert_eq!(config.blog.page_size, 10);
    assert_eq!(config.blog.index_cache_seconds, 20);
    assert_eq!(config.blog.media_root, "media");
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "yatube.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/yatube.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "yatube.toml",
        r#"
        [blog]
        page_size = 25

        [database]
        max_connections = 50
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.blog.page_size, 25);
    assert_eq!(config.blog.index_cache_seconds, defaults.blog.index_cache_seconds);
    assert_eq!(config.database.max_connections, 50);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(config.http.port, defaults.http.port);
}

#[test]
#[serial]
fn load_reads_explicit_config_path() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "elsewhere/blog.toml",
        r#"
        [blog]
        media_root = "/var/lib/yatube/media"
        "#,
    );
    let path = temp_dir.path().join("elsewhere/blog.toml");
    ctx.set_var("YATUBE_CONFIG", path.to_string_lossy());

    let config = load().expect("configuration load should honour YATUBE_CONFIG");
    assert_eq!(config.blog.media_root, "/var/lib/yatube/media");
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "yatube.toml",
        r#"
        [http]
        port = 3030
        "#,
    );

    ctx.set_var("YATUBE__HTTP__PORT", "8080");
    ctx.set_var("YATUBE__BLOG__PAGE_SIZE", "3");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.blog.page_size, 3);
}

#[test]
#[serial]
fn load_rejects_zero_page_size() {
    let (_temp_dir, mut ctx) = isolated();
    ctx.set_var("YATUBE__BLOG__PAGE_SIZE", "0");

    let error = load().expect_err("zero page size should be rejected");
    assert!(error.to_string().contains("page_size"));
}

#[test]
#[serial]
fn load_normalises_media_url_trailing_slash() {
    let (_temp_dir, mut ctx) = isolated();
    ctx.set_var("YATUBE__BLOG__MEDIA_URL", "/uploads");

    let config = load().expect("configuration load should succeed");
    assert_eq!(config.blog.media_url, "/uploads/");
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "yatube.toml",
        r#"
        [http]
        port = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration") || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn auth_config_defaults_to_two_week_sessions() {
    let defaults = AuthConfig::default();
    assert_eq!(defaults.session_ttl_seconds, 14 * 24 * 60 * 60);
    assert_eq!(defaults.cookie_name, "sessionid");
}

#[test]
fn blog_config_defaults_match_listing_page_size() {
    let defaults = BlogConfig::default();
    assert_eq!(defaults.page_size, 10);
    assert_eq!(defaults.media_root, "media");
}

#[test]
fn http_config_defaults_match_expected_host_and_port() {
    let defaults = HttpConfig::default();
    assert_eq!(defaults.address, "127.0.0.1");
    assert_eq!(defaults.port, 8000);
}
