use std::{collections::HashMap, sync::Arc, time::Duration, time::Instant};

use axum::http::Uri;
use bytes::Bytes;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use yatube_auth::Authenticator;
use yatube_config::AppConfig;
use yatube_database::{
    CommentRepository, FollowRepository, GroupRepository, Paginator, PostRepository, User,
    UserRepository,
};

use crate::media::MediaStore;
use crate::templates::{self, Page, Template};

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    authenticator: Authenticator,
    paginator: Paginator,
    cookie_name: Arc<str>,
    media_url: Arc<str>,
    page_cache: PageCache,
    media: MediaStore,
}

impl AppState {
    pub fn new(pool: SqlitePool, authenticator: Authenticator, config: &AppConfig) -> Self {
        let page_cache = PageCache::new(Duration::from_secs(config.blog.index_cache_seconds));
        Self::with_page_cache(pool, authenticator, config, page_cache)
    }

    pub fn with_page_cache(
        pool: SqlitePool,
        authenticator: Authenticator,
        config: &AppConfig,
        page_cache: PageCache,
    ) -> Self {
        Self {
            pool,
            authenticator,
            paginator: Paginator::new(config.blog.page_size),
            cookie_name: Arc::from(config.auth.cookie_name.as_str()),
            media_url: Arc::from(config.blog.media_url.as_str()),
            page_cache,
            media: MediaStore::new(&config.blog.media_root, config.blog.media_url.clone()),
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn page_cache(&self) -> &PageCache {
        &self.page_cache
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn groups(&self) -> GroupRepository {
        GroupRepository::new(self.pool.clone())
    }

    pub fn posts(&self) -> PostRepository {
        PostRepository::new(self.pool.clone())
    }

    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(self.pool.clone())
    }

    pub fn follows(&self) -> FollowRepository {
        FollowRepository::new(self.pool.clone())
    }

    pub fn render<T: Template>(&self, template: &T, viewer: Option<&User>) -> Page {
        templates::render(template, viewer, &self.media_url)
    }
}

/// Whole rendered pages kept for a short window.
#[derive(Clone)]
pub struct PageCache {
    inner: Arc<Mutex<HashMap<String, (Instant, Bytes)>>>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Path, query and the viewer's session. Anonymous viewers share one entry.
    pub fn key(uri: &Uri, viewer: Option<&str>) -> String {
        let path = uri
            .path_and_query()
            .map(|value| value.as_str())
            .unwrap_or_else(|| uri.path());
        format!("{path}#{}", viewer.unwrap_or("anonymous"))
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard, self.ttl);
        guard.get(key).map(|(_, body)| body.clone())
    }

    pub async fn insert(&self, key: String, body: Bytes) {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard, self.ttl);
        guard.insert(key, (Instant::now(), body));
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        let mut guard = self.inner.lock().await;
        Self::prune(&mut guard, self.ttl);
        guard.len()
    }

    fn prune(map: &mut HashMap<String, (Instant, Bytes)>, ttl: Duration) {
        let now = Instant::now();
        map.retain(|_, (stored, _)| now.duration_since(*stored) < ttl);
    }
}
