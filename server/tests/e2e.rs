use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Method, Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;
use yatube_config::AppConfig;
use yatube_database::{CreateGroupRequest, GroupRepository};
use yatube_runtime::BackendServices;
use yatube_web::{build_router, AppState};

struct TestApp {
    router: Router,
    pool: SqlitePool,
    _dir: TempDir,
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    cookie: Option<String>,
    text: String,
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let db_path = dir.path().join("yatube-e2e.db");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", db_path.to_string_lossy());
        config.database.max_connections = 5;
        config.blog.media_root = dir.path().join("media").to_string_lossy().into_owned();
        config.blog.index_cache_seconds = 0;

        let services = BackendServices::initialise(&config)
            .await
            .expect("initialise backend services");

        let state = AppState::new(
            services.db_pool.clone(),
            services.authenticator.clone(),
            &config,
        );

        Self {
            router: build_router(state),
            pool: services.db_pool.clone(),
            _dir: dir,
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        form: Option<&[(&str, &str)]>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }

        let body = match form {
            Some(fields) => {
                builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                let encoded: String = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish();
                Body::from(encoded)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("dispatch request");

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect response body")
            .to_bytes();

        TestResponse {
            status,
            location,
            cookie,
            text: String::from_utf8(bytes.to_vec()).unwrap_or_default(),
        }
    }

    async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("count rows")
    }
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&response.text).expect("json body");
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn blog_journey_from_signup_to_follow_feed() {
    let app = TestApp::new().await;
    let group = GroupRepository::new(app.pool.clone())
        .create(&CreateGroupRequest {
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: "All about cats".to_string(),
        })
        .await
        .expect("create group");

    let writer = app
        .request(
            Method::POST,
            "/auth/signup/",
            Some(&[("username", "writer"), ("password", "writer-password")]),
            None,
        )
        .await;
    assert_eq!(writer.status, StatusCode::FOUND);
    let writer_cookie = writer.cookie.expect("writer session cookie");

    let group_id = group.id.to_string();
    let created = app
        .request(
            Method::POST,
            "/create/",
            Some(&[("text", "A post about cats"), ("group", &group_id)]),
            Some(&writer_cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::FOUND);
    assert_eq!(created.location.as_deref(), Some("/profile/writer/"));

    let group_page = app.request(Method::GET, "/group/cats/", None, None).await;
    assert!(group_page.text.contains("A post about cats"));

    let reader = app
        .request(
            Method::POST,
            "/auth/signup/",
            Some(&[("username", "reader"), ("password", "reader-password")]),
            None,
        )
        .await;
    let reader_cookie = reader.cookie.expect("reader session cookie");

    let empty_feed = app
        .request(Method::GET, "/follow/", None, Some(&reader_cookie))
        .await;
    assert!(!empty_feed.text.contains("A post about cats"));

    let followed = app
        .request(
            Method::GET,
            "/profile/writer/follow/",
            None,
            Some(&reader_cookie),
        )
        .await;
    assert_eq!(followed.status, StatusCode::FOUND);
    assert_eq!(app.count("follows").await, 1);

    let feed = app
        .request(Method::GET, "/follow/", None, Some(&reader_cookie))
        .await;
    assert!(feed.text.contains("A post about cats"));

    let post_id: i64 = sqlx::query_scalar("SELECT id FROM posts")
        .fetch_one(&app.pool)
        .await
        .expect("post id");
    let commented = app
        .request(
            Method::POST,
            &format!("/posts/{post_id}/comment/"),
            Some(&[("text", "Nice cat")]),
            Some(&reader_cookie),
        )
        .await;
    assert_eq!(commented.location, Some(format!("/posts/{post_id}/")));
    assert_eq!(app.count("comments").await, 1);

    let logout = app
        .request(Method::POST, "/auth/logout/", None, Some(&reader_cookie))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let after_logout = app
        .request(Method::GET, "/follow/", None, Some(&reader_cookie))
        .await;
    assert_eq!(after_logout.status, StatusCode::FOUND);
}

#[tokio::test]
async fn bearer_token_authenticates_like_the_cookie() {
    let app = TestApp::new().await;
    let signup = app
        .request(
            Method::POST,
            "/auth/signup/",
            Some(&[("username", "api"), ("password", "api-password")]),
            None,
        )
        .await;
    let cookie = signup.cookie.expect("session cookie");
    let token = cookie.split_once('=').map(|(_, token)| token).expect("token");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/create/")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("dispatch request");

    assert_eq!(response.status(), StatusCode::OK);
}
