//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use wiremock::{Request as MockRequest, Respond, ResponseTemplate};

use nexttracker_api::config::{ProviderConfig, ServerConfig};
use nexttracker_api::router::build_app_router;
use nexttracker_api::state::AppState;

/// Nothing listens here, so upstream calls fail fast with connection refused.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub const TMDB_KEY: &str = "test-tmdb-key";
pub const OMDB_KEY: &str = "test-omdb-key";

/// Build a test `ServerConfig` with safe defaults.
///
/// Provider keys are set but both providers point at [`UNREACHABLE`];
/// tests that exercise a proxy swap in a wiremock base URL.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_body_bytes: 10 * 1024 * 1024,
        tmdb: ProviderConfig {
            api_key: Some(TMDB_KEY.to_string()),
            base_url: UNREACHABLE.to_string(),
            language: Some("tr-TR".to_string()),
        },
        omdb: ProviderConfig {
            api_key: Some(OMDB_KEY.to_string()),
            base_url: UNREACHABLE.to_string(),
            language: None,
        },
        rate_limit_max: 100,
        rate_limit_window_secs: 900,
        static_dir: PathBuf::from("missing-static-dir"),
    }
}

/// The full application router over `pool` with the default test config.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with(pool, test_config())
}

/// The full application router, through the same builder `main.rs` uses.
pub fn build_test_app_with(pool: SqlitePool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: &Value) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fake WebDAV remote
// ---------------------------------------------------------------------------

/// Path of the user's WebDAV root on the fake server.
pub const DAV_ROOT: &str = "/remote.php/dav/files/ada";

/// `Basic` credentials for `ada:secret`.
const EXPECTED_AUTH: &str = "Basic YWRhOnNlY3JldA==";

/// In-memory WebDAV server for wiremock: `PROPFIND`, `MKCOL`, `PUT` and
/// `GET` under [`DAV_ROOT`], behind basic auth.
#[derive(Clone)]
pub struct FakeDav {
    collections: Arc<Mutex<HashSet<String>>>,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl FakeDav {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(Mutex::new(HashSet::from([DAV_ROOT.to_string()]))),
            files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&format!("{DAV_ROOT}{path}"))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Respond for FakeDav {
    fn respond(&self, request: &MockRequest) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some(EXPECTED_AUTH);
        if !authorized {
            return ResponseTemplate::new(401);
        }

        let path = request.url.path().trim_end_matches('/').to_string();
        let parent = path.rsplit_once('/').map(|(p, _)| p.to_string()).unwrap_or_default();
        let mut collections = self.collections.lock().unwrap();
        let mut files = self.files.lock().unwrap();

        match request.method.as_str() {
            "PROPFIND" if collections.contains(&path) || files.contains_key(&path) => {
                ResponseTemplate::new(207).set_body_string(format!(
                    r#"<?xml version="1.0"?><d:multistatus xmlns:d="DAV:"><d:response><d:href>{path}</d:href></d:response></d:multistatus>"#
                ))
            }
            "PROPFIND" => ResponseTemplate::new(404),
            "MKCOL" if collections.contains(&path) => ResponseTemplate::new(405),
            "MKCOL" if collections.contains(&parent) => {
                collections.insert(path);
                ResponseTemplate::new(201)
            }
            "PUT" if collections.contains(&parent) => {
                files.insert(path, request.body.clone());
                ResponseTemplate::new(201)
            }
            "MKCOL" | "PUT" => ResponseTemplate::new(409),
            "GET" => match files.get(&path) {
                Some(bytes) => ResponseTemplate::new(200).set_body_bytes(bytes.clone()),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}
