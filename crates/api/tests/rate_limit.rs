mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use sqlx::SqlitePool;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{body_json, build_test_app_with, get, send, test_config};

async fn upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Response": "True" })))
        .mount(&server)
        .await;
    server
}

fn limited_app(pool: SqlitePool, server: &MockServer, max: u32, window_secs: u64) -> Router {
    let mut config = test_config();
    config.tmdb.base_url = server.uri();
    config.omdb.base_url = server.uri();
    config.rate_limit_max = max;
    config.rate_limit_window_secs = window_secs;
    build_test_app_with(pool, config)
}

fn from_client(app: &Router, addr: [u8; 4]) -> Router {
    app.clone()
        .layer(MockConnectInfo(SocketAddr::from((addr, 40000))))
}

// ---- Test: requests past the quota get 429 with Retry-After ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn provider_requests_past_quota_are_limited(pool: SqlitePool) {
    let server = upstream().await;
    let app = from_client(&limited_app(pool, &server, 2, 900), [203, 0, 113, 5]);

    for _ in 0..2 {
        let response = get(app.clone(), "/api/omdb/tt0137523").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(app, "/api/tmdb/movie/popular").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .expect("retry-after header missing")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=900).contains(&retry_after));

    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["error"], "Too many requests, please try again later");

    // The limited request never reached the provider.
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

// ---- Test: each client address has its own quota ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn quotas_are_per_client(pool: SqlitePool) {
    let server = upstream().await;
    let base = limited_app(pool, &server, 1, 900);
    let first = from_client(&base, [203, 0, 113, 5]);
    let second = from_client(&base, [198, 51, 100, 9]);

    assert_eq!(get(first.clone(), "/api/omdb/tt1").await.status(), StatusCode::OK);
    assert_eq!(
        get(first, "/api/omdb/tt1").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(get(second, "/api/omdb/tt1").await.status(), StatusCode::OK);
}

// ---- Test: the quota is restored once the window has passed ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn quota_resets_after_window(pool: SqlitePool) {
    let server = upstream().await;
    let app = from_client(&limited_app(pool, &server, 1, 1), [203, 0, 113, 5]);

    assert_eq!(get(app.clone(), "/api/omdb/tt1").await.status(), StatusCode::OK);
    assert_eq!(
        get(app.clone(), "/api/omdb/tt1").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(get(app, "/api/omdb/tt1").await.status(), StatusCode::OK);
}

// ---- Test: the generic proxy and collection routes are not limited ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn other_routes_are_not_limited(pool: SqlitePool) {
    let server = upstream().await;
    let app = from_client(&limited_app(pool, &server, 1, 900), [203, 0, 113, 5]);

    for _ in 0..3 {
        let request = Request::builder()
            .uri("/api/proxy")
            .header("x-target-url", format!("{}/status.php", server.uri()))
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(app.clone(), request).await.status(), StatusCode::OK);
        assert_eq!(get(app.clone(), "/api/items").await.status(), StatusCode::OK);
    }
}
