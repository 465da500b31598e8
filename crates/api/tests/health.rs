mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::SqlitePool;

use common::{body_json, build_test_app, get, send};

// ---- Test: health endpoint reports an ok store ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn health_returns_ok(pool: SqlitePool) {
    let response = get(build_test_app(pool), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}

// ---- Test: health reports degraded once the pool is closed ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn health_reports_degraded_store(pool: SqlitePool) {
    let app = build_test_app(pool.clone());
    pool.close().await;

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

// ---- Test: unknown API routes answer 404 JSON ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn unknown_api_route_returns_json_404(pool: SqlitePool) {
    let response = get(build_test_app(pool), "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "No route for /api/nope");
}

// ---- Test: every response carries a request id ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn response_has_request_id(pool: SqlitePool) {
    let response = get(build_test_app(pool), "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header missing")
        .to_str()
        .unwrap();
    assert_eq!(request_id.len(), 36);
}

// ---- Test: CORS preflight admits WebDAV verbs and the routing header ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn cors_preflight_allows_webdav_proxying(pool: SqlitePool) {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/proxy")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "PROPFIND")
        .header("access-control-request-headers", "x-target-url,depth")
        .body(Body::empty())
        .unwrap();

    let response = send(build_test_app(pool), request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get("access-control-allow-methods").unwrap(),
        "PROPFIND"
    );
    let allowed = headers
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed.contains("x-target-url"));
    assert!(allowed.contains("depth"));
}

// ---- Test: preflight from an unlisted origin gets no grant ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn cors_rejects_unknown_origin(pool: SqlitePool) {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/items")
        .header("origin", "http://evil.example")
        .header("access-control-request-method", "GET")
        .body(Body::empty())
        .unwrap();

    let response = send(build_test_app(pool), request).await;
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
