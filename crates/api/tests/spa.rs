mod common;

use std::fs;

use axum::http::StatusCode;
use axum::Router;
use sqlx::SqlitePool;
use tempfile::TempDir;

use common::{body_json, body_text, build_test_app_with, get, test_config};

const INDEX: &str = "<!doctype html><div id=\"root\"></div>";

fn app_with_bundle(pool: SqlitePool) -> (Router, TempDir) {
    let dist = tempfile::tempdir().unwrap();
    fs::write(dist.path().join("index.html"), INDEX).unwrap();
    fs::create_dir(dist.path().join("assets")).unwrap();
    fs::write(dist.path().join("assets/app.js"), "console.log('ready');").unwrap();

    let mut config = test_config();
    config.static_dir = dist.path().to_path_buf();
    (build_test_app_with(pool, config), dist)
}

// ---- Test: the root serves the client entry page ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn root_serves_index(pool: SqlitePool) {
    let (app, _dist) = app_with_bundle(pool);

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, INDEX);
}

// ---- Test: bundled assets are served as files ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn assets_are_served(pool: SqlitePool) {
    let (app, _dist) = app_with_bundle(pool);

    let response = get(app, "/assets/app.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("javascript"));
    assert_eq!(body_text(response).await, "console.log('ready');");
}

// ---- Test: client-side routes fall back to the entry page ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn deep_links_fall_back_to_index(pool: SqlitePool) {
    let (app, _dist) = app_with_bundle(pool);

    for uri in ["/library/movies", "/item/42/details"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_text(response).await, INDEX);
    }
}

// ---- Test: API misses are not swallowed by the fallback ----

#[sqlx::test(migrator = "nexttracker_db::MIGRATOR")]
async fn api_misses_stay_json(pool: SqlitePool) {
    let (app, _dist) = app_with_bundle(pool);

    let response = get(app, "/api/unknown/thing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}
