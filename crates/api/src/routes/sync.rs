//! Route definitions for settings, backup files and Nextcloud sync.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{settings, sync};
use crate::state::AppState;

/// ```text
/// GET  /settings       -> get_settings
/// PUT  /settings       -> update_settings
/// GET  /backup         -> export_backup
/// POST /backup         -> import_backup
/// GET  /sync/status    -> sync_status
/// POST /sync/push      -> push
/// POST /sync/pull      -> pull
/// POST /sync/test      -> test_connection
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/backup", get(sync::export_backup).post(sync::import_backup))
        .route("/sync/status", get(sync::sync_status))
        .route("/sync/push", post(sync::push))
        .route("/sync/pull", post(sync::pull))
        .route("/sync/test", post(sync::test_connection))
}
