//! Handlers for backup export/import and Nextcloud sync.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use nexttracker_core::error::CoreError;
use nexttracker_core::settings::AppSettings;
use nexttracker_db::repositories::SettingsRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of items moved by a backup or sync operation.
#[derive(Debug, Serialize)]
pub struct SyncSummary {
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Backup file
// ---------------------------------------------------------------------------

/// GET /api/backup
///
/// Download the whole collection as `nexttracker-backup-YYYY-MM-DD.json`.
pub async fn export_backup(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let backup = state.sync.export_to_string().await?;

    let disposition = format!("attachment; filename=\"{}\"", backup.file_name);
    Ok((
        [
            (CONTENT_TYPE, "application/json".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        backup.text,
    ))
}

/// POST /api/backup
///
/// Replace the collection with the uploaded backup. The body is the raw file
/// text: a versioned backup document or a bare array of items.
pub async fn import_backup(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let text = std::str::from_utf8(&body)
        .map_err(|_| CoreError::Validation("Backup file is not valid UTF-8".into()))?;
    let count = state.sync.import_from_str(text).await?;

    Ok(Json(DataResponse {
        data: SyncSummary { count },
    }))
}

// ---------------------------------------------------------------------------
// Nextcloud
// ---------------------------------------------------------------------------

/// GET /api/sync/status
pub async fn sync_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: state.sync.status(),
    })
}

/// POST /api/sync/push
pub async fn push(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::get(&state.pool).await?;
    let count = state.sync.push_to_nextcloud(&settings).await?;

    Ok(Json(DataResponse {
        data: SyncSummary { count },
    }))
}

/// POST /api/sync/pull
pub async fn pull(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::get(&state.pool).await?;
    let count = state.sync.pull_from_nextcloud(&settings).await?;

    Ok(Json(DataResponse {
        data: SyncSummary { count },
    }))
}

/// POST /api/sync/test
///
/// Check the stored credentials, overlaid with any fields in the body, so a
/// settings form can be tested before it is saved. Send `{}` to test the
/// stored values as they are.
pub async fn test_connection(
    State(state): State<AppState>,
    Json(overrides): Json<AppSettings>,
) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::get(&state.pool).await?.merged(overrides);
    state.sync.test_connection(&settings).await?;

    Ok(Json(DataResponse {
        data: state.sync.status(),
    }))
}
