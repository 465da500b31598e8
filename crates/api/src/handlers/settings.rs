//! Handlers for the singleton settings record.
//!
//! The stored Nextcloud password is write-only: responses never include it.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use nexttracker_core::settings::AppSettings;
use nexttracker_db::repositories::SettingsRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

fn redacted(settings: AppSettings) -> AppSettings {
    AppSettings {
        nextcloud_password: None,
        ..settings
    }
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::get(&state.pool).await?;

    Ok(Json(DataResponse {
        data: redacted(settings),
    }))
}

/// PUT /api/settings
///
/// Merge the given fields into the stored record; omitted fields keep their
/// value.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<AppSettings>,
) -> AppResult<impl IntoResponse> {
    let merged = SettingsRepo::save(&state.pool, &update).await?;

    tracing::info!("Settings updated");

    Ok(Json(DataResponse {
        data: redacted(merged),
    }))
}
