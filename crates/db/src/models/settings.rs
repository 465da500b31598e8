//! Row model for the singleton `settings` table.

use nexttracker_core::error::CoreError;
use nexttracker_core::settings::AppSettings;
use nexttracker_core::types::Timestamp;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SettingsRow {
    pub tmdb_api_key: Option<String>,
    pub last_sync: Option<Timestamp>,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub nextcloud_url: Option<String>,
    pub nextcloud_username: Option<String>,
    pub nextcloud_password: Option<String>,
}

impl TryFrom<SettingsRow> for AppSettings {
    type Error = CoreError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        Ok(AppSettings {
            tmdb_api_key: row.tmdb_api_key,
            last_sync: row.last_sync,
            language: row.language.as_deref().map(str::parse).transpose()?,
            theme: row.theme.as_deref().map(str::parse).transpose()?,
            nextcloud_url: row.nextcloud_url,
            nextcloud_username: row.nextcloud_username,
            nextcloud_password: row.nextcloud_password,
        })
    }
}
