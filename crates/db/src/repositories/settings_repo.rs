//! Repository for the singleton `settings` row.

use nexttracker_core::settings::{AppSettings, SETTINGS_ID};
use nexttracker_core::types::Timestamp;
use sqlx::SqlitePool;

use crate::models::decode_error;
use crate::models::settings::SettingsRow;

const COLUMNS: &str = "tmdb_api_key, last_sync, language, theme, \
                       nextcloud_url, nextcloud_username, nextcloud_password";

/// Reads and merges the application settings.
pub struct SettingsRepo;

impl SettingsRepo {
    /// The stored settings, or the empty default if nothing was saved yet.
    pub async fn get(pool: &SqlitePool) -> Result<AppSettings, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE id = ?");
        let row = sqlx::query_as::<_, SettingsRow>(&query)
            .bind(SETTINGS_ID)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => AppSettings::try_from(row).map_err(decode_error),
            None => Ok(AppSettings::default()),
        }
    }

    /// Merge `update` into the stored settings, creating the row on first
    /// write. Fields left `None` keep their stored value. Returns the merged
    /// record.
    pub async fn save(pool: &SqlitePool, update: &AppSettings) -> Result<AppSettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO settings (id, {COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET \
                 tmdb_api_key = COALESCE(excluded.tmdb_api_key, settings.tmdb_api_key), \
                 last_sync = COALESCE(excluded.last_sync, settings.last_sync), \
                 language = COALESCE(excluded.language, settings.language), \
                 theme = COALESCE(excluded.theme, settings.theme), \
                 nextcloud_url = COALESCE(excluded.nextcloud_url, settings.nextcloud_url), \
                 nextcloud_username = COALESCE(excluded.nextcloud_username, settings.nextcloud_username), \
                 nextcloud_password = COALESCE(excluded.nextcloud_password, settings.nextcloud_password) \
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, SettingsRow>(&query)
            .bind(SETTINGS_ID)
            .bind(&update.tmdb_api_key)
            .bind(update.last_sync)
            .bind(update.language.map(|l| l.as_str()))
            .bind(update.theme.map(|t| t.as_str()))
            .bind(&update.nextcloud_url)
            .bind(&update.nextcloud_username)
            .bind(&update.nextcloud_password)
            .fetch_one(pool)
            .await?;

        AppSettings::try_from(row).map_err(decode_error)
    }

    /// Record the time of the last successful backup or restore.
    pub async fn touch_last_sync(pool: &SqlitePool, at: Timestamp) -> Result<(), sqlx::Error> {
        Self::save(
            pool,
            &AppSettings {
                last_sync: Some(at),
                ..AppSettings::default()
            },
        )
        .await?;
        Ok(())
    }
}
