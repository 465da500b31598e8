//! Backup export/import and Nextcloud push/pull over the item store.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use nexttracker_core::backup::{
    backup_file_name, parse_backup, render_backup, REMOTE_BACKUP_DIR, REMOTE_BACKUP_PATH,
};
use nexttracker_core::settings::AppSettings;
use nexttracker_core::sync_status::{SyncSnapshot, SyncTracker};
use nexttracker_core::types::Timestamp;
use nexttracker_db::repositories::{ItemRepo, SettingsRepo};
use nexttracker_db::DbPool;

use crate::error::SyncError;
use crate::webdav::WebDavClient;

/// Result of writing a local backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub count: usize,
}

/// A backup document rendered in memory.
#[derive(Debug, Clone)]
pub struct RenderedBackup {
    /// Suggested download name, `nexttracker-backup-YYYY-MM-DD.json`.
    pub file_name: String,
    pub text: String,
    pub count: usize,
}

/// Moves the whole collection between the store and a backup document.
///
/// Restores always replace both shelves atomically: either every record in
/// the document is stored, or the previous contents stay as they were.
pub struct SyncService {
    pool: DbPool,
    http: reqwest::Client,
    proxy_url: Option<String>,
    tracker: Mutex<SyncTracker>,
}

impl SyncService {
    pub fn new(pool: DbPool) -> Self {
        Self::with_tracker(pool, SyncTracker::default())
    }

    pub fn with_tracker(pool: DbPool, tracker: SyncTracker) -> Self {
        Self {
            pool,
            http: reqwest::Client::new(),
            proxy_url: None,
            tracker: Mutex::new(tracker),
        }
    }

    /// Send WebDAV traffic through a forwarding proxy at `proxy_url`.
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Current state of the sync indicator.
    pub fn status(&self) -> SyncSnapshot {
        self.tracker().snapshot(Instant::now())
    }

    /// Write every item to `nexttracker-backup-YYYY-MM-DD.json` inside `dir`.
    pub async fn export_to_json(&self, dir: &Path) -> Result<ExportReport, SyncError> {
        let (export, exported_at) = self.render_all().await?;

        let path = dir.join(&export.file_name);
        tokio::fs::write(&path, export.text).await?;
        SettingsRepo::touch_last_sync(&self.pool, exported_at).await?;

        tracing::info!(path = %path.display(), count = export.count, "Backup exported");
        Ok(ExportReport {
            path,
            count: export.count,
        })
    }

    /// Render every item as backup text and record the export time.
    pub async fn export_to_string(&self) -> Result<RenderedBackup, SyncError> {
        let (export, exported_at) = self.render_all().await?;
        SettingsRepo::touch_last_sync(&self.pool, exported_at).await?;

        tracing::info!(count = export.count, "Backup rendered");
        Ok(export)
    }

    /// Restore from a backup file on disk. Returns the number of records
    /// imported.
    pub async fn import_from_json(&self, path: &Path) -> Result<usize, SyncError> {
        let text = tokio::fs::read_to_string(path).await?;
        self.import_from_str(&text).await
    }

    /// Restore from backup text, either the versioned envelope or a bare
    /// array of records.
    pub async fn import_from_str(&self, text: &str) -> Result<usize, SyncError> {
        let items = parse_backup(text)?;
        let count = ItemRepo::replace_all(&self.pool, &items).await?;
        SettingsRepo::touch_last_sync(&self.pool, Utc::now().timestamp_millis()).await?;

        tracing::info!(count, "Backup imported");
        Ok(count)
    }

    /// Upload the full collection to `/NextTracker/backup.json`, creating the
    /// folder when needed. Returns the number of records uploaded.
    pub async fn push_to_nextcloud(&self, settings: &AppSettings) -> Result<usize, SyncError> {
        self.tracked(
            "Uploading backup to Nextcloud",
            async {
                let client = self.webdav(settings)?;
                let (export, exported_at) = self.render_all().await?;

                client.ensure_directory(REMOTE_BACKUP_DIR).await?;
                client.put_file(REMOTE_BACKUP_PATH, export.text).await?;
                SettingsRepo::touch_last_sync(&self.pool, exported_at).await?;

                tracing::info!(count = export.count, "Backup pushed to Nextcloud");
                Ok(export.count)
            },
            |count| format!("Uploaded {count} items"),
        )
        .await
    }

    /// Download `/NextTracker/backup.json` and replace the local collection
    /// with it. Returns the number of records restored.
    pub async fn pull_from_nextcloud(&self, settings: &AppSettings) -> Result<usize, SyncError> {
        self.tracked(
            "Downloading backup from Nextcloud",
            async {
                let client = self.webdav(settings)?;
                if !client.exists(REMOTE_BACKUP_PATH).await? {
                    return Err(SyncError::BackupNotFound);
                }
                let text = client.get_file(REMOTE_BACKUP_PATH).await?;
                self.import_from_str(&text).await
            },
            |count| format!("Restored {count} items"),
        )
        .await
    }

    /// Check that the configured URL and credentials can list the WebDAV
    /// root.
    pub async fn test_connection(&self, settings: &AppSettings) -> Result<(), SyncError> {
        self.tracked(
            "Testing Nextcloud connection",
            async {
                let client = self.webdav(settings)?;
                client.list_directory("/").await?;
                Ok(())
            },
            |_| "Connection successful".to_string(),
        )
        .await
    }

    // ---- private helpers ----

    async fn render_all(&self) -> Result<(RenderedBackup, Timestamp), SyncError> {
        let items = ItemRepo::list_all(&self.pool).await?;
        let count = items.len();
        let now = Utc::now();
        let text = render_backup(items, now)?;

        Ok((
            RenderedBackup {
                file_name: backup_file_name(now),
                text,
                count,
            },
            now.timestamp_millis(),
        ))
    }

    fn webdav(&self, settings: &AppSettings) -> Result<WebDavClient, SyncError> {
        let credentials = settings.webdav_credentials()?;
        let client = WebDavClient::new(self.http.clone(), &credentials)?;
        Ok(match &self.proxy_url {
            Some(proxy) => client.via_proxy(proxy.clone()),
            None => client,
        })
    }

    fn tracker(&self) -> MutexGuard<'_, SyncTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `operation` while the tracker shows `syncing`, then record its
    /// outcome. A second tracked call while one is running fails fast. If
    /// the returned future is dropped early the attempt is recorded as
    /// cancelled.
    async fn tracked<T, F>(
        &self,
        label: &str,
        operation: F,
        on_success: impl FnOnce(&T) -> String,
    ) -> Result<T, SyncError>
    where
        F: Future<Output = Result<T, SyncError>>,
    {
        self.tracker().begin(label)?;
        let attempt = SyncAttempt::new(self, label);
        let result = operation.await;

        match &result {
            Ok(value) => attempt.succeed(on_success(value)),
            Err(e) => attempt.fail(e.to_string()),
        }
        result
    }
}

/// Message recorded when a sync future is dropped before it finishes.
pub const SYNC_CANCELLED: &str = "Sync cancelled";

/// Settles the tracker exactly once for a begun sync. Dropping it unsettled,
/// on timeout or client disconnect, marks the attempt as cancelled.
struct SyncAttempt<'a> {
    service: &'a SyncService,
    label: &'a str,
    settled: bool,
}

impl<'a> SyncAttempt<'a> {
    fn new(service: &'a SyncService, label: &'a str) -> Self {
        Self {
            service,
            label,
            settled: false,
        }
    }

    fn succeed(mut self, message: String) {
        self.settled = true;
        self.service.tracker().succeed(message, Instant::now());
    }

    fn fail(mut self, message: String) {
        self.settled = true;
        tracing::warn!(error = %message, operation = self.label, "Sync failed");
        self.service.tracker().fail(message, Instant::now());
    }
}

impl Drop for SyncAttempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(operation = self.label, "Sync cancelled before completion");
            self.service.tracker().fail(SYNC_CANCELLED, Instant::now());
        }
    }
}
