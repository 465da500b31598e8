//! Backup document format.
//!
//! Exports are written as a versioned envelope that keeps screen media and
//! books in separate arrays. Imports accept that envelope as well as the bare
//! JSON array written by earlier releases of the tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::item::{Shelf, TrackableItem};

/// Envelope version written by [`render_backup`].
pub const BACKUP_VERSION: u32 = 1;

/// Remote directory holding the WebDAV backup.
pub const REMOTE_BACKUP_DIR: &str = "/NextTracker";

/// Remote path of the WebDAV backup file.
pub const REMOTE_BACKUP_PATH: &str = "/NextTracker/backup.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u32,
    pub export_date: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<TrackableItem>,
    #[serde(default)]
    pub books: Vec<TrackableItem>,
}

impl BackupDocument {
    pub fn new(items: Vec<TrackableItem>, exported_at: DateTime<Utc>) -> Self {
        let (books, items): (Vec<_>, Vec<_>) =
            items.into_iter().partition(|i| i.shelf() == Shelf::Books);
        Self {
            version: BACKUP_VERSION,
            export_date: exported_at,
            items,
            books,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len() + self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_items(self) -> Vec<TrackableItem> {
        let mut all = self.items;
        all.extend(self.books);
        all
    }
}

/// Render every item as a pretty-printed backup document.
pub fn render_backup(
    items: Vec<TrackableItem>,
    exported_at: DateTime<Utc>,
) -> Result<String, CoreError> {
    serde_json::to_string_pretty(&BackupDocument::new(items, exported_at))
        .map_err(|e| CoreError::Internal(format!("failed to serialize backup: {e}")))
}

/// Parse a backup file into the items it contains.
///
/// Accepts a versioned envelope or a bare array of items. Empty input,
/// invalid JSON, any other top-level shape, an unsupported version or a
/// malformed record are all rejected; nothing is partially returned.
pub fn parse_backup(text: &str) -> Result<Vec<TrackableItem>, CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("Backup file is empty".into()));
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| CoreError::Validation(format!("Backup file is not valid JSON: {e}")))?;

    match value {
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| CoreError::Validation(format!("Invalid backup record: {e}"))),
        Value::Object(map) if map.contains_key("version") => {
            let version = map.get("version").cloned().unwrap_or_default();
            if version.as_u64() != Some(u64::from(BACKUP_VERSION)) {
                return Err(CoreError::Validation(format!(
                    "Unsupported backup version: {version}"
                )));
            }
            let doc: BackupDocument = serde_json::from_value(Value::Object(map))
                .map_err(|e| CoreError::Validation(format!("Invalid backup record: {e}")))?;
            Ok(doc.into_items())
        }
        _ => Err(CoreError::Validation("Invalid backup file format".into())),
    }
}

/// File name for a local export made on the given day.
pub fn backup_file_name(exported_at: DateTime<Utc>) -> String {
    format!("nexttracker-backup-{}.json", exported_at.format("%Y-%m-%d"))
}
