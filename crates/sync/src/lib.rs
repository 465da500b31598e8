//! Backup and restore for the NextTracker collection.
//!
//! * [`service::SyncService`] exports and imports JSON backups and pushes or
//!   pulls them to a Nextcloud WebDAV folder.
//! * [`webdav::WebDavClient`] is the small WebDAV client underneath.

pub mod error;
pub mod service;
pub mod webdav;

pub use error::SyncError;
pub use service::{ExportReport, RenderedBackup, SyncService, SYNC_CANCELLED};
