//! Domain types shared by the NextTracker store, sync service and gateway.

pub mod backup;
pub mod catalog;
pub mod error;
pub mod item;
pub mod metadata;
pub mod settings;
pub mod sync_status;
pub mod types;
