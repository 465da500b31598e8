//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument.

pub mod item_repo;
pub mod settings_repo;

pub use item_repo::ItemRepo;
pub use settings_repo::SettingsRepo;
