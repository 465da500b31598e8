//! Database row structs.
//!
//! Each submodule holds a `FromRow` struct matching a table row and its
//! conversion into the domain type from `nexttracker_core`.

pub mod item;
pub mod settings;

/// Wrap a domain conversion failure as a sqlx decode error.
pub(crate) fn decode_error(err: nexttracker_core::error::CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
