//! Shared response envelope for the collection endpoints.
//!
//! Item, settings, backup and sync responses use a `{ "data": ... }`
//! envelope. Proxy routes relay upstream bodies untouched and never use it.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
