//! Row model for the `items` table.

use nexttracker_core::error::CoreError;
use nexttracker_core::item::TrackableItem;
use nexttracker_core::metadata::ItemMetadata;
use nexttracker_core::types::{ItemId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `items` table.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: String,
    #[sqlx(rename = "type")]
    pub item_type: String,
    pub status: String,
    pub title: String,
    pub external_id: Option<String>,
    pub image: Option<String>,
    pub progress: i64,
    pub max_progress: Option<i64>,
    pub rating: Option<f64>,
    pub tags: Json<Vec<String>>,
    pub metadata: Json<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ItemRow> for TrackableItem {
    type Error = CoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let id = ItemId::parse_str(&row.id)
            .map_err(|e| CoreError::Validation(format!("invalid item id '{}': {e}", row.id)))?;
        let item_type = row.item_type.parse()?;

        Ok(TrackableItem {
            id,
            external_id: row.external_id,
            title: row.title,
            image: row.image,
            status: row.status.parse()?,
            progress: row.progress,
            max_progress: row.max_progress,
            rating: row.rating,
            tags: row.tags.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            metadata: ItemMetadata::from_value(item_type, row.metadata.0)?,
        })
    }
}
