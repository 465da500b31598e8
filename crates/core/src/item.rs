//! Tracked items: movies, series, books and fitness entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::metadata::ItemMetadata;
use crate::types::{ItemId, Timestamp};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Kind of tracked work. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Movie,
    Series,
    Book,
    Fitness,
}

/// User-assigned progress status. There are no automatic transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    Planned,
    InProgress,
    Completed,
    Dropped,
}

/// Storage partition an item lives in, fixed by its type at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shelf {
    /// Movies, series (and fitness entries).
    Screen,
    Books,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [Self::Movie, Self::Series, Self::Book, Self::Fitness];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Book => "book",
            Self::Fitness => "fitness",
        }
    }

    pub fn shelf(self) -> Shelf {
        match self {
            Self::Book => Shelf::Books,
            Self::Movie | Self::Series | Self::Fitness => Shelf::Screen,
        }
    }
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        Self::Planned,
        Self::InProgress,
        Self::Completed,
        Self::Dropped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        }
    }
}

impl Shelf {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Books => "books",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown item type '{s}'")))
    }
}

impl FromStr for ItemStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown item status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A tracked unit of media or reading material.
///
/// The item type is carried by the metadata variant, so the two can never
/// disagree. On the wire the record keeps the flat camelCase shape with
/// `type` and `metadata` as sibling keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord", into = "ItemRecord")]
pub struct TrackableItem {
    pub id: ItemId,
    pub external_id: Option<String>,
    pub title: String,
    pub image: Option<String>,
    pub status: ItemStatus,
    pub progress: i64,
    pub max_progress: Option<i64>,
    /// User rating, 0 to 10.
    pub rating: Option<f64>,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub metadata: ItemMetadata,
}

impl TrackableItem {
    pub fn item_type(&self) -> ItemType {
        self.metadata.item_type()
    }

    pub fn shelf(&self) -> Shelf {
        self.item_type().shelf()
    }

    /// Merge a partial update into this item and bump `updated_at`.
    ///
    /// Metadata in the patch must be of the item's own type; an item never
    /// changes type after creation.
    pub fn apply(&mut self, patch: ItemPatch, now: Timestamp) -> Result<(), CoreError> {
        if let Some(metadata) = &patch.metadata {
            if metadata.item_type() != self.item_type() {
                return Err(CoreError::Validation(format!(
                    "cannot attach {} metadata to a {} item",
                    metadata.item_type(),
                    self.item_type()
                )));
            }
        }

        if let Some(v) = patch.external_id {
            self.external_id = Some(v);
        }
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.image {
            self.image = Some(v);
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.progress {
            self.progress = v;
        }
        if let Some(v) = patch.max_progress {
            self.max_progress = Some(v);
        }
        if let Some(v) = patch.rating {
            self.rating = Some(v);
        }
        if let Some(v) = patch.tags {
            self.tags = v;
        }
        if let Some(v) = patch.metadata {
            self.metadata = v;
        }
        self.updated_at = now.max(self.created_at);
        Ok(())
    }
}

/// An item before it has been assigned an identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub external_id: Option<String>,
    pub title: String,
    pub image: Option<String>,
    pub status: ItemStatus,
    pub progress: i64,
    pub max_progress: Option<i64>,
    pub rating: Option<f64>,
    pub tags: Vec<String>,
    pub metadata: ItemMetadata,
}

impl NewItem {
    /// A planned item with zero progress and empty metadata.
    pub fn planned(item_type: ItemType, title: impl Into<String>) -> Self {
        Self {
            external_id: None,
            title: title.into(),
            image: None,
            status: ItemStatus::Planned,
            progress: 0,
            max_progress: None,
            rating: None,
            tags: Vec::new(),
            metadata: ItemMetadata::empty(item_type),
        }
    }

    pub fn item_type(&self) -> ItemType {
        self.metadata.item_type()
    }

    /// Assign identity and timestamps.
    pub fn into_item(self, id: ItemId, now: Timestamp) -> TrackableItem {
        TrackableItem {
            id,
            external_id: self.external_id,
            title: self.title,
            image: self.image,
            status: self.status,
            progress: self.progress,
            max_progress: self.max_progress,
            rating: self.rating,
            tags: self.tags,
            created_at: now,
            updated_at: now,
            metadata: self.metadata,
        }
    }
}

/// Partial update for an item. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub status: Option<ItemStatus>,
    pub progress: Option<i64>,
    pub max_progress: Option<i64>,
    pub rating: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<ItemMetadata>,
}

impl ItemPatch {
    pub fn status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn progress(progress: i64) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

/// Flat JSON shape of an item as written to backups.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    external_id: Option<String>,
    #[serde(rename = "type")]
    item_type: ItemType,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    status: ItemStatus,
    #[serde(default)]
    progress: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_progress: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
    #[serde(default)]
    tags: Vec<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
    #[serde(default)]
    metadata: Value,
}

impl TryFrom<ItemRecord> for TrackableItem {
    type Error = CoreError;

    fn try_from(r: ItemRecord) -> Result<Self, Self::Error> {
        let metadata = ItemMetadata::from_value(r.item_type, r.metadata)?;
        Ok(Self {
            id: r.id,
            external_id: r.external_id,
            title: r.title,
            image: r.image,
            status: r.status,
            progress: r.progress,
            max_progress: r.max_progress,
            rating: r.rating,
            tags: r.tags,
            created_at: r.created_at,
            updated_at: r.updated_at,
            metadata,
        })
    }
}

impl From<TrackableItem> for ItemRecord {
    fn from(item: TrackableItem) -> Self {
        Self {
            id: item.id,
            external_id: item.external_id,
            item_type: item.metadata.item_type(),
            title: item.title,
            image: item.image,
            status: item.status,
            progress: item.progress,
            max_progress: item.max_progress,
            rating: item.rating,
            tags: item.tags,
            created_at: item.created_at,
            updated_at: item.updated_at,
            metadata: item.metadata.to_value(),
        }
    }
}
