//! Type-specific item metadata.
//!
//! Each [`ItemType`] carries its own metadata shape. Provider fields the
//! tracker does not model explicitly are kept in `extra` so that a record read
//! from a backup is written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::item::ItemType;

/// Metadata for a movie, as captured from the movie database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    /// Runtime in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata for a TV series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// First air date. Stored under `release_date` like movies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_seasons: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_episode_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata for a book, as captured from the book catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookMetadata {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata bag of an item, one variant per [`ItemType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ItemMetadata {
    Movie(MovieMetadata),
    Series(SeriesMetadata),
    Book(BookMetadata),
    Fitness(FitnessMetadata),
}

impl ItemMetadata {
    /// Empty metadata for the given item type.
    pub fn empty(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Movie => Self::Movie(MovieMetadata::default()),
            ItemType::Series => Self::Series(SeriesMetadata::default()),
            ItemType::Book => Self::Book(BookMetadata::default()),
            ItemType::Fitness => Self::Fitness(FitnessMetadata::default()),
        }
    }

    /// The item type this metadata belongs to.
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Movie(_) => ItemType::Movie,
            Self::Series(_) => ItemType::Series,
            Self::Book(_) => ItemType::Book,
            Self::Fitness(_) => ItemType::Fitness,
        }
    }

    /// Decode an untyped JSON metadata object for the given item type.
    ///
    /// `null` decodes to empty metadata; any other non-object is rejected.
    pub fn from_value(item_type: ItemType, value: Value) -> Result<Self, CoreError> {
        if value.is_null() {
            return Ok(Self::empty(item_type));
        }
        if !value.is_object() {
            return Err(CoreError::Validation(format!(
                "metadata for {item_type} must be an object"
            )));
        }

        let invalid =
            |e: serde_json::Error| CoreError::Validation(format!("invalid {item_type} metadata: {e}"));

        Ok(match item_type {
            ItemType::Movie => Self::Movie(serde_json::from_value(value).map_err(invalid)?),
            ItemType::Series => Self::Series(serde_json::from_value(value).map_err(invalid)?),
            ItemType::Book => Self::Book(serde_json::from_value(value).map_err(invalid)?),
            ItemType::Fitness => Self::Fitness(serde_json::from_value(value).map_err(invalid)?),
        })
    }

    /// Encode back to the untyped JSON object stored on disk and in backups.
    pub fn to_value(&self) -> Value {
        let encoded = match self {
            Self::Movie(m) => serde_json::to_value(m),
            Self::Series(m) => serde_json::to_value(m),
            Self::Book(m) => serde_json::to_value(m),
            Self::Fitness(m) => serde_json::to_value(m),
        };
        // Plain structs with string keys always serialize.
        encoded.unwrap_or_else(|_| Value::Object(Map::new()))
    }
}
