//! Mapping of external catalog results into new tracker items.

use serde::Deserialize;

use crate::item::{ItemStatus, NewItem};
use crate::metadata::{BookMetadata, ItemMetadata, MovieMetadata, SeriesMetadata};

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// One hit from the movie database's multi-search or list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: u64,
    /// `movie`, `tv` or `person`.
    #[serde(default)]
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

/// A volume from the book catalog, flattened to the fields the tracker uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookVolume {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub page_count: Option<u32>,
    pub published_date: Option<String>,
    pub publisher: Option<String>,
}

/// Poster URL at list size. Empty paths yield `None`.
pub fn tmdb_image_url(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    Some(format!("{TMDB_IMAGE_BASE}{path}"))
}

impl From<&TmdbSearchResult> for NewItem {
    fn from(r: &TmdbSearchResult) -> Self {
        let title = r
            .title
            .clone()
            .or_else(|| r.name.clone())
            .unwrap_or_else(|| "Unknown Title".to_string());
        let overview = Some(r.overview.clone()).filter(|o| !o.is_empty());
        let released = r.release_date.clone().or_else(|| r.first_air_date.clone());

        let metadata = if r.media_type.as_deref() == Some("tv") {
            ItemMetadata::Series(SeriesMetadata {
                overview,
                release_date: released,
                vote_average: Some(r.vote_average),
                ..SeriesMetadata::default()
            })
        } else {
            ItemMetadata::Movie(MovieMetadata {
                overview,
                release_date: released,
                vote_average: Some(r.vote_average),
                ..MovieMetadata::default()
            })
        };

        NewItem {
            external_id: Some(r.id.to_string()),
            title,
            image: r.poster_path.as_deref().and_then(tmdb_image_url),
            status: ItemStatus::Planned,
            progress: 0,
            max_progress: Some(0),
            rating: None,
            tags: Vec::new(),
            metadata,
        }
    }
}

impl From<&BookVolume> for NewItem {
    fn from(b: &BookVolume) -> Self {
        NewItem {
            external_id: Some(b.id.clone()),
            title: b.title.clone(),
            // The catalog serves plain-http thumbnails.
            image: b.thumbnail.as_ref().map(|t| t.replacen("http:", "https:", 1)),
            status: ItemStatus::Planned,
            progress: 0,
            max_progress: Some(i64::from(b.page_count.unwrap_or(0))),
            rating: None,
            tags: Vec::new(),
            metadata: ItemMetadata::Book(BookMetadata {
                authors: b.authors.clone(),
                publisher: b.publisher.clone(),
                published_date: b.published_date.clone(),
                description: b.description.clone(),
                page_count: b.page_count,
                ..BookMetadata::default()
            }),
        }
    }
}
