//! Handlers for the tracked item collection.
//!
//! Items of every type share one collection; the optional `?type=` hint on
//! writes restricts the lookup to that type's shelf.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use nexttracker_core::catalog::{BookVolume, TmdbSearchResult};
use nexttracker_core::error::CoreError;
use nexttracker_core::item::{ItemPatch, ItemStatus, ItemType, NewItem, TrackableItem};
use nexttracker_core::metadata::ItemMetadata;
use nexttracker_core::types::ItemId;
use nexttracker_db::repositories::ItemRepo;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /api/items`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub external_id: Option<String>,
    pub image: Option<String>,
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub progress: i64,
    pub max_progress: Option<i64>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Typed by `type`; `null` or absent means empty metadata.
    #[serde(default)]
    pub metadata: Value,
}

/// Body of `PATCH /api/items/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub status: Option<ItemStatus>,
    pub progress: Option<i64>,
    pub max_progress: Option<i64>,
    pub rating: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ItemListParams {
    pub status: Option<ItemStatus>,
}

/// `?type=` hint naming the shelf an item lives on.
#[derive(Debug, Deserialize)]
pub struct TypeHint {
    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,
}

impl CreateItemRequest {
    fn into_new_item(self) -> Result<NewItem, CoreError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        validate_rating(self.rating)?;

        Ok(NewItem {
            external_id: self.external_id,
            title: title.to_string(),
            image: self.image,
            status: self.status.unwrap_or(ItemStatus::Planned),
            progress: self.progress,
            max_progress: self.max_progress,
            rating: self.rating,
            tags: self.tags,
            metadata: ItemMetadata::from_value(self.item_type, self.metadata)?,
        })
    }
}

fn validate_rating(rating: Option<f64>) -> Result<(), CoreError> {
    match rating {
        Some(r) if !(0.0..=10.0).contains(&r) => Err(CoreError::Validation(format!(
            "rating must be between 0 and 10, got {r}"
        ))),
        _ => Ok(()),
    }
}

fn not_found(id: ItemId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Item",
        id: id.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// GET /api/items
///
/// Every item, most recently updated first, optionally filtered by `?status=`.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemListParams>,
) -> AppResult<impl IntoResponse> {
    let items = match params.status {
        Some(status) => ItemRepo::list_by_status(&state.pool, status).await?,
        None => ItemRepo::list_all(&state.pool).await?,
    };

    Ok(Json(DataResponse { data: items }))
}

/// POST /api/items
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItemRequest>,
) -> AppResult<impl IntoResponse> {
    let item = ItemRepo::create(&state.pool, input.into_new_item()?).await?;

    tracing::info!(id = %item.id, item_type = %item.item_type(), "Item created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

// ---------------------------------------------------------------------------
// Single item
// ---------------------------------------------------------------------------

/// GET /api/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<impl IntoResponse> {
    let item = ItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse { data: item }))
}

/// GET /api/items/external/{external_id}
///
/// First item carrying a catalog id; movies and series win over books.
pub async fn get_item_by_external_id(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let item = ItemRepo::find_by_external_id(&state.pool, &external_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Item",
                id: external_id.clone(),
            })
        })?;

    Ok(Json(DataResponse { data: item }))
}

/// PATCH /api/items/{id}?type=
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Query(hint): Query<TypeHint>,
    Json(input): Json<UpdateItemRequest>,
) -> AppResult<impl IntoResponse> {
    validate_rating(input.rating)?;

    // Raw metadata is typed by the hint, or by the stored item without one.
    let metadata = match input.metadata {
        Some(value) => {
            let item_type = match hint.item_type {
                Some(t) => t,
                None => ItemRepo::find_by_id(&state.pool, id)
                    .await?
                    .ok_or_else(|| not_found(id))?
                    .item_type(),
            };
            Some(ItemMetadata::from_value(item_type, value)?)
        }
        None => None,
    };

    let patch = ItemPatch {
        external_id: input.external_id,
        title: input.title,
        image: input.image,
        status: input.status,
        progress: input.progress,
        max_progress: input.max_progress,
        rating: input.rating,
        tags: input.tags,
        metadata,
    };

    let item = ItemRepo::update(&state.pool, id, patch, hint.item_type)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(%id, "Item updated");

    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/items/{id}
///
/// Idempotent: deleting an unknown id also answers 204.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<impl IntoResponse> {
    let removed = ItemRepo::delete(&state.pool, id).await?;

    tracing::info!(%id, removed, "Item deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Catalog imports
// ---------------------------------------------------------------------------

/// POST /api/items/from-tmdb
///
/// Add a movie or series from a search hit. Answers 409 if an item of the
/// same type already carries the hit's id.
pub async fn create_from_tmdb(
    State(state): State<AppState>,
    Json(hit): Json<TmdbSearchResult>,
) -> AppResult<impl IntoResponse> {
    create_unless_tracked(&state, NewItem::from(&hit)).await
}

/// POST /api/items/from-book
pub async fn create_from_book(
    State(state): State<AppState>,
    Json(volume): Json<BookVolume>,
) -> AppResult<impl IntoResponse> {
    create_unless_tracked(&state, NewItem::from(&volume)).await
}

async fn create_unless_tracked(
    state: &AppState,
    new_item: NewItem,
) -> AppResult<(StatusCode, Json<DataResponse<TrackableItem>>)> {
    if let Some(external_id) = &new_item.external_id {
        let existing =
            ItemRepo::find_by_external_id_for_type(&state.pool, external_id, new_item.item_type())
                .await?;
        if existing.is_some() {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "{} {external_id} is already tracked",
                new_item.item_type()
            ))));
        }
    }

    let item = ItemRepo::create(&state.pool, new_item).await?;
    tracing::info!(id = %item.id, item_type = %item.item_type(), "Item added from catalog");

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}
