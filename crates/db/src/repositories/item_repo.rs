//! Repository for the `items` table.
//!
//! Screen media and books share one table, partitioned by the generated
//! `shelf` column. Callers never need to know which shelf an item sits on.

use nexttracker_core::item::{ItemPatch, ItemStatus, ItemType, NewItem, Shelf, TrackableItem};
use nexttracker_core::types::{now_millis, ItemId};
use sqlx::types::Json;
use sqlx::{Sqlite, SqlitePool};

use crate::models::decode_error;
use crate::models::item::ItemRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, type, status, title, external_id, image, progress, max_progress, \
                       rating, tags, metadata, created_at, updated_at";

/// Most recently updated first; ties broken deterministically.
const ORDER_BY: &str = "ORDER BY updated_at DESC, created_at DESC, id";

/// Provides CRUD operations for tracked items.
pub struct ItemRepo;

impl ItemRepo {
    /// Every item on both shelves, most recently updated first.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<TrackableItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items {ORDER_BY}");
        let rows = sqlx::query_as::<_, ItemRow>(&query).fetch_all(pool).await?;
        decode_all(rows)
    }

    /// Items with the given status on both shelves, most recently updated first.
    pub async fn list_by_status(
        pool: &SqlitePool,
        status: ItemStatus,
    ) -> Result<Vec<TrackableItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE status = ? {ORDER_BY}");
        let rows = sqlx::query_as::<_, ItemRow>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await?;
        decode_all(rows)
    }

    /// Find an item by id.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: ItemId,
    ) -> Result<Option<TrackableItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = ?");
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?
            .map(decode)
            .transpose()
    }

    /// First item carrying the given catalog id. Screen media wins over books
    /// when both shelves hold a match.
    pub async fn find_by_external_id(
        pool: &SqlitePool,
        external_id: &str,
    ) -> Result<Option<TrackableItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM items WHERE external_id = ? \
             ORDER BY CASE shelf WHEN 'screen' THEN 0 ELSE 1 END, created_at \
             LIMIT 1"
        );
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await?
            .map(decode)
            .transpose()
    }

    /// Oldest item of `item_type` carrying the given catalog id.
    ///
    /// Movie and series ids share one numbering, so duplicate checks must
    /// look within a single type.
    pub async fn find_by_external_id_for_type(
        pool: &SqlitePool,
        external_id: &str,
        item_type: ItemType,
    ) -> Result<Option<TrackableItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM items WHERE external_id = ? AND type = ? \
             ORDER BY created_at LIMIT 1"
        );
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(external_id)
            .bind(item_type.as_str())
            .fetch_optional(pool)
            .await?
            .map(decode)
            .transpose()
    }

    /// Insert a new item with a fresh id and both timestamps set to now.
    ///
    /// No uniqueness check is made on `external_id`; callers that want to
    /// avoid duplicates look the item up first.
    pub async fn create(pool: &SqlitePool, input: NewItem) -> Result<TrackableItem, sqlx::Error> {
        let item = input.into_item(ItemId::new_v4(), now_millis());
        insert(pool, &item).await?;
        tracing::debug!(id = %item.id, item_type = %item.item_type(), "Item created");
        Ok(item)
    }

    /// Merge `patch` into an item and refresh `updated_at`.
    ///
    /// With a type hint the write is restricted to that type's shelf; an id
    /// living on the other shelf is then treated as missing. Returns `None`
    /// if no matching row exists.
    pub async fn update(
        pool: &SqlitePool,
        id: ItemId,
        patch: ItemPatch,
        type_hint: Option<ItemType>,
    ) -> Result<Option<TrackableItem>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row = match type_hint.map(ItemType::shelf) {
            Some(shelf) => {
                let query = format!("SELECT {COLUMNS} FROM items WHERE id = ? AND shelf = ?");
                sqlx::query_as::<_, ItemRow>(&query)
                    .bind(id.to_string())
                    .bind(shelf.as_str())
                    .fetch_optional(&mut *tx)
                    .await?
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM items WHERE id = ?");
                sqlx::query_as::<_, ItemRow>(&query)
                    .bind(id.to_string())
                    .fetch_optional(&mut *tx)
                    .await?
            }
        };

        let Some(row) = row else {
            return Ok(None);
        };

        let mut item = decode(row)?;
        item.apply(patch, now_millis())
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            "UPDATE items SET \
                 status = ?, title = ?, external_id = ?, image = ?, progress = ?, \
                 max_progress = ?, rating = ?, tags = ?, metadata = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(item.status.as_str())
        .bind(&item.title)
        .bind(&item.external_id)
        .bind(&item.image)
        .bind(item.progress)
        .bind(item.max_progress)
        .bind(item.rating)
        .bind(Json(&item.tags))
        .bind(Json(item.metadata.to_value()))
        .bind(item.updated_at)
        .bind(item.id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(item))
    }

    /// Delete an item from whichever shelf holds it.
    ///
    /// Deleting an unknown id is not an error; returns whether a row was removed.
    pub async fn delete(pool: &SqlitePool, id: ItemId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id.to_string())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of items, optionally restricted to one shelf.
    pub async fn count(pool: &SqlitePool, shelf: Option<Shelf>) -> Result<i64, sqlx::Error> {
        match shelf {
            Some(shelf) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE shelf = ?")
                    .bind(shelf.as_str())
                    .fetch_one(pool)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM items")
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Replace every stored item with `items` in a single transaction.
    ///
    /// If any insert fails the transaction is rolled back and the previous
    /// rows remain untouched. Records are written verbatim, keeping their ids
    /// and timestamps.
    pub async fn replace_all(
        pool: &SqlitePool,
        items: &[TrackableItem],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let cleared = sqlx::query("DELETE FROM items").execute(&mut *tx).await?;
        for item in items {
            insert(&mut *tx, item).await?;
        }

        tx.commit().await?;
        tracing::info!(
            cleared = cleared.rows_affected(),
            inserted = items.len(),
            "Items replaced"
        );
        Ok(items.len())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert<'e, E>(executor: E, item: &TrackableItem) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO items \
             (id, type, status, title, external_id, image, progress, max_progress, \
              rating, tags, metadata, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(item.id.to_string())
    .bind(item.item_type().as_str())
    .bind(item.status.as_str())
    .bind(&item.title)
    .bind(&item.external_id)
    .bind(&item.image)
    .bind(item.progress)
    .bind(item.max_progress)
    .bind(item.rating)
    .bind(Json(&item.tags))
    .bind(Json(item.metadata.to_value()))
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

fn decode(row: ItemRow) -> Result<TrackableItem, sqlx::Error> {
    TrackableItem::try_from(row).map_err(decode_error)
}

fn decode_all(rows: Vec<ItemRow>) -> Result<Vec<TrackableItem>, sqlx::Error> {
    rows.into_iter().map(decode).collect()
}
