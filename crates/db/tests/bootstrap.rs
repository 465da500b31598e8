//! Schema bootstrap and upgrade tests.

use std::borrow::Cow;

use nexttracker_core::item::{ItemType, Shelf};
use nexttracker_db::repositories::ItemRepo;
use sqlx::SqlitePool;

/// Connect, migrate, verify the tables and indexes exist.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: SqlitePool) {
    nexttracker_db::health_check(&pool).await.unwrap();

    for table in ["items", "settings"] {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1, "table {table} should exist");
    }

    let indexes: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'items' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
        "idx_items_external_id",
        "idx_items_shelf",
        "idx_items_status",
        "idx_items_title",
        "idx_items_type",
        "idx_items_updated_at",
    ] {
        assert!(
            indexes.iter().any(|i| i == expected),
            "missing index {expected}, found {indexes:?}"
        );
    }
}

/// Running migrations twice is a no-op.
#[sqlx::test(migrations = "./migrations")]
async fn test_migrations_are_idempotent(pool: SqlitePool) {
    nexttracker_db::run_migrations(&pool).await.unwrap();
    nexttracker_db::run_migrations(&pool).await.unwrap();
}

/// A database created with the first schema version keeps its rows when the
/// remaining migrations are applied, and the rows land on the right shelf.
#[sqlx::test(migrations = false)]
async fn test_upgrade_from_first_schema_keeps_rows(pool: SqlitePool) {
    let mut first = sqlx::migrate!("./migrations");
    first.migrations = Cow::Owned(first.migrations[..1].to_vec());
    first.run(&pool).await.unwrap();

    sqlx::query(
        "INSERT INTO items (id, type, status, title, external_id, progress, tags, metadata, created_at, updated_at) \
         VALUES \
         ('0b6c7c1e-3f0a-4f43-9d7e-5d1f0e0c9a01', 'movie', 'completed', 'Alien', '348', 1, '[]', '{}', 10, 20), \
         ('0b6c7c1e-3f0a-4f43-9d7e-5d1f0e0c9a02', 'book', 'planned', 'Solaris', 'abc', 0, '[\"lem\"]', '{\"authors\":[\"Stanislaw Lem\"]}', 30, 40)",
    )
    .execute(&pool)
    .await
    .unwrap();

    nexttracker_db::run_migrations(&pool).await.unwrap();

    let items = ItemRepo::list_all(&pool).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Solaris");
    assert_eq!(items[0].item_type(), ItemType::Book);
    assert_eq!(items[0].tags, vec!["lem".to_string()]);
    assert_eq!(items[1].rating, None);

    assert_eq!(ItemRepo::count(&pool, Some(Shelf::Books)).await.unwrap(), 1);
    assert_eq!(ItemRepo::count(&pool, Some(Shelf::Screen)).await.unwrap(), 1);
}
