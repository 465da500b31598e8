//! Route definitions for the item collection, mounted at `/items`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::items;
use crate::state::AppState;

/// ```text
/// GET    /                        -> list_items (?status=)
/// POST   /                        -> create_item
/// GET    /{id}                    -> get_item
/// PATCH  /{id}                    -> update_item (?type=)
/// DELETE /{id}                    -> delete_item
/// GET    /external/{external_id}  -> get_item_by_external_id
/// POST   /from-tmdb               -> create_from_tmdb
/// POST   /from-book               -> create_from_book
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(items::list_items).post(items::create_item))
        .route(
            "/{id}",
            get(items::get_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .route("/external/{external_id}", get(items::get_item_by_external_id))
        .route("/from-tmdb", post(items::create_from_tmdb))
        .route("/from-book", post(items::create_from_book))
}
