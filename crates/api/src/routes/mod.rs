pub mod health;
pub mod items;
pub mod proxy;
pub mod sync;

use axum::extract::OriginalUri;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tmdb/{*path}                    metadata provider proxy (rate limited)
/// /omdb/{imdb_id}                  ratings provider proxy (rate limited)
/// /proxy, /proxy/{*path}           generic forwarding proxy (x-target-url)
///
/// /items                           list, create
/// /items/{id}                      get, update, delete
/// /items/external/{external_id}    lookup by catalog id
/// /items/from-tmdb                 add from a search hit
/// /items/from-book                 add from a book volume
///
/// /settings                        get, merge
/// /backup                          export (GET), import (POST)
/// /sync/status                     sync indicator
/// /sync/push, /sync/pull           Nextcloud backup and restore
/// /sync/test                       Nextcloud connection check
/// ```
///
/// Unknown paths under `/api` answer 404 JSON instead of falling through to
/// the web client.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(proxy::router())
        .nest("/items", items::router())
        .merge(sync::router())
        .fallback(api_not_found)
}

async fn api_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}
