//! Route definitions for the provider and generic proxies.

use axum::routing::{any, get};
use axum::Router;

use crate::handlers::{provider, proxy};
use crate::state::AppState;

/// ```text
/// GET|POST /tmdb/{*path}      -> provider::tmdb   (rate limited)
/// GET      /omdb/{imdb_id}    -> provider::omdb   (rate limited)
/// ANY      /proxy             -> proxy::forward_to_target
/// ANY      /proxy/{*path}     -> proxy::forward_to_target
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tmdb/{*path}", get(provider::tmdb).post(provider::tmdb))
        .route("/omdb/{imdb_id}", get(provider::omdb))
        .route("/proxy", any(proxy::forward_to_target))
        .route("/proxy/{*path}", any(proxy::forward_to_target))
}
