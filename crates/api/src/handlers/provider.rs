//! Metadata provider proxies.
//!
//! The browser never sees the provider keys: each handler injects the
//! server-held key into the upstream query string and relays the JSON
//! answer with the upstream status. Both routes are rate limited per client
//! address through [`ClientQuota`].

use axum::body::Bytes;
use axum::extract::{OriginalUri, Path, RawQuery, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use nexttracker_core::error::CoreError;

use crate::config::ProviderConfig;
use crate::error::AppResult;
use crate::forward::{forward, ForwardPolicy, HeaderPolicy, Inbound, Relay, Rewrite, PROVIDER_HEADERS};
use crate::middleware::rate_limit::ClientQuota;
use crate::state::AppState;

/// Route segment the TMDB sub-path follows.
const TMDB_MOUNT: &str = "/tmdb/";

/// GET|POST /api/tmdb/{*path}
///
/// Forwards to `{TMDB_BASE_URL}/3/{path}` with `api_key` and `language` set.
pub async fn tmdb(
    _quota: ClientQuota,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let provider = &state.config.tmdb;
    let api_key = require_key(provider, "TMDB_API_KEY")?;
    let path = raw_sub_path(&uri, TMDB_MOUNT);

    let mut params = vec![("api_key", api_key)];
    if let Some(language) = &provider.language {
        params.push(("language", language.clone()));
    }

    tracing::info!(%method, path = %path, "TMDB proxy");

    let policy = ForwardPolicy {
        rewrite: Rewrite::Prefix {
            base: format!("{}/3", provider.base_url.trim_end_matches('/')),
            params,
        },
        headers: HeaderPolicy::Allow(PROVIDER_HEADERS),
        relay: Relay::Json,
        failure_message: Some("TMDB Connection Failed"),
    };
    let inbound = Inbound {
        method,
        headers,
        sub_path: path,
        query,
        body,
    };

    forward(&state.http, &policy, inbound).await
}

/// GET /api/omdb/{imdb_id}
///
/// Forwards to `{OMDB_BASE_URL}/?i={imdb_id}&apikey=...&plot=short`.
pub async fn omdb(
    _quota: ClientQuota,
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> AppResult<Response> {
    let provider = &state.config.omdb;
    let api_key = require_key(provider, "OMDB_API_KEY")?;

    tracing::info!(imdb_id = %imdb_id, "OMDb proxy");

    let policy = ForwardPolicy {
        rewrite: Rewrite::Prefix {
            base: provider.base_url.clone(),
            params: vec![("i", imdb_id), ("apikey", api_key), ("plot", "short".into())],
        },
        headers: HeaderPolicy::Allow(&[]),
        relay: Relay::Json,
        failure_message: Some("OMDb Connection Failed"),
    };
    let inbound = Inbound {
        method: Method::GET,
        headers: HeaderMap::new(),
        sub_path: String::new(),
        query: None,
        body: Bytes::new(),
    };

    forward(&state.http, &policy, inbound).await
}

/// The still percent-encoded path after `mount`, so an encoded `%3F` or `%2F`
/// reaches the provider unchanged.
fn raw_sub_path(uri: &Uri, mount: &str) -> String {
    uri.path()
        .split_once(mount)
        .map(|(_, rest)| rest.to_string())
        .unwrap_or_default()
}

fn require_key(provider: &ProviderConfig, name: &str) -> Result<String, CoreError> {
    provider.api_key.clone().ok_or_else(|| {
        tracing::error!(key = name, "Provider API key missing");
        CoreError::Configuration(format!("{name} is not set"))
    })
}
