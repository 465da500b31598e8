//! Generic forwarding proxy for WebDAV traffic.
//!
//! The caller names the real destination in `x-target-url`; method, headers
//! (minus [`GENERIC_STRIP`] and hop-by-hop headers) and body go there
//! unchanged, and the destination's status, headers and body come back
//! verbatim. WebDAV verbs such as `PROPFIND` and `MKCOL` pass through opaquely.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, Method};
use axum::response::Response;

use crate::error::AppResult;
use crate::forward::{forward, ForwardPolicy, HeaderPolicy, Inbound, Relay, Rewrite, GENERIC_STRIP};
use crate::state::AppState;

pub const TARGET_URL_HEADER: HeaderName = HeaderName::from_static("x-target-url");

/// ANY /api/proxy, ANY /api/proxy/{*path}
pub async fn forward_to_target(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let policy = ForwardPolicy {
        rewrite: Rewrite::TargetHeader(TARGET_URL_HEADER),
        headers: HeaderPolicy::ForwardExcept(GENERIC_STRIP),
        relay: Relay::Verbatim,
        failure_message: None,
    };
    let inbound = Inbound {
        method,
        headers,
        sub_path: String::new(),
        query: None,
        body,
    };

    let response = forward(&state.http, &policy, inbound).await?;
    tracing::debug!(status = %response.status(), "Proxied request relayed");
    Ok(response)
}
