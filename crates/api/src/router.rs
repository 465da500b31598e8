//! Application router assembly.
//!
//! The binary and the integration tests both go through [`build_app_router`],
//! so tests exercise the same layers as production.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowMethods, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::handlers::proxy::TARGET_URL_HEADER;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// WebDAV request headers a browser client sends through the generic proxy.
const DAV_HEADERS: [HeaderName; 3] = [
    HeaderName::from_static("depth"),
    HeaderName::from_static("destination"),
    HeaderName::from_static("overwrite"),
];

/// Build the complete application: `/health`, the `/api` tree and the
/// bundled web client for every other path.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .fallback_service(web_client(config));

    with_middleware(app, config).with_state(state)
}

/// Wrap `app` in the shared layers. Each `layer` call wraps everything
/// before it, so the last one added (CORS) sees requests first and the body
/// limit sits closest to the handlers.
fn with_middleware(app: Router<AppState>, config: &ServerConfig) -> Router<AppState> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    app.layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(trace)
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(build_cors_layer(config))
}

/// Static files from `STATIC_DIR`. Paths without a file get `index.html`
/// with status 200 so deep links reach the client-side router.
fn web_client(config: &ServerConfig) -> ServeDir<ServeFile> {
    let index = config.static_dir.join("index.html");
    ServeDir::new(&config.static_dir).fallback(ServeFile::new(index))
}

/// CORS for the configured origins.
///
/// Methods are mirrored from the preflight so `PROPFIND`, `MKCOL` and the
/// other WebDAV verbs can reach the generic proxy. An invalid origin panics
/// at startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    let mut headers = vec![CONTENT_TYPE, AUTHORIZATION, TARGET_URL_HEADER];
    headers.extend(DAV_HEADERS);

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(headers)
        .expose_headers([REQUEST_ID])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
