use std::sync::Arc;

use nexttracker_sync::SyncService;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and `reqwest::Client` are handles, the rest is
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: nexttracker_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Outbound client shared by every proxy route.
    pub http: reqwest::Client,
    /// Fixed-window counters for the provider proxies.
    pub rate_limiter: Arc<RateLimiter>,
    pub sync: Arc<SyncService>,
}

impl AppState {
    pub fn new(pool: nexttracker_db::DbPool, config: ServerConfig) -> Self {
        let rate_limiter = RateLimiter::new(
            config.rate_limit_max,
            std::time::Duration::from_secs(config.rate_limit_window_secs),
        );

        Self {
            sync: Arc::new(SyncService::new(pool.clone())),
            pool,
            config: Arc::new(config),
            http: reqwest::Client::new(),
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}
