//! Fixed-window request limiter keyed by client address.
//!
//! Counters live in process memory and reset on restart. Each address gets
//! `max` requests per window; the window opens with the first request and
//! the counter starts over once it has elapsed.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Windows are swept once the map holds more than this many addresses.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    count: u32,
}

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `client` at `now`.
    pub fn check(&self, client: IpAddr, now: Instant) -> Decision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now.saturating_duration_since(w.opened_at) < self.window);
        }

        let window = windows.entry(client).or_insert(Window {
            opened_at: now,
            count: 0,
        });
        if now.saturating_duration_since(window.opened_at) >= self.window {
            *window = Window {
                opened_at: now,
                count: 0,
            };
        }

        if window.count >= self.max {
            let elapsed = now.saturating_duration_since(window.opened_at);
            return Decision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        window.count += 1;
        Decision::Allowed {
            remaining: self.max - window.count,
        }
    }
}

/// Extractor that charges one request against the caller's quota.
///
/// Add it to a handler's parameters to put that route behind the limiter:
///
/// ```ignore
/// async fn my_handler(_quota: ClientQuota) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
///
/// Requests without connection info (e.g. in-process tests without a mock)
/// share a single bucket.
#[derive(Debug, Clone, Copy)]
pub struct ClientQuota {
    pub client: IpAddr,
    pub remaining: u32,
}

impl FromRequestParts<AppState> for ClientQuota {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let client = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        match state.rate_limiter.check(client, Instant::now()) {
            Decision::Allowed { remaining } => Ok(ClientQuota { client, remaining }),
            Decision::Limited { retry_after } => {
                tracing::warn!(%client, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
                Err(AppError::RateLimited { retry_after })
            }
        }
    }
}
