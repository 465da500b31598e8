//! Request middleware.
//!
//! - [`rate_limit::ClientQuota`] -- Fixed-window per-address limiter for the
//!   provider proxies, applied as an extractor.

pub mod rate_limit;
