//! The single request forwarder behind every proxy route.
//!
//! A [`ForwardPolicy`] decides where a request goes ([`Rewrite`]), which
//! inbound headers travel with it ([`HeaderPolicy`]), and how the upstream
//! answer is relayed back ([`Relay`]).

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, HeaderName, Method};
use axum::response::{IntoResponse, Response};
use reqwest::Url;

use crate::error::AppError;

/// Headers that describe a single connection and are never forwarded in
/// either direction.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Headers the generic proxy drops: the routing header itself plus the
/// browser session state that must not leak to the destination.
pub const GENERIC_STRIP: &[&str] = &["host", "x-target-url", "cookie", "origin", "referer"];

/// The only inbound headers a metadata provider sees.
pub const PROVIDER_HEADERS: &[&str] = &["accept", "content-type"];

/// Where a request is sent.
#[derive(Debug, Clone)]
pub enum Rewrite {
    /// Append the inbound sub-path to `base`, keep the inbound query and set
    /// each of `params`, replacing any value the caller supplied.
    Prefix {
        base: String,
        params: Vec<(&'static str, String)>,
    },
    /// Send to the absolute `http(s)` URL carried in this request header.
    TargetHeader(HeaderName),
}

/// Which inbound headers accompany the forwarded request.
#[derive(Debug, Clone, Copy)]
pub enum HeaderPolicy {
    /// Send only these inbound headers.
    Allow(&'static [&'static str]),
    /// Send every inbound header except these and the hop-by-hop set.
    ForwardExcept(&'static [&'static str]),
}

/// How the upstream response reaches the caller.
#[derive(Debug, Clone, Copy)]
pub enum Relay {
    /// Upstream status with the body re-emitted as JSON. A body that is not
    /// JSON counts as a failed upstream call.
    Json,
    /// Upstream status, headers and body byte for byte.
    Verbatim,
}

#[derive(Debug, Clone)]
pub struct ForwardPolicy {
    pub rewrite: Rewrite,
    pub headers: HeaderPolicy,
    pub relay: Relay,
    /// Error text sent when the upstream call fails. `None` reports the
    /// underlying error.
    pub failure_message: Option<&'static str>,
}

/// The parts of an inbound request the forwarder needs.
#[derive(Debug)]
pub struct Inbound {
    pub method: Method,
    pub headers: HeaderMap,
    /// Path below the route prefix, without a leading slash.
    pub sub_path: String,
    pub query: Option<String>,
    pub body: Bytes,
}

impl ForwardPolicy {
    /// Resolve the destination URL for `inbound`.
    pub fn destination(&self, inbound: &Inbound) -> Result<Url, AppError> {
        match &self.rewrite {
            Rewrite::Prefix { base, params } => {
                let raw = format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    inbound.sub_path.trim_start_matches('/')
                );
                let mut url = Url::parse(&raw)
                    .map_err(|e| AppError::BadRequest(format!("Invalid upstream path: {e}")))?;

                url.set_query(inbound.query.as_deref());
                let kept: Vec<(String, String)> = url
                    .query_pairs()
                    .filter(|(k, _)| !params.iter().any(|(p, _)| k == *p))
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                {
                    let mut pairs = url.query_pairs_mut();
                    pairs.clear();
                    for (k, v) in &kept {
                        pairs.append_pair(k, v);
                    }
                    for (k, v) in params {
                        pairs.append_pair(k, v);
                    }
                }
                Ok(url)
            }
            Rewrite::TargetHeader(name) => {
                let value = inbound
                    .headers
                    .get(name)
                    .ok_or_else(|| AppError::BadRequest(format!("Missing {name} header")))?;
                let url = value
                    .to_str()
                    .ok()
                    .and_then(|v| Url::parse(v).ok())
                    .filter(|u| matches!(u.scheme(), "http" | "https"))
                    .ok_or_else(|| {
                        AppError::BadRequest(format!(
                            "Invalid {name} header: expected an absolute http(s) URL"
                        ))
                    })?;
                Ok(url)
            }
        }
    }
}

/// Forward `inbound` according to `policy` and relay the answer.
///
/// Destination errors are reported before any network call is made.
pub async fn forward(
    client: &reqwest::Client,
    policy: &ForwardPolicy,
    inbound: Inbound,
) -> Result<Response, AppError> {
    let target = policy.destination(&inbound)?;
    let carries_body = !matches!(inbound.method, Method::GET | Method::HEAD | Method::DELETE);

    let mut headers: HeaderMap = match policy.headers {
        HeaderPolicy::Allow(allowed) => inbound
            .headers
            .iter()
            .filter(|(name, _)| allowed.iter().any(|a| a.eq_ignore_ascii_case(name.as_str())))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        HeaderPolicy::ForwardExcept(strip) => filter_headers(&inbound.headers, strip),
    };
    // The outbound length is set from the body actually sent.
    headers.remove(CONTENT_LENGTH);

    let mut request = client
        .request(inbound.method.clone(), target.clone())
        .headers(headers);
    if carries_body {
        request = request.body(inbound.body);
    }

    tracing::debug!(
        method = %inbound.method,
        host = target.host_str().unwrap_or(""),
        "Forwarding request"
    );

    let failure = |e: reqwest::Error| {
        tracing::warn!(
            error = %e,
            host = target.host_str().unwrap_or(""),
            "Forwarded request failed"
        );
        AppError::Upstream(
            policy
                .failure_message
                .map(str::to_string)
                .unwrap_or_else(|| e.to_string()),
        )
    };

    let upstream = request.send().await.map_err(failure)?;
    let status = upstream.status();

    match policy.relay {
        Relay::Json => {
            let body: serde_json::Value = upstream.json().await.map_err(failure)?;
            Ok((status, axum::Json(body)).into_response())
        }
        Relay::Verbatim => {
            let headers = filter_headers(upstream.headers(), &[CONTENT_LENGTH.as_str()]);
            let bytes = upstream.bytes().await.map_err(failure)?;
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            Ok(response)
        }
    }
}

/// Copy `headers`, dropping hop-by-hop headers and everything in `strip`.
fn filter_headers(headers: &HeaderMap, strip: &[&str]) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| {
            let name = name.as_str();
            !HOP_BY_HOP.contains(&name) && !strip.iter().any(|s| s.eq_ignore_ascii_case(name))
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
