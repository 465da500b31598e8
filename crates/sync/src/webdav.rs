//! Minimal WebDAV client for the Nextcloud backup file.
//!
//! Covers just the verbs the backup flow needs: `PROPFIND` for listing and
//! existence checks, `MKCOL`, `PUT` and `GET`. Requests carry HTTP basic
//! auth. When a proxy URL is configured, each request is sent to the proxy
//! with the real destination in the `x-target-url` header.

use std::fmt;

use nexttracker_core::settings::WebDavCredentials;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};

use crate::error::SyncError;

/// Header naming the real destination when requests go through the gateway.
pub const TARGET_URL_HEADER: &str = "x-target-url";

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:"><d:prop><d:resourcetype/><d:getlastmodified/></d:prop></d:propfind>"#;

/// HTTP client bound to one WebDAV root.
pub struct WebDavClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    proxy_url: Option<String>,
}

impl fmt::Debug for WebDavClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("proxy_url", &self.proxy_url)
            .finish_non_exhaustive()
    }
}

impl WebDavClient {
    /// Create a client for the root named in `credentials`.
    ///
    /// Fails with [`SyncError::InvalidUrl`] unless the URL is absolute
    /// `http` or `https`.
    pub fn new(client: reqwest::Client, credentials: &WebDavCredentials) -> Result<Self, SyncError> {
        let parsed = reqwest::Url::parse(&credentials.url)
            .map_err(|_| SyncError::InvalidUrl(credentials.url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SyncError::InvalidUrl(credentials.url.clone()));
        }

        Ok(Self {
            client,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            proxy_url: None,
        })
    }

    /// Route every request through a forwarding proxy.
    pub fn via_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// `PROPFIND` with `Depth: 1`; returns the raw multistatus XML.
    pub async fn list_directory(&self, path: &str) -> Result<String, SyncError> {
        let response = self.propfind(path, "1").await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.text().await?)
    }

    /// Whether a file or collection exists at `path`.
    pub async fn exists(&self, path: &str) -> Result<bool, SyncError> {
        let response = self.propfind(path, "0").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::ensure_success(response).await?;
        Ok(true)
    }

    pub async fn create_directory(&self, path: &str) -> Result<(), SyncError> {
        let response = self.request(dav_method(b"MKCOL")?, path).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Create the collection at `path` unless it already exists.
    pub async fn ensure_directory(&self, path: &str) -> Result<(), SyncError> {
        if self.exists(path).await? {
            return Ok(());
        }
        tracing::debug!(path, "Creating WebDAV collection");
        self.create_directory(path).await
    }

    /// Upload `contents`, overwriting any existing file.
    pub async fn put_file(&self, path: &str, contents: String) -> Result<(), SyncError> {
        let response = self
            .request(Method::PUT, path)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(contents)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    pub async fn get_file(&self, path: &str) -> Result<String, SyncError> {
        let response = self.request(Method::GET, path).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.text().await?)
    }

    // ---- private helpers ----

    async fn propfind(&self, path: &str, depth: &'static str) -> Result<Response, SyncError> {
        Ok(self
            .request(dav_method(b"PROPFIND")?, path)
            .header("Depth", depth)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
            .body(PROPFIND_BODY)
            .send()
            .await?)
    }

    fn target_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let target = self.target_url(path);
        let builder = match &self.proxy_url {
            Some(proxy) => self
                .client
                .request(method, proxy.as_str())
                .header(TARGET_URL_HEADER, target),
            None => self.client.request(method, target),
        };
        builder.basic_auth(&self.username, Some(&self.password))
    }

    /// Return the response unchanged on a 2xx status, otherwise classify the
    /// failure with [`SyncError::from_status`].
    async fn ensure_success(response: Response) -> Result<Response, SyncError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SyncError::from_status(status.as_u16(), body));
        }
        Ok(response)
    }
}

fn dav_method(name: &'static [u8]) -> Result<Method, SyncError> {
    Method::from_bytes(name).map_err(|e| SyncError::Remote {
        status: 0,
        body: e.to_string(),
    })
}
