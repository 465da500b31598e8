//! The singleton application settings record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Fixed primary key of the settings row.
pub const SETTINGS_ID: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Tr,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    System,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tr => "tr",
            Self::En => "en",
        }
    }
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tr" => Ok(Self::Tr),
            "en" => Ok(Self::En),
            other => Err(CoreError::Validation(format!("unknown language '{other}'"))),
        }
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "system" => Ok(Self::System),
            other => Err(CoreError::Validation(format!("unknown theme '{other}'"))),
        }
    }
}

/// Application settings. Every field is optional; an unset record is the
/// all-`None` default.
///
/// The same type doubles as the partial update for merge-on-write: fields
/// left `None` in an update keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nextcloud_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nextcloud_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nextcloud_password: Option<String>,
}

/// Complete WebDAV credentials, extracted from [`AppSettings`].
#[derive(Clone, PartialEq, Eq)]
pub struct WebDavCredentials {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for WebDavCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AppSettings {
    /// Overlay `update` onto `self`, keeping fields the update leaves unset.
    pub fn merged(mut self, update: AppSettings) -> AppSettings {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.tmdb_api_key, update.tmdb_api_key);
        take(&mut self.last_sync, update.last_sync);
        take(&mut self.language, update.language);
        take(&mut self.theme, update.theme);
        take(&mut self.nextcloud_url, update.nextcloud_url);
        take(&mut self.nextcloud_username, update.nextcloud_username);
        take(&mut self.nextcloud_password, update.nextcloud_password);
        self
    }

    /// The configured WebDAV credentials, or a configuration error if any
    /// of URL, username or password is missing or blank.
    pub fn webdav_credentials(&self) -> Result<WebDavCredentials, CoreError> {
        fn field(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        match (
            field(&self.nextcloud_url),
            field(&self.nextcloud_username),
            field(&self.nextcloud_password),
        ) {
            (Some(url), Some(username), Some(_)) => Ok(WebDavCredentials {
                url: url.to_string(),
                username: username.to_string(),
                // Passwords are used verbatim, including surrounding spaces.
                password: self.nextcloud_password.clone().unwrap_or_default(),
            }),
            _ => Err(CoreError::Configuration(
                "Nextcloud configuration missing".into(),
            )),
        }
    }
}
