use nexttracker_core::error::CoreError;

/// Errors from backup export/import and the WebDAV remote.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Missing configuration, an invalid backup payload, or a sync already
    /// in progress.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backup file error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid WebDAV URL '{0}'")]
    InvalidUrl(String),

    #[error("Authentication failed: check the username and app password")]
    Unauthorized,

    #[error("WebDAV path not found: check the server URL")]
    NotFound,

    #[error("Method not allowed: the URL does not point at a WebDAV endpoint")]
    MethodNotAllowed,

    #[error("No backup found")]
    BackupNotFound,

    /// Any other non-2xx status from the remote.
    #[error("WebDAV server error ({status}): {body}")]
    Remote { status: u16, body: String },
}

impl SyncError {
    /// Classify a non-success HTTP status returned by the remote.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            _ => Self::Remote { status, body },
        }
    }
}
