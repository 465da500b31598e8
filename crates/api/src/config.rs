use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Provider keys
/// have no default: the matching proxy answers 500 until one is set.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// SQLite database URL (default: `sqlite://nexttracker.db`).
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body, in bytes (default: 10 MiB).
    pub max_body_bytes: usize,
    pub tmdb: ProviderConfig,
    pub omdb: ProviderConfig,
    /// Requests allowed per client address and window on the provider proxies.
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    /// Directory holding the bundled web client.
    pub static_dir: PathBuf,
}

/// Credentials and location of one metadata provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Secret key injected into every upstream request. `None` when unset
    /// or blank.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Locale passed upstream, when the provider takes one.
    pub language: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                      |
    /// |--------------------------|------------------------------|
    /// | `HOST`                   | `0.0.0.0`                    |
    /// | `PORT`                   | `3000`                       |
    /// | `DATABASE_URL`           | `sqlite://nexttracker.db`    |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`      |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                         |
    /// | `MAX_BODY_BYTES`         | `10485760`                   |
    /// | `TMDB_API_KEY`           | unset                        |
    /// | `TMDB_BASE_URL`          | `https://api.themoviedb.org` |
    /// | `TMDB_LANGUAGE`          | `tr-TR`                      |
    /// | `OMDB_API_KEY`           | unset                        |
    /// | `OMDB_BASE_URL`          | `http://www.omdbapi.com`     |
    /// | `RATE_LIMIT_MAX`         | `100`                        |
    /// | `RATE_LIMIT_WINDOW_SECS` | `900`                        |
    /// | `STATIC_DIR`             | `dist`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://nexttracker.db".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| "10485760".into())
            .parse()
            .expect("MAX_BODY_BYTES must be a valid usize");

        let tmdb = ProviderConfig {
            api_key: secret("TMDB_API_KEY"),
            base_url: std::env::var("TMDB_BASE_URL")
                .unwrap_or_else(|_| "https://api.themoviedb.org".into()),
            language: Some(std::env::var("TMDB_LANGUAGE").unwrap_or_else(|_| "tr-TR".into())),
        };

        let omdb = ProviderConfig {
            api_key: secret("OMDB_API_KEY"),
            base_url: std::env::var("OMDB_BASE_URL")
                .unwrap_or_else(|_| "http://www.omdbapi.com".into()),
            language: None,
        };

        let rate_limit_max: u32 = std::env::var("RATE_LIMIT_MAX")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("RATE_LIMIT_MAX must be a valid u32");

        let rate_limit_window_secs: u64 = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "900".into())
            .parse()
            .expect("RATE_LIMIT_WINDOW_SECS must be a valid u64");

        let static_dir = std::env::var("STATIC_DIR")
            .unwrap_or_else(|_| "dist".into())
            .into();

        Self {
            host,
            port,
            database_url,
            cors_origins,
            request_timeout_secs,
            max_body_bytes,
            tmdb,
            omdb,
            rate_limit_max,
            rate_limit_window_secs,
            static_dir,
        }
    }
}

/// A trimmed, non-empty secret from the environment.
fn secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
