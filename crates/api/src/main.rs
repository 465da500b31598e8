use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nexttracker_api::config::ServerConfig;
use nexttracker_api::router::build_app_router;
use nexttracker_api::state::AppState;
use nexttracker_db::DbPool;

const DEFAULT_LOG_FILTER: &str = "nexttracker_api=debug,nexttracker_sync=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        database_url = %config.database_url,
        tmdb_key_set = config.tmdb.api_key.is_some(),
        omdb_key_set = config.omdb.api_key.is_some(),
        static_dir = %config.static_dir.display(),
        "Configuration loaded"
    );

    let pool = open_store(&config.database_url).await;

    let app = build_app_router(AppState::new(pool.clone(), config.clone()), &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    // Peer addresses key the provider rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    pool.close().await;
    tracing::info!("Store closed, bye");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Open the SQLite store and bring its schema up to date. Any failure here
/// aborts start-up.
async fn open_store(database_url: &str) -> DbPool {
    let pool = nexttracker_db::create_pool(database_url)
        .await
        .expect("Failed to open database");

    nexttracker_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    nexttracker_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Store ready");

    pool
}

/// Resolve on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Ctrl-C handler failed");
            }
            tracing::info!("Interrupted, shutting down");
        }
        () = terminate => {
            tracing::info!("Terminated, shutting down");
        }
    }
}
