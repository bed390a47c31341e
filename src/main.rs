//! Data Gremlin Server
//!
//! Serves data blocks embedded in stored markdown pages and renders them
//! as tables.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use data_gremlin::config::Config;
use data_gremlin::db::{self, SqliteDocumentStore, SqliteSettingsSource};
use data_gremlin::events::{spawn_cache_invalidator, EventBus};
use data_gremlin::routes::build_router;
use data_gremlin::settings::SettingsSource;
use data_gremlin::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "data_gremlin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting Data Gremlin Server v{}", env!("CARGO_PKG_VERSION"));

    // Initialize database
    let db_pool = db::create_pool(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database initialized at {}", config.database.url);

    let store = Arc::new(SqliteDocumentStore::new(db_pool.clone()));
    let settings_source = Arc::new(SqliteSettingsSource::new(db_pool));
    let events = EventBus::default();

    // Create application state
    let app_state = AppState::new(&config, store, settings_source.clone(), events.clone());
    spawn_cache_invalidator(app_state.cache().clone(), events.subscribe());
    tracing::info!("Block cache TTL: {:?}", app_state.cache().ttl());

    // Route registration reads the settings once
    let settings = settings_source.render_settings().await;
    let app = build_router(app_state, &settings);

    // Start server with graceful shutdown
    let ip = config
        .server
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid SERVER_HOST: {}", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    tracing::info!("Data Gremlin Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
