use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coverscout_core::{
    load_config, validate_config, CoverFinder, GameDbSource, SteamGridDbSource, SteamSource,
};

use coverscout_server::api::create_router;
use coverscout_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("COVERSCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    let sources = &config.sources;

    // Build the two always-on search branches
    let gamedb = GameDbSource::new(
        sources.gamedb.clone(),
        sources.proxy.clone(),
        sources.timeout_secs,
    )
    .context("Failed to create GameDB source")?;

    let steam = SteamSource::new(sources.steam.clone(), sources.timeout_secs)
        .context("Failed to create Steam source")?;

    let finder = Arc::new(CoverFinder::new(
        Arc::new(gamedb),
        Arc::new(steam),
        sources.max_results,
    ));
    info!("Cover finder initialized");

    // SteamGridDB is optional; the grids endpoint stays 503 without it
    let griddb = match &sources.steamgriddb {
        Some(sgdb_config) => {
            info!("Initializing SteamGridDB source");
            let source = SteamGridDbSource::new(
                sgdb_config.clone(),
                sources.proxy.clone(),
                sources.timeout_secs,
            )
            .context("Failed to create SteamGridDB source")?;
            Some(Arc::new(source))
        }
        None => {
            info!("SteamGridDB not configured");
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), finder, griddb));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
