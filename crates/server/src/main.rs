//! HTTP server for movie recommendations.
//!
//! Loads the trained artifacts once at startup and serves lookups until
//! interrupted. Configuration comes from the environment (see `ServerConfig`).

use anyhow::{Context, Result};
use tracing::info;

use pipeline::load_artifacts;
use server::{AppState, RecommendationService, ServerConfig, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!("Starting movie recommendation server with {:?}", config);

    info!("Loading artifacts from {}...", config.artifact_dir.display());
    let (table, similarity) = load_artifacts(&config.artifact_dir)
        .with_context(|| format!("Failed to load artifacts from {}", config.artifact_dir.display()))?;
    let service = RecommendationService::new(table, similarity)
        .context("Movie table and similarity matrix do not match")?;
    info!("Loaded {} movies", service.movies_count());

    let state = AppState::new(service).with_top_k(config.top_k);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    info!("Server running on http://{}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
