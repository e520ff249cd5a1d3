mod routes;

use crate::{
    config::Config,
    media::{MediaService, YtDlpGateway},
};
use anyhow::{Context, Result};
use routes::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub async fn run(config: Config) -> Result<()> {
    let gateway = YtDlpGateway::new(&config.extractor.binary, config.extractor.timeout());
    let media = MediaService::new(Arc::new(gateway), config.download.temp_root());

    if let Err(e) = media.test_setup().await {
        warn!("Media extractor test failed: {}", e);
    }

    let state = AppState {
        media: Arc::new(media),
    };
    let cors = routes::cors_layer(&config.server.allowed_origins)?;
    let app = routes::router(state, cors);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!("API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
