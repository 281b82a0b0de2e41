mod app;
mod dto;
mod error;
mod handlers;
mod services;
mod state;

use std::sync::Arc;

use anyhow::Result;
use leakage_config::Settings;
use leakage_storage::Storage;
use tracing::info;

use crate::services::model::load_model;
use crate::state::ServerState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    info!("Prediction API Starting.....");

    let settings = Settings::from_env()?;

    let model = load_model(&settings, &Storage::from_env()).await?;
    info!("Serving model version {}", model.version());

    let (host, port) = settings.bind_target();
    info!("Starting server on {}:{}", host, port);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;

    let state = Arc::new(ServerState::new(model, settings));
    let app = app::router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Prediction API shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
