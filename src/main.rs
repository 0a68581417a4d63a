//! Concurrency probe - Main entry point
//!
//! A single-endpoint diagnostic server. `GET|POST /probe` sleeps for a
//! requested number of seconds on a dedicated thread and reports which
//! thread and process handled the request, along with static facts about
//! the host (CPUs, memory, OS). Hitting it concurrently from outside shows
//! whether the hosting substrate runs requests on separate threads or
//! separate processes, and how many at once.

mod config;
mod handler;
mod host;
mod report;

use anyhow::Result;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,concurrency_probe=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting concurrency probe");

    // Load configuration
    let config = AppConfig::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    let state = Arc::new(AppState {
        config: config.clone(),
    });

    let app = handler::build_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Probe listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
