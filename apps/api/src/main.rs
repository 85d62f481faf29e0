mod compose;
mod config;
mod errors;
mod extract;
mod llm_client;
mod optimizer;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::AnthropicClient;
use crate::optimizer::RequestOrchestrator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ApplyIQ API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM transport and the orchestrator that drives it
    let client = AnthropicClient::new(config.anthropic_api_key.clone())
        .context("Failed to build Anthropic HTTP client")?;
    let optimizer = &config.optimizer;
    info!(
        primary = %optimizer.primary.model_id,
        fallback = optimizer.fallback.as_ref().map(|m| m.model_id.as_str()).unwrap_or("none"),
        max_retries = optimizer.retry.max_retries,
        "LLM client initialized"
    );
    let orchestrator = RequestOrchestrator::new(Arc::new(client), optimizer.clone());

    let state = AppState::new(orchestrator, config.layout.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
