// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! INSEE Geo Finder API Server
//!
//! Search French territories in the INSEE catalog, resolve their boundaries
//! and serve an interactive map with indicators and a chat assistant.

use insee_geo_finder::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting INSEE Geo Finder");

    if config.insee_api_key.is_none() {
        tracing::warn!("INSEE_API_KEY not set: catalog search will be unavailable");
    }
    if config.llm_api_key.is_none() {
        tracing::warn!("LLM_API_KEY not set: chat answers will report the missing key");
    }

    let state = Arc::new(AppState::new(config.clone()));
    tracing::info!(
        sources = ?state.boundary_resolver.source_names(),
        "Boundary resolver initialized"
    );

    // Build router
    let app = insee_geo_finder::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("insee_geo_finder=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
