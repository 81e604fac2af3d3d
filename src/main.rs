// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interview-Prep API Server
//!
//! Scores mock interviews with a generative model and serves feedback and
//! leaderboard data to the web frontend.

use interview_prep::{config::Config, db::FirestoreDb, services::GeminiClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Interview-Prep API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    // Initialize scoring client
    let scorer = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    tracing::info!(model = %scorer.model(), "Scoring client initialized");

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(db),
        Arc::new(scorer),
    ));

    // Build router
    let app = interview_prep::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("interview_prep=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
