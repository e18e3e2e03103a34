// SPDX-License-Identifier: MIT

//! Teamdir API Server
//!
//! Serves the OTP login endpoints and session bookkeeping for the team
//! directory frontend.

use teamdir::{config::Config, services::Mailer, store::AuthStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Teamdir API");

    // The shared auth store is the system of record for identities,
    // challenges, and session sets.
    let store = AuthStore::new();

    let mailer = Mailer::new(&config);
    tracing::info!(api = %config.mail_api_url, "Mailer initialized");

    let port = config.port;
    let state = Arc::new(AppState::new(config, store, mailer));

    // Build router
    let app = teamdir::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("teamdir=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
