//! Application setup and initialization
//!
//! Initialization logic lives here instead of main.rs so integration tests
//! can build the full router against a test configuration.

pub mod routes;
pub mod server;
pub mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};

use fotogate_core::Config;
use fotogate_storage::create_storage;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    telemetry::init_telemetry();

    tracing::info!(
        backend = %config.storage_backend,
        environment = %config.environment,
        "Configuration loaded and validated"
    );

    let storage = create_storage(&config)
        .await
        .context("Storage backend initialization failed")?;

    let state = Arc::new(AppState::new(config, storage));
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
