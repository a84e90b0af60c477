//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded `Config` to a served router.

pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use avatar_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(AppState, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format())?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::error::set_production_mode(config.is_production());

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config)?;
    let state = AppState::new(config, storage);
    let router = routes::build_router(state.clone())?;

    Ok((state, router))
}
