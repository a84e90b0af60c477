//! Configuration validation
//!
//! Checks run at startup, after tracing is up so warnings are visible.

use anyhow::Result;
use avatar_core::Config;

/// Validate configuration before anything is built from it.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.storage().is_partially_configured_for_azure() {
        tracing::warn!(
            "Only one of AZURE_STORAGE_CONNECTION_STRING and AZURE_STORAGE_CONTAINER is set - \
            falling back to local storage"
        );
    }

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins in production");
    }

    if config.cors_origins().is_empty() {
        return Err(anyhow::anyhow!(
            "CORS_ORIGINS must list at least one origin or '*'"
        ));
    }

    Ok(())
}
