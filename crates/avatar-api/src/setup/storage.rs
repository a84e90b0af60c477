//! Storage setup and initialization

use anyhow::{Context, Result};
use avatar_core::Config;
use avatar_storage::{create_storage, Storage};
use std::sync::Arc;

/// Select and build the storage backend for this process.
pub fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config.storage()).context("Failed to initialize storage")?;
    tracing::info!(
        backend = %storage.backend_type(),
        "Storage abstraction initialized successfully"
    );
    Ok(storage)
}
