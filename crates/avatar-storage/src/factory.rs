#[cfg(feature = "storage-azure")]
use crate::AzureBlobStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{Storage, StorageBackend, StorageResult};
#[cfg(not(all(feature = "storage-azure", feature = "storage-local")))]
use crate::StorageError;
use avatar_core::StorageConfig;
use std::sync::Arc;

/// Create the storage backend selected by configuration.
///
/// Called once at startup; the returned backend serves every request for the lifetime
/// of the process.
pub fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    let backend = config.backend();

    match backend {
        #[cfg(feature = "storage-azure")]
        StorageBackend::Azure => {
            let storage = AzureBlobStorage::new(config)?;
            tracing::info!(
                backend = %backend,
                container = %storage.container(),
                "Storage backend selected"
            );
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-azure"))]
        StorageBackend::Azure => Err(StorageError::ConfigError(
            "Azure storage backend not available (storage-azure feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(&config.local_storage_path);
            tracing::info!(
                backend = %backend,
                path = %storage.base_path().display(),
                "Storage backend selected"
            );
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
