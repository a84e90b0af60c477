//! Azure Blob Storage backend.

mod connection;
mod provisioner;

pub use connection::ConnectionInfo;
pub use provisioner::{ContainerProvisioner, SharedKeyProvisioner};

use crate::keys::generate_file_name;
use crate::traits::{FileBytes, IncomingFile, Storage, StorageError, StorageResult, StoredLocation};
use crate::StorageBackend;
use async_trait::async_trait;
use avatar_core::constants::DEFAULT_CONTENT_TYPE;
use avatar_core::StorageConfig;
use bytes::Bytes;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStoreExt, PutOptions, PutPayload, Result as ObjectResult,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Azure Blob Storage implementation
///
/// Blobs are written flat into one container, named by [`generate_file_name`].
pub struct AzureBlobStorage {
    store: Arc<dyn object_store::ObjectStore>,
    container: String,
    blob_endpoint: String,
    provisioner: Arc<dyn ContainerProvisioner>,
    container_ready: OnceCell<()>,
}

impl AzureBlobStorage {
    /// Create the backend from storage configuration.
    ///
    /// Fails with a configuration error unless both the connection string and the
    /// container name are set; there is no fallback to another backend.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let (connection_string, container) = config.azure_credentials().ok_or_else(|| {
            StorageError::ConfigError("Azure Blob Storage is not configured".to_string())
        })?;
        Self::from_connection_string(connection_string, container)
    }

    pub fn from_connection_string(connection_string: &str, container: &str) -> StorageResult<Self> {
        let info = ConnectionInfo::parse(connection_string)?;

        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(info.account_name.clone())
            .with_access_key(info.account_key.clone())
            .with_container_name(container.to_string());

        if info.custom_endpoint {
            builder = builder
                .with_endpoint(info.blob_endpoint.clone())
                .with_allow_http(info.allows_http());
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        let provisioner = SharedKeyProvisioner::new(&info)?;

        Ok(Self::with_store(
            Arc::new(store),
            container,
            info.blob_endpoint,
            Arc::new(provisioner),
        ))
    }

    /// Assemble the backend from already-built parts.
    pub fn with_store(
        store: Arc<dyn object_store::ObjectStore>,
        container: impl Into<String>,
        blob_endpoint: impl Into<String>,
        provisioner: Arc<dyn ContainerProvisioner>,
    ) -> Self {
        AzureBlobStorage {
            store,
            container: container.into(),
            blob_endpoint: blob_endpoint.into().trim_end_matches('/').to_string(),
            provisioner,
            container_ready: OnceCell::new(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Public URL of a blob in this container.
    pub fn blob_url(&self, blob_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.blob_endpoint,
            self.container,
            urlencoding::encode(blob_name)
        )
    }

    // Concurrent first callers share one provisioning attempt; a failed attempt
    // leaves the cell empty so the next store tries again.
    async fn ensure_container(&self) -> StorageResult<()> {
        self.container_ready
            .get_or_try_init(|| self.provisioner.ensure_container(&self.container))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Storage for AzureBlobStorage {
    async fn store(&self, file: &IncomingFile) -> StorageResult<StoredLocation> {
        self.ensure_container().await?;

        let blob_name = generate_file_name(&file.field_name, &file.original_name);
        let content_type = if file.content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            file.content_type.clone()
        };

        let data: Bytes = match &file.bytes {
            FileBytes::InMemory(bytes) => bytes.clone(),
            FileBytes::OnDisk { path, .. } => Bytes::from(tokio::fs::read(path).await?),
        };
        let size = data.len() as u64;
        let location = Path::from(blob_name.as_str());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.clone().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();
        let result: ObjectResult<_> = object_store::ObjectStore::put_opts(
            self.store.as_ref(),
            &location,
            PutPayload::from(data),
            options,
        )
        .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                container = %self.container,
                key = %blob_name,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Azure upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            container = %self.container,
            key = %blob_name,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Azure upload successful"
        );

        Ok(StoredLocation {
            url: self.blob_url(&blob_name),
            backend_key: blob_name,
        })
    }

    async fn delete(&self, backend_key: &str) -> StorageResult<()> {
        if backend_key.is_empty() {
            return Ok(());
        }

        let start = std::time::Instant::now();
        let location = Path::from(backend_key);

        match self.store.delete(&location).await {
            Ok(()) => {}
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(
                    container = %self.container,
                    key = %backend_key,
                    "Azure delete of missing blob"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    container = %self.container,
                    key = %backend_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Azure delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            container = %self.container,
            key = %backend_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Azure delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Azure
    }
}
