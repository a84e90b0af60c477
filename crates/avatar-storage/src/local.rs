use crate::keys::generate_file_name;
use crate::traits::{
    FileBytes, IncomingFile, StagedFile, Storage, StorageError, StorageResult, StoredLocation,
};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Every avatar lives directly in `base_path`; the backend key is the bare file name.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// The directory is not touched until the first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalStorage {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a backend key to its filesystem path.
    ///
    /// Keys are flat file names; separators and parent references are rejected so a
    /// key can never address anything outside `base_path`.
    fn key_to_path(&self, backend_key: &str) -> StorageResult<PathBuf> {
        if backend_key.is_empty()
            || backend_key.contains("..")
            || backend_key.contains('/')
            || backend_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key must be a plain file name: {:?}",
                backend_key
            )));
        }

        Ok(self.base_path.join(backend_key))
    }

    fn location(path: &Path, file_name: &str) -> StoredLocation {
        StoredLocation {
            url: path.display().to_string(),
            backend_key: file_name.to_string(),
        }
    }

    /// Ensure the storage directory exists
    async fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create storage directory {}: {}",
                self.base_path.display(),
                e
            ))
        })
    }

    async fn write_new_file(&self, file_name: &str, data: &[u8]) -> StorageResult<PathBuf> {
        let path = self.key_to_path(file_name)?;
        self.ensure_dir().await?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(path)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(&self, file: &IncomingFile) -> StorageResult<StoredLocation> {
        match &file.bytes {
            // Written while the request was parsed; only confirm it is ours and present.
            FileBytes::OnDisk { path, file_name } => {
                let expected = self.key_to_path(file_name)?;
                if &expected != path {
                    return Err(StorageError::InvalidKey(format!(
                        "Staged file {} is outside storage directory {}",
                        path.display(),
                        self.base_path.display()
                    )));
                }
                if !fs::try_exists(path).await? {
                    return Err(StorageError::UploadFailed(format!(
                        "Staged file {} no longer exists",
                        path.display()
                    )));
                }
                Ok(Self::location(path, file_name))
            }
            FileBytes::InMemory(data) => {
                let start = std::time::Instant::now();
                let file_name = generate_file_name(&file.field_name, &file.original_name);
                let path = self.write_new_file(&file_name, data).await?;

                tracing::info!(
                    path = %path.display(),
                    key = %file_name,
                    size_bytes = data.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage upload successful"
                );

                Ok(Self::location(&path, &file_name))
            }
        }
    }

    async fn delete(&self, backend_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(backend_key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %backend_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %backend_key, "Local storage delete of missing file");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn begin_staged_write(
        &self,
        field_name: &str,
        original_name: &str,
    ) -> StorageResult<Option<StagedFile>> {
        let file_name = generate_file_name(field_name, original_name);
        let path = self.key_to_path(&file_name)?;
        self.ensure_dir().await?;

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Some(StagedFile {
            file,
            path,
            file_name,
        }))
    }
}
