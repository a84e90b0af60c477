//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement,
//! together with the file records that flow into and out of a backend.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where the bytes of an incoming file currently live.
#[derive(Debug, Clone)]
pub enum FileBytes {
    /// Buffered in memory while the request body was parsed.
    InMemory(Bytes),
    /// Already streamed to disk under a generated name.
    OnDisk { path: PathBuf, file_name: String },
}

/// One file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub field_name: String,
    /// Client-supplied and untrusted.
    pub original_name: String,
    /// Client-supplied and untrusted.
    pub content_type: String,
    pub size: u64,
    pub bytes: FileBytes,
}

/// Result of a successful store. Only produced once bytes are durably written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLocation {
    /// Filesystem path or object URL.
    pub url: String,
    /// Identifier accepted by [`Storage::delete`].
    pub backend_key: String,
}

/// A destination file opened for streaming writes while a request is parsed.
#[derive(Debug)]
pub struct StagedFile {
    pub file: tokio::fs::File,
    pub path: PathBuf,
    pub file_name: String,
}

/// Storage abstraction trait
///
/// All storage backends (local filesystem, Azure Blob Storage) must implement this
/// trait. Implementations are shared across concurrent requests behind an `Arc`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a file and return where it ended up.
    async fn store(&self, file: &IncomingFile) -> StorageResult<StoredLocation>;

    /// Delete a stored file by its backend key. Deleting a missing file succeeds.
    async fn delete(&self, backend_key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Open a destination for streaming a file straight to its final location.
    ///
    /// Backends that need the whole payload in memory return `None`, which makes the
    /// caller buffer the bytes instead.
    async fn begin_staged_write(
        &self,
        _field_name: &str,
        _original_name: &str,
    ) -> StorageResult<Option<StagedFile>> {
        Ok(None)
    }
}
