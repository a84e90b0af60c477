//! Upload orchestration errors

use avatar_core::AppError;
use avatar_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// The multipart body could not be read.
    #[error("Failed to parse multipart body: {0}")]
    Parse(String),

    /// A single file exceeded the per-file ceiling.
    #[error("File {original_name:?} in field {field_name:?} exceeds the {limit_bytes} byte limit")]
    TooLarge {
        field_name: String,
        original_name: String,
        limit_bytes: usize,
    },

    /// The request body as a whole exceeded the server's request ceiling.
    #[error("Request body too large: {0}")]
    BodyTooLarge(String),

    /// Staging a file to its destination while parsing failed.
    #[error("Failed to stage {original_name:?}: {source}")]
    Staging {
        original_name: String,
        #[source]
        source: StorageError,
    },

    /// A store call failed. Sibling files of the same request may already be stored.
    #[error("Failed to store {original_name:?}: {source}")]
    Storage {
        original_name: String,
        #[source]
        source: StorageError,
    },

    #[error("Upload task failed: {0}")]
    Internal(String),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Parse(msg) => AppError::InvalidUpload(format!("Invalid upload: {}", msg)),
            UploadError::TooLarge { limit_bytes, .. } => AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                limit_bytes / 1024 / 1024
            )),
            UploadError::BodyTooLarge(msg) => AppError::PayloadTooLarge(msg),
            UploadError::Staging { source, .. } => match source {
                StorageError::ConfigError(msg) => AppError::Configuration(msg),
                other => AppError::Storage(other.to_string()),
            },
            UploadError::Storage { source, .. } => match source {
                StorageError::ConfigError(msg) => AppError::Configuration(msg),
                other => AppError::UploadStorage(other.to_string()),
            },
            UploadError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
