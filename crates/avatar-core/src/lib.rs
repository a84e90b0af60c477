//! Avatar Core Library
//!
//! Configuration, error types, and constants shared by the storage and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
