//! Avatar Storage Library
//!
//! This crate provides the storage abstraction for avatar uploads: the [`Storage`]
//! trait, a local filesystem backend, an Azure Blob Storage backend, and the
//! [`create_storage`] selector that picks one of them once at startup.
//!
//! # Naming
//!
//! Stored files are named `{field}-{unix_millis}-{random}{ext}` (see [`keys`]). Names are
//! flat: the local backend writes into a single directory and the Azure backend uses
//! the name directly as the blob name. The generated name is the backend key.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-azure")]
pub mod azure;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use avatar_core::StorageBackend;
#[cfg(feature = "storage-azure")]
pub use azure::{AzureBlobStorage, ContainerProvisioner, SharedKeyProvisioner};
pub use factory::create_storage;
pub use keys::generate_file_name;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{
    FileBytes, IncomingFile, StagedFile, Storage, StorageError, StorageResult, StoredLocation,
};
