use async_trait::async_trait;
use avatar_storage::{
    generate_file_name, IncomingFile, Storage, StorageBackend, StorageError, StorageResult,
    StoredLocation,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Recording in-memory storage standing in for a cloud backend.
///
/// Counts store calls, remembers which original names were attempted, and can be told
/// to fail the store of one particular file.
#[derive(Default)]
pub struct MockStorage {
    store_calls: AtomicUsize,
    attempted: Mutex<HashSet<String>>,
    stored: Mutex<HashSet<String>>,
    fail_for: Option<String>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the store of the file with this original name.
    pub fn failing_for(original_name: &str) -> Self {
        MockStorage {
            fail_for: Some(original_name.to_string()),
            ..Self::default()
        }
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    pub fn was_attempted(&self, original_name: &str) -> bool {
        self.attempted
            .lock()
            .map(|a| a.contains(original_name))
            .unwrap_or(false)
    }

    pub fn contains(&self, backend_key: &str) -> bool {
        self.stored
            .lock()
            .map(|s| s.contains(backend_key))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn store(&self, file: &IncomingFile) -> StorageResult<StoredLocation> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut attempted) = self.attempted.lock() {
            attempted.insert(file.original_name.clone());
        }

        if self.fail_for.as_deref() == Some(file.original_name.as_str()) {
            return Err(StorageError::UploadFailed(
                "simulated remote failure".to_string(),
            ));
        }

        let key = generate_file_name(&file.field_name, &file.original_name);
        if let Ok(mut stored) = self.stored.lock() {
            stored.insert(key.clone());
        }
        Ok(StoredLocation {
            url: format!("https://mock.blob.test/avatars/{}", key),
            backend_key: key,
        })
    }

    async fn delete(&self, backend_key: &str) -> StorageResult<()> {
        if let Ok(mut stored) = self.stored.lock() {
            stored.remove(backend_key);
        }
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Azure
    }
}
