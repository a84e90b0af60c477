//! Avatar upload service
//!
//! Turns a multipart request into stored avatars: parse → filter → store → annotate.
//!
//! Backends that stage writes (local disk) receive bytes as they stream in, so by the
//! time parsing finishes their files are already in place and `store` only confirms
//! them. Every other backend gets the buffered bytes. Store calls for one request run
//! concurrently, one task per file; the first failure ends the request and uploads that
//! already succeeded are left in place.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use avatar_core::constants::MAX_AVATAR_SIZE_BYTES;
use avatar_storage::{FileBytes, IncomingFile, StagedFile, Storage};
use bytes::{Bytes, BytesMut};
use tokio::io::AsyncWriteExt;

use super::error::UploadError;
use super::filter;
use super::types::{RejectedFile, UploadOutcome, UploadedAvatar};

/// Files accepted by the filter plus the parts it dropped.
#[derive(Debug, Default)]
pub struct ParsedUpload {
    pub accepted: Vec<IncomingFile>,
    pub rejected: Vec<RejectedFile>,
}

pub struct AvatarUploadService {
    storage: Arc<dyn Storage>,
    max_file_size: usize,
}

impl AvatarUploadService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_max_file_size(storage, MAX_AVATAR_SIZE_BYTES)
    }

    pub fn with_max_file_size(storage: Arc<dyn Storage>, max_file_size: usize) -> Self {
        AvatarUploadService {
            storage,
            max_file_size,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Handle one upload request end to end.
    pub async fn handle(&self, multipart: Multipart) -> Result<UploadOutcome, UploadError> {
        let parsed = self.parse(multipart).await?;

        tracing::debug!(
            accepted = parsed.accepted.len(),
            rejected = parsed.rejected.len(),
            backend = %self.storage.backend_type(),
            "Multipart upload parsed"
        );

        let files = self.store_all(parsed.accepted).await?;

        tracing::info!(
            stored = files.len(),
            rejected = parsed.rejected.len(),
            backend = %self.storage.backend_type(),
            "Avatar upload completed"
        );

        Ok(UploadOutcome {
            files,
            rejected: parsed.rejected,
        })
    }

    /// Read every file part of the request.
    ///
    /// Parts without a filename are ignored. Parts whose declared type is not allowed are
    /// recorded as rejected and their bytes discarded. On error, anything already staged
    /// for this request is removed again; if the request is dropped mid-stream the removal
    /// runs in a background task.
    pub async fn parse(&self, mut multipart: Multipart) -> Result<ParsedUpload, UploadError> {
        let mut parsed = ParsedUpload::default();
        let mut staged = StagedCleanup::new(self.storage.clone());

        let result = async {
            while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
                let Some(original_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let field_name = field.name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();

                if !filter::accept(&content_type) {
                    tracing::debug!(
                        field_name = %field_name,
                        original_name = %original_name,
                        content_type = %content_type,
                        "Dropping file with disallowed content type"
                    );
                    parsed.rejected.push(RejectedFile {
                        field_name,
                        original_name,
                        content_type,
                    });
                    continue;
                }

                let file = self
                    .read_file(field, field_name, original_name, content_type, &mut staged)
                    .await?;
                parsed.accepted.push(file);
            }
            Ok::<(), UploadError>(())
        }
        .await;

        match result {
            Ok(()) => {
                staged.disarm();
                Ok(parsed)
            }
            Err(err) => {
                staged.discard().await;
                Err(err)
            }
        }
    }

    async fn read_file(
        &self,
        field: Field<'_>,
        field_name: String,
        original_name: String,
        content_type: String,
        cleanup: &mut StagedCleanup,
    ) -> Result<IncomingFile, UploadError> {
        let staged = self
            .storage
            .begin_staged_write(&field_name, &original_name)
            .await
            .map_err(|source| UploadError::Staging {
                original_name: original_name.clone(),
                source,
            })?;

        let (size, bytes) = match staged {
            Some(staged) => {
                cleanup.track(staged.file_name.clone());
                self.stream_to_disk(field, staged, &field_name, &original_name)
                    .await?
            }
            None => {
                let data = self.buffer(field, &field_name, &original_name).await?;
                (data.len() as u64, FileBytes::InMemory(data))
            }
        };

        Ok(IncomingFile {
            field_name,
            original_name,
            content_type,
            size,
            bytes,
        })
    }

    async fn buffer(
        &self,
        mut field: Field<'_>,
        field_name: &str,
        original_name: &str,
    ) -> Result<Bytes, UploadError> {
        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            self.check_size(data.len() + chunk.len(), field_name, original_name)?;
            data.extend_from_slice(&chunk);
        }
        Ok(data.freeze())
    }

    async fn stream_to_disk(
        &self,
        mut field: Field<'_>,
        staged: StagedFile,
        field_name: &str,
        original_name: &str,
    ) -> Result<(u64, FileBytes), UploadError> {
        let StagedFile {
            mut file,
            path,
            file_name,
        } = staged;
        let staging_error = |e: std::io::Error| UploadError::Staging {
            original_name: original_name.to_string(),
            source: e.into(),
        };

        let mut written = 0usize;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            written += chunk.len();
            self.check_size(written, field_name, original_name)?;
            file.write_all(&chunk).await.map_err(staging_error)?;
        }
        file.flush().await.map_err(staging_error)?;
        file.sync_all().await.map_err(staging_error)?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = written,
            "Streamed upload to disk"
        );

        Ok((written as u64, FileBytes::OnDisk { path, file_name }))
    }

    fn check_size(&self, size: usize, field_name: &str, original_name: &str) -> Result<(), UploadError> {
        if size > self.max_file_size {
            return Err(UploadError::TooLarge {
                field_name: field_name.to_string(),
                original_name: original_name.to_string(),
                limit_bytes: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Store every file concurrently and annotate each with its location.
    ///
    /// Each store runs in its own task, so a failure stops the wait without cancelling
    /// siblings still in flight. Results come back in input order.
    pub async fn store_all(
        &self,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<UploadedAvatar>, UploadError> {
        let handles: Vec<_> = files
            .into_iter()
            .map(|file| {
                let storage = self.storage.clone();
                tokio::spawn(async move {
                    match storage.store(&file).await {
                        Ok(location) => Ok(UploadedAvatar::new(file, location)),
                        Err(source) => {
                            tracing::error!(
                                error = %source,
                                field_name = %file.field_name,
                                original_name = %file.original_name,
                                "Avatar store failed"
                            );
                            Err(UploadError::Storage {
                                original_name: file.original_name,
                                source,
                            })
                        }
                    }
                })
            })
            .collect();

        futures::future::try_join_all(handles.into_iter().map(|handle| async move {
            handle
                .await
                .map_err(|e| UploadError::Internal(e.to_string()))?
        }))
        .await
    }
}

fn multipart_error(err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::BodyTooLarge(err.body_text())
    } else {
        UploadError::Parse(err.body_text())
    }
}

/// Staged files written for one request, removed unless parsing completes.
struct StagedCleanup {
    storage: Arc<dyn Storage>,
    keys: Vec<String>,
}

impl StagedCleanup {
    fn new(storage: Arc<dyn Storage>) -> Self {
        StagedCleanup {
            storage,
            keys: Vec::new(),
        }
    }

    fn track(&mut self, key: String) {
        self.keys.push(key);
    }

    /// Keep the staged files; they now belong to the accepted uploads.
    fn disarm(&mut self) {
        self.keys.clear();
    }

    async fn discard(&mut self) {
        let keys = std::mem::take(&mut self.keys);
        remove_staged(self.storage.as_ref(), &keys).await;
    }
}

impl Drop for StagedCleanup {
    fn drop(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        let keys = std::mem::take(&mut self.keys);
        let storage = self.storage.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(count = keys.len(), "Request dropped, removing staged uploads");
                handle.spawn(async move {
                    remove_staged(storage.as_ref(), &keys).await;
                });
            }
            Err(_) => {
                tracing::warn!(
                    count = keys.len(),
                    "No runtime available to remove staged uploads"
                );
            }
        }
    }
}

async fn remove_staged(storage: &dyn Storage, keys: &[String]) {
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!(error = %e, key = %key, "Failed to remove staged upload");
        }
    }
}
