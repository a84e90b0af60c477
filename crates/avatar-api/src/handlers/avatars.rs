//! Avatar upload and delete handlers

use std::sync::Arc;

use avatar_storage::Storage;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::error::HttpAppError;
use crate::services::upload::{AvatarUpload, RejectedFile, UploadedAvatar};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<UploadedAvatar>,
    pub rejected: Vec<RejectedFile>,
}

/// Store every allowed file of a multipart request.
///
/// Responds 200 even when no file passed the content-type filter; dropped parts are
/// listed under `rejected`.
pub async fn upload_avatars(AvatarUpload(outcome): AvatarUpload) -> impl IntoResponse {
    Json(UploadResponse {
        success: true,
        files: outcome.files,
        rejected: outcome.rejected,
    })
}

/// Delete a stored avatar by backend key. Deleting a missing avatar succeeds.
pub async fn delete_avatar(
    State(storage): State<Arc<dyn Storage>>,
    Path(backend_key): Path<String>,
) -> Result<StatusCode, HttpAppError> {
    storage.delete(&backend_key).await?;

    tracing::info!(key = %backend_key, backend = %storage.backend_type(), "Avatar deleted");

    Ok(StatusCode::NO_CONTENT)
}
