//! Request extractor that runs the upload pipeline.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequest, Multipart, Request};
use avatar_core::AppError;

use super::service::AvatarUploadService;
use super::types::UploadOutcome;
use crate::error::HttpAppError;

/// Stored avatars for the current request.
///
/// Extracting this consumes the multipart body, stores every accepted file, and fails
/// the request with a rendered error if parsing or storing fails. Handlers only run once
/// every accepted file has a location.
#[derive(Debug)]
pub struct AvatarUpload(pub UploadOutcome);

impl<S> FromRequest<S> for AvatarUpload
where
    S: Send + Sync,
    Arc<AvatarUploadService>: FromRef<S>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let service = Arc::<AvatarUploadService>::from_ref(state);
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| HttpAppError(AppError::InvalidUpload(rejection.body_text())))?;

        let outcome = service.handle(multipart).await?;
        Ok(AvatarUpload(outcome))
    }
}
