//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors convert into
//! `AppError` and render through [`HttpAppError`] so every failure has the same body shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use avatar_core::{AppError, ErrorMetadata, LogLevel};
use avatar_storage::StorageError;
use serde::Serialize;
use std::sync::OnceLock;

use crate::services::upload::UploadError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Client-facing summary
    pub message: String,
    /// Detail of what went wrong; equal to `message` when details are withheld
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether retrying the same request could succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
///
/// `AppError` lives in avatar-core, so the orphan rule keeps `IntoResponse` off it.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<UploadError> for HttpAppError {
    fn from(err: UploadError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::UploadFailed(msg) => AppError::Storage(msg),
            StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::BackendError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::InternalWithSource {
                message: format!("IO error: {}", err),
                source: err.into(),
            },
            StorageError::ConfigError(msg) => AppError::Configuration(msg),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Request failed"
            );
        }
    }
}

static PRODUCTION_MODE: OnceLock<bool> = OnceLock::new();

/// Record whether error bodies must withhold detail. Set once at startup from
/// [`Config::is_production`](avatar_core::Config::is_production); later calls are ignored.
pub fn set_production_mode(is_production: bool) {
    if PRODUCTION_MODE.set(is_production).is_err() {
        tracing::debug!("Production mode for error responses already set");
    }
}

/// Unset means development: full detail for non-sensitive errors.
fn production_mode() -> bool {
    PRODUCTION_MODE.get().copied().unwrap_or(false)
}

impl HttpAppError {
    fn body(&self, is_production: bool) -> ErrorResponse {
        let app_error = &self.0;
        let message = app_error.client_message();

        // Backend detail never leaves the process in production or for sensitive errors.
        if is_production || app_error.is_sensitive() {
            ErrorResponse {
                success: false,
                error: message.clone(),
                message,
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                error_type: None,
            }
        } else {
            ErrorResponse {
                success: false,
                message,
                error: app_error.detailed_message(),
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                error_type: Some(app_error.error_type().to_string()),
            }
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        (status, Json(self.body(production_mode()))).into_response()
    }
}
