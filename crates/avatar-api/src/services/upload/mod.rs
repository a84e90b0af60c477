//! Avatar upload pipeline: content-type filter, orchestration service, and the axum
//! extractor that runs it for a request.

pub mod error;
pub mod extractor;
pub mod filter;
pub mod service;
pub mod types;

pub use error::UploadError;
pub use extractor::AvatarUpload;
pub use service::{AvatarUploadService, ParsedUpload};
pub use types::{RejectedFile, UploadOutcome, UploadedAvatar};
