//! Application state and sub-state extractors.
//!
//! Handlers pull only the piece they need through Axum's `FromRef`.

use avatar_core::Config;
use avatar_storage::Storage;
use axum::extract::FromRef;
use std::sync::Arc;

use crate::services::upload::AvatarUploadService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The backend selected at startup; shared by every request.
    pub storage: Arc<dyn Storage>,
    pub uploads: Arc<AvatarUploadService>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        AppState {
            config: Arc::new(config),
            uploads: Arc::new(AvatarUploadService::new(storage.clone())),
            storage,
        }
    }
}

impl FromRef<AppState> for Arc<dyn Storage> {
    fn from_ref(state: &AppState) -> Self {
        state.storage.clone()
    }
}

impl FromRef<AppState> for Arc<AvatarUploadService> {
    fn from_ref(state: &AppState) -> Self {
        state.uploads.clone()
    }
}
