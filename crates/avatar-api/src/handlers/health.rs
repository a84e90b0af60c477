use std::sync::Arc;

use avatar_core::StorageBackend;
use avatar_storage::Storage;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage_backend: StorageBackend,
}

pub async fn health_check(State(storage): State<Arc<dyn Storage>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage_backend: storage.backend_type(),
    })
}
