//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p avatar-api`.

#![allow(dead_code)]

pub mod storage;

use avatar_api::constants;
use avatar_api::setup::routes;
use avatar_api::state::AppState;
use avatar_core::Config;
use avatar_storage::{LocalStorage, Storage};
use axum_test::multipart::Part;
use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;

pub use storage::MockStorage;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Configuration built from defaults only, independent of the process environment.
pub fn test_config() -> Config {
    Config::from_lookup(|_| None).expect("default configuration is valid")
}

pub fn server_for(storage: Arc<dyn Storage>) -> TestServer {
    let state = AppState::new(test_config(), storage);
    let app = routes::build_router(state).expect("Failed to build router");
    TestServer::new(app.into_make_service()).expect("Failed to start test server")
}

/// Test application backed by a recording mock storage.
pub struct MockApp {
    pub server: TestServer,
    pub storage: Arc<MockStorage>,
}

pub fn setup_mock_app(storage: MockStorage) -> MockApp {
    let storage = Arc::new(storage);
    MockApp {
        server: server_for(storage.clone()),
        storage,
    }
}

/// Test application backed by local disk storage in a temp directory.
pub struct LocalApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl LocalApp {
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.temp_dir.path())
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

pub fn setup_local_app() -> LocalApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(temp_dir.path()));
    LocalApp {
        server: server_for(storage),
        temp_dir,
    }
}

/// Minimal valid 1x1 PNG bytes.
pub fn minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

pub fn file_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string())
}

pub fn png_part(file_name: &str) -> Part {
    file_part(minimal_png(), file_name, "image/png")
}
