//! Avatar API integration tests.
//!
//! Run with: `cargo test -p avatar-api --test avatar_upload_test`

mod helpers;

use avatar_core::constants::MAX_AVATAR_SIZE_BYTES;
use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use helpers::{api_path, file_part, png_part, setup_local_app, setup_mock_app, MockStorage};
use serde_json::Value;

#[tokio::test]
async fn test_upload_keeps_only_allowed_types() {
    let app = setup_mock_app(MockStorage::new());

    let form = MultipartForm::new()
        .add_part("avatar", png_part("a.png"))
        .add_part("avatar", file_part(vec![1, 2, 3], "b.jpg", "image/jpeg"))
        .add_part("avatar", file_part(vec![4, 5, 6], "c.jpg", "image/jpg"))
        .add_part("avatar", file_part(vec![7], "d.gif", "image/gif"))
        .add_part("avatar", file_part(vec![8], "e.png", "IMAGE/PNG"));

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let files = body["files"].as_array().expect("files array");
    let names: Vec<&str> = files
        .iter()
        .map(|f| f["originalName"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(names, ["a.png", "b.jpg", "c.jpg"]);

    let rejected = body["rejected"].as_array().expect("rejected array");
    assert_eq!(rejected.len(), 2);
    assert_eq!(rejected[0]["originalName"], "d.gif");
    assert_eq!(rejected[1]["contentType"], "IMAGE/PNG");

    assert_eq!(app.storage.store_calls(), 3);
}

#[tokio::test]
async fn test_uploaded_files_carry_location() {
    let app = setup_mock_app(MockStorage::new());

    let form = MultipartForm::new()
        .add_part("avatar", png_part("me.png"))
        .add_part("banner", file_part(vec![0xFF, 0xD8], "wide.JPG", "image/jpeg"));

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let files = body["files"].as_array().expect("files array");
    assert_eq!(files.len(), 2);

    let avatar = &files[0];
    assert_eq!(avatar["fieldName"], "avatar");
    assert_eq!(avatar["contentType"], "image/png");
    assert_eq!(avatar["size"], helpers::minimal_png().len());
    let key = avatar["backendKey"].as_str().expect("backendKey");
    assert!(key.starts_with("avatar-"));
    assert!(key.ends_with(".png"));
    assert_eq!(
        avatar["url"],
        format!("https://mock.blob.test/avatars/{}", key)
    );
    assert!(app.storage.contains(key));

    let banner_key = files[1]["backendKey"].as_str().expect("backendKey");
    assert!(banner_key.starts_with("banner-"));
    assert!(banner_key.ends_with(".JPG"));
}

#[tokio::test]
async fn test_non_file_fields_are_ignored() {
    let app = setup_mock_app(MockStorage::new());

    let form = MultipartForm::new()
        .add_text("displayName", "Ada")
        .add_part("avatar", png_part("me.png"));

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["files"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["rejected"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_no_accepted_files_is_empty_success() {
    let app = setup_mock_app(MockStorage::new());

    let form = MultipartForm::new().add_part("avatar", file_part(vec![0], "x.bmp", "image/bmp"));

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["files"].as_array().map(Vec::len), Some(0));
    assert_eq!(app.storage.store_calls(), 0);
}

#[tokio::test]
async fn test_oversize_file_fails_before_any_store() {
    let app = setup_mock_app(MockStorage::new());

    let form = MultipartForm::new()
        .add_part("avatar", png_part("small.png"))
        .add_part(
            "avatar",
            file_part(vec![0u8; MAX_AVATAR_SIZE_BYTES + 1], "huge.png", "image/png"),
        );

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.storage.store_calls(), 0);
}

#[tokio::test]
async fn test_file_at_exact_limit_is_accepted() {
    let app = setup_mock_app(MockStorage::new());

    let form = MultipartForm::new().add_part(
        "avatar",
        file_part(vec![0u8; MAX_AVATAR_SIZE_BYTES], "edge.png", "image/png"),
    );

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.storage.store_calls(), 1);
}

#[tokio::test]
async fn test_one_failing_store_reports_storage_error() {
    let app = setup_mock_app(MockStorage::failing_for("3.png"));

    let mut form = MultipartForm::new();
    for i in 1..=5 {
        form = form.add_part("avatar", png_part(&format!("{}.png", i)));
    }

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("may already have been stored"));
    assert!(app.storage.was_attempted("3.png"));
}

#[tokio::test]
async fn test_malformed_multipart_is_client_error() {
    let app = setup_mock_app(MockStorage::new());

    let response = app
        .server
        .post(&api_path("/avatars"))
        .bytes(bytes::Bytes::from_static(b"not a multipart body"))
        .content_type("multipart/form-data")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_UPLOAD");
    assert_eq!(app.storage.store_calls(), 0);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = setup_mock_app(MockStorage::new());

    let form = MultipartForm::new().add_part("avatar", png_part("me.png"));
    let body: Value = app
        .server
        .post(&api_path("/avatars"))
        .multipart(form)
        .await
        .json();
    let key = body["files"][0]["backendKey"]
        .as_str()
        .expect("backendKey")
        .to_string();

    let first = app
        .server
        .delete(&api_path(&format!("/avatars/{}", key)))
        .await;
    assert_eq!(first.status_code(), StatusCode::NO_CONTENT);
    assert!(!app.storage.contains(&key));

    let second = app
        .server
        .delete(&api_path(&format!("/avatars/{}", key)))
        .await;
    assert_eq!(second.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_health_reports_backend() {
    let app = setup_mock_app(MockStorage::new());

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storageBackend"], "azure");
}

#[tokio::test]
async fn test_local_backend_round_trip() {
    let app = setup_local_app();

    let form = MultipartForm::new()
        .add_part("avatar", png_part("me.png"))
        .add_part("avatar", file_part(b"not really a jpeg".to_vec(), "me.jpeg", "image/jpeg"));

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let files = body["files"].as_array().expect("files array");
    assert_eq!(files.len(), 2);

    let key = files[1]["backendKey"].as_str().expect("backendKey").to_string();
    let path = app.temp_dir.path().join(&key);
    assert_eq!(files[1]["url"], path.display().to_string());
    assert_eq!(
        std::fs::read(&path).expect("stored file"),
        b"not really a jpeg"
    );
    assert_eq!(app.stored_files().len(), 2);

    let deleted = app
        .server
        .delete(&api_path(&format!("/avatars/{}", key)))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
    assert!(!path.exists());

    let again = app
        .server
        .delete(&api_path(&format!("/avatars/{}", key)))
        .await;
    assert_eq!(again.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(app.stored_files().len(), 1);

    let health: Value = app.server.get("/health").await.json();
    assert_eq!(health["storageBackend"], "local");
}

#[tokio::test]
async fn test_local_parse_failure_leaves_no_files() {
    let app = setup_local_app();

    let form = MultipartForm::new()
        .add_part("avatar", png_part("first.png"))
        .add_part(
            "avatar",
            file_part(vec![0u8; MAX_AVATAR_SIZE_BYTES + 1], "huge.png", "image/png"),
        );

    let response = app.server.post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_local_delete_rejects_path_traversal() {
    let app = setup_local_app();

    let response = app
        .server
        .delete(&api_path("/avatars/..%2Fsecret.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}
