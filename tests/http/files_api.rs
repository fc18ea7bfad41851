#[path = "../common/mod.rs"]
mod common;

use axum::body::{to_bytes, Body};
use axum::Router;
use dicomviewer::adapters::http::{build_router, AppState, FILES_BASE_PATH};
use dicomviewer::storage::{FileStore, FilesystemStore};
use http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "dicomviewer-test-boundary";
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

struct TestApp {
    router: Router,
    _temp_dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_upload_limit(16 * 1024 * 1024)
    }

    fn with_upload_limit(limit: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store: Arc<dyn FileStore> = Arc::new(FilesystemStore::new(temp_dir.path()));
        Self {
            router: build_router(AppState::new(store), limit),
            _temp_dir: temp_dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, http::HeaderMap, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, headers, body.to_vec())
    }

    async fn get(&self, uri: &str) -> (StatusCode, http::HeaderMap, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.get(uri).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    async fn upload_field(&self, field: &str, content: &[u8]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(FILES_BASE_PATH)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(field, content)))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    async fn upload(&self, content: &[u8]) -> String {
        let (status, body) = self.upload_field("file", content).await;
        assert_eq!(status, StatusCode::OK, "upload failed: {body}");
        body["fileId"].as_str().expect("fileId").to_string()
    }
}

fn multipart_body(field: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"scan.dcm\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/dicom\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[tokio::test]
async fn test_list_is_empty_initially() {
    let app = TestApp::new();

    let (status, body) = app.get_json(FILES_BASE_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "fileIds": [] }));
}

#[tokio::test]
async fn test_upload_then_list_and_download() {
    let app = TestApp::new();
    let content = common::two_by_two();

    let id = app.upload(&content).await;
    assert!(uuid::Uuid::parse_str(&id).is_ok(), "{id} is not a uuid");

    let (status, body) = app.get_json(FILES_BASE_PATH).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fileIds"], serde_json::json!([id]));

    let (status, headers, raw) = app.get(&format!("{FILES_BASE_PATH}/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/dicom");
    assert_eq!(raw, content);
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.upload_field("attachment", b"data").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let app = TestApp::with_upload_limit(64);

    let (status, _) = app.upload_field("file", &[0u8; 1024]).await;

    assert!(status.is_client_error(), "unexpected status {status}");
    let (_, body) = app.get_json(FILES_BASE_PATH).await;
    assert_eq!(body["fileIds"], serde_json::json!([]));
}

#[tokio::test]
async fn test_png_rendering() {
    let app = TestApp::new();
    let id = app.upload(&common::two_by_two()).await;

    for query in ["", "?remap=false", "?remap=not-a-bool"] {
        let (status, headers, png) = app.get(&format!("{FILES_BASE_PATH}/{id}/png{query}")).await;
        assert_eq!(status, StatusCode::OK, "query {query:?}");
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }
}

#[tokio::test]
async fn test_png_without_pixel_data_is_unprocessable() {
    let app = TestApp::new();
    let id = app.upload(&common::without_pixel_data()).await;

    let (status, body) = app.get_json(&format!("{FILES_BASE_PATH}/{id}/png")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_attributes_by_tag() {
    let app = TestApp::new();
    let id = app.upload(&common::two_by_two()).await;

    let (status, body) = app
        .get_json(&format!(
            "{FILES_BASE_PATH}/{id}/attributes?tag=(0010,0010)&tag=(0008,1030)"
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let elements = body["elementsByTag"].as_object().expect("object");
    assert_eq!(elements.len(), 2);
    assert!(elements["(0010,0010)"].is_object());
    assert!(elements["(0008,1030)"].is_null());
}

#[tokio::test]
async fn test_attributes_without_tags_returns_everything() {
    let app = TestApp::new();
    let id = app.upload(&common::without_pixel_data()).await;

    let (status, body) = app
        .get_json(&format!("{FILES_BASE_PATH}/{id}/attributes"))
        .await;

    assert_eq!(status, StatusCode::OK);
    let elements = body["elementsByTag"].as_object().expect("object");
    assert!(elements.contains_key("(0010,0010)"));
    assert!(elements.contains_key("(0008,0060)"));
    assert!(elements.values().all(|v| !v.is_null()));
}

#[tokio::test]
async fn test_malformed_tag_is_bad_request() {
    let app = TestApp::new();
    let id = app.upload(&common::two_by_two()).await;

    let (status, body) = app
        .get_json(&format!("{FILES_BASE_PATH}/{id}/attributes?tag=(zz,1)"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    let app = TestApp::new();

    for suffix in ["", "/png", "/attributes"] {
        let (status, body) = app
            .get_json(&format!("{FILES_BASE_PATH}/missing{suffix}"))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "suffix {suffix:?}");
        assert!(body["error"].is_string());
    }
}
