use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uploads::{LocalDiskStore, handlers};

const BOUNDARY: &str = "delta-boundary";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

fn part(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    out.extend_from_slice(bytes);
    out.extend_from_slice(b"\r\n");
    out
}

fn multipart_request(parts: Vec<Vec<u8>>) -> Request<Body> {
    let mut body: Vec<u8> = parts.concat();
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_then_delete() {
    let dir = tempfile::tempdir().unwrap();
    let app = handlers::router(Arc::new(LocalDiskStore::new(dir.path())), 1024);

    let response = app
        .clone()
        .oneshot(multipart_request(vec![
            part("images", "front.png", "image/png", PNG),
            part("images", "back.png", "image/png", PNG),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    let stored = body.as_array().unwrap();
    assert_eq!(stored.len(), 2);
    let key = stored[0]["key"].as_str().unwrap().to_string();
    assert_eq!(stored[0]["url"], format!("/uploads/{key}"));
    assert!(dir.path().join(&key).exists());

    let response = app
        .oneshot(
            Request::delete(format!("/{key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!dir.path().join(&key).exists());
}

#[tokio::test]
async fn test_single_image_field_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let app = handlers::router(Arc::new(LocalDiskStore::new(dir.path())), 1024);

    let response = app
        .oneshot(multipart_request(vec![part("image", "hero.png", "image/png", PNG)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_rejects_unsupported_type() {
    let dir = tempfile::tempdir().unwrap();
    let app = handlers::router(Arc::new(LocalDiskStore::new(dir.path())), 1024);

    let response = app
        .oneshot(multipart_request(vec![part(
            "images",
            "notes.txt",
            "text/plain",
            b"hello",
        )]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_rejects_oversized_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = handlers::router(Arc::new(LocalDiskStore::new(dir.path())), 8);

    let response = app
        .oneshot(multipart_request(vec![part("images", "big.png", "image/png", PNG)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["error"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_rejects_empty_form() {
    let dir = tempfile::tempdir().unwrap();
    let app = handlers::router(Arc::new(LocalDiskStore::new(dir.path())), 1024);

    let response = app.oneshot(multipart_request(vec![])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejects_more_than_ten_files() {
    let dir = tempfile::tempdir().unwrap();
    let app = handlers::router(Arc::new(LocalDiskStore::new(dir.path())), 1024);

    let parts = (0..11)
        .map(|i| part("images", &format!("{i}.png"), "image/png", PNG))
        .collect();
    let response = app.oneshot(multipart_request(parts)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
