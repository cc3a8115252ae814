//! Upload endpoint integration tests

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::common::{json_request, parse_body, TestApp};

const BOUNDARY: &str = "nexo-test-boundary";

fn multipart_request(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_returns_base64() {
    let app = TestApp::new();
    let data = b"\x89PNG fake image bytes";

    let resp = app
        .send(multipart_request("file", "cat.png", "image/png", data))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = parse_body(resp).await;
    assert_eq!(body["filename"], "cat.png");
    assert_eq!(body["type"], "image/png");
    assert_eq!(
        STANDARD.decode(body["data"].as_str().unwrap()).unwrap(),
        data.to_vec()
    );
}

#[tokio::test]
async fn test_upload_missing_file_field() {
    let app = TestApp::new();

    let resp = app
        .send(multipart_request("attachment", "cat.png", "image/png", b"data"))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_empty_file_rejected() {
    let app = TestApp::new();

    let resp = app
        .send(multipart_request("file", "empty.txt", "text/plain", b""))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_limit_rejected() {
    // Test config caps uploads at 1024 bytes
    let app = TestApp::new();
    let data = vec![b'a'; 2048];

    let resp = app
        .send(multipart_request("file", "big.bin", "application/octet-stream", &data))
        .await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(parse_body(resp).await["error"]["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_uploaded_data_accepted_as_image() {
    let app = TestApp::new();
    let id = app.create_conversation(None).await;

    let upload = parse_body(
        app.send(multipart_request("file", "dot.png", "image/png", b"\x00\x01\x02"))
            .await,
    )
    .await;

    let resp = app
        .send(json_request(
            Method::POST,
            "/api/chat/send",
            Some(serde_json::json!({
                "conversation_id": id,
                "content": "describe",
                "image_data": format!("data:{};base64,{}", upload["type"].as_str().unwrap(), upload["data"].as_str().unwrap()),
            })),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_near_limit_accepted_as_image() {
    let app = TestApp::new().with_max_upload_bytes(300_000);
    let id = app.create_conversation(None).await;
    let data = vec![0xAB_u8; 290_000];

    let resp = app
        .send(multipart_request("file", "photo.jpg", "image/jpeg", &data))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let upload = parse_body(resp).await;

    let resp = app
        .send(json_request(
            Method::POST,
            "/api/chat/send",
            Some(serde_json::json!({
                "conversation_id": id,
                "content": "what is in this photo?",
                "image_data": format!("data:image/jpeg;base64,{}", upload["data"].as_str().unwrap()),
            })),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = parse_body(resp).await;
    assert_eq!(body["message"]["role"], "assistant");
}

#[tokio::test]
async fn test_oversized_json_body_is_payload_too_large() {
    // 1024-byte upload cap keeps the body limit well under this content
    let app = TestApp::new();
    let id = app.create_conversation(None).await;

    let resp = app
        .send(json_request(
            Method::POST,
            "/api/chat/send",
            Some(serde_json::json!({
                "conversation_id": id,
                "content": "x".repeat(200 * 1024),
            })),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(parse_body(resp).await["error"]["code"], "PAYLOAD_TOO_LARGE");
}
