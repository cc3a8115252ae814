//! Message history integration tests

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{json_request, parse_body, TestApp};

#[tokio::test]
async fn test_list_messages_unknown_conversation_is_empty() {
    let app = TestApp::new();

    let resp = app
        .send(json_request(
            Method::GET,
            "/api/conversations/nope/messages",
            None,
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(parse_body(resp).await, json!([]));
}

#[tokio::test]
async fn test_messages_in_chronological_order() {
    let app = TestApp::new();
    let id = app.create_conversation(None).await;

    for content in ["one", "two"] {
        let resp = app
            .send(json_request(
                Method::POST,
                "/api/chat/send",
                Some(json!({"conversation_id": id, "content": content})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let body = parse_body(
        app.send(json_request(
            Method::GET,
            &format!("/api/conversations/{}/messages", id),
            None,
        ))
        .await,
    )
    .await;

    let turns: Vec<(String, String)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| {
            (
                m["role"].as_str().unwrap().to_string(),
                m["content"].as_str().unwrap().to_string(),
            )
        })
        .collect();

    assert_eq!(
        turns,
        vec![
            ("user".to_string(), "one".to_string()),
            ("assistant".to_string(), "Echo: one".to_string()),
            ("user".to_string(), "two".to_string()),
            ("assistant".to_string(), "Echo: two".to_string()),
        ]
    );

    for message in body.as_array().unwrap() {
        assert_eq!(message["conversation_id"], id.as_str());
        assert!(message["timestamp"].is_string());
    }
}

#[tokio::test]
async fn test_image_data_returned_only_when_present() {
    let app = TestApp::new();
    let id = app.create_conversation(None).await;

    app.send(json_request(
        Method::POST,
        "/api/chat/send",
        Some(json!({
            "conversation_id": id,
            "content": "what is this?",
            "image_data": "data:image/png;base64,aGVsbG8="
        })),
    ))
    .await;

    let body = parse_body(
        app.send(json_request(
            Method::GET,
            &format!("/api/conversations/{}/messages", id),
            None,
        ))
        .await,
    )
    .await;

    assert_eq!(body[0]["image_data"], "data:image/png;base64,aGVsbG8=");
    assert!(body[1].get("image_data").is_none());
}
