//! Conversation endpoint integration tests

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{json_request, parse_body, TestApp};

mod test_create_conversation {
    use super::*;

    #[tokio::test]
    async fn test_create_conversation_returns_201() {
        let app = TestApp::new();

        let resp = app
            .send(json_request(
                Method::POST,
                "/api/conversations",
                Some(json!({"title": "Trip ideas"})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert_eq!(body["title"], "Trip ideas");
        assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(body["created_at"].is_string());
        assert_eq!(body["created_at"], body["updated_at"]);
    }

    #[tokio::test]
    async fn test_create_conversation_without_body_uses_default_title() {
        let app = TestApp::new();

        let resp = app
            .send(json_request(Method::POST, "/api/conversations", None))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(parse_body(resp).await["title"], "New Conversation");
    }

    #[tokio::test]
    async fn test_create_conversation_blank_title_uses_default() {
        let app = TestApp::new();

        let resp = app
            .send(json_request(
                Method::POST,
                "/api/conversations",
                Some(json!({"title": "  "})),
            ))
            .await;
        assert_eq!(parse_body(resp).await["title"], "New Conversation");
    }

    #[tokio::test]
    async fn test_create_conversation_title_too_long() {
        let app = TestApp::new();

        let resp = app
            .send(json_request(
                Method::POST,
                "/api/conversations",
                Some(json!({"title": "x".repeat(201)})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_body(resp).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_conversation_malformed_json() {
        let app = TestApp::new();

        let req = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/conversations")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();

        let resp = app.send(req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

mod test_list_conversations {
    use super::*;

    #[tokio::test]
    async fn test_list_empty() {
        let app = TestApp::new();

        let resp = app
            .send(json_request(Method::GET, "/api/conversations", None))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await, json!([]));
    }

    #[tokio::test]
    async fn test_list_includes_created() {
        let app = TestApp::new();
        let id = app.create_conversation(Some("Recipes")).await;

        let resp = app
            .send(json_request(Method::GET, "/api/conversations", None))
            .await;
        let body = parse_body(resp).await;
        let list = body.as_array().unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], id.as_str());
        assert_eq!(list[0]["title"], "Recipes");
    }

    #[tokio::test]
    async fn test_list_most_recently_active_first() {
        let app = TestApp::new();
        let first = app.create_conversation(Some("first")).await;
        let _second = app.create_conversation(Some("second")).await;

        // Activity on the older conversation moves it to the top
        let resp = app
            .send(json_request(
                Method::POST,
                "/api/chat/send",
                Some(json!({"conversation_id": first, "content": "bump"})),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(
            app.send(json_request(Method::GET, "/api/conversations", None))
                .await,
        )
        .await;
        assert_eq!(body[0]["id"], first.as_str());
        assert_eq!(body[0]["title"], "first");
    }
}

mod test_delete_conversation {
    use super::*;

    #[tokio::test]
    async fn test_delete_removes_conversation_and_messages() {
        let app = TestApp::new();
        let id = app.create_conversation(None).await;

        app.send(json_request(
            Method::POST,
            "/api/chat/send",
            Some(json!({"conversation_id": id, "content": "hello"})),
        ))
        .await;

        let resp = app
            .send(json_request(
                Method::DELETE,
                &format!("/api/conversations/{}", id),
                None,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await, json!({"status": "deleted"}));

        let list = parse_body(
            app.send(json_request(Method::GET, "/api/conversations", None))
                .await,
        )
        .await;
        assert_eq!(list, json!([]));

        let messages = parse_body(
            app.send(json_request(
                Method::GET,
                &format!("/api/conversations/{}/messages", id),
                None,
            ))
            .await,
        )
        .await;
        assert_eq!(messages, json!([]));
    }

    #[tokio::test]
    async fn test_delete_unknown_returns_404() {
        let app = TestApp::new();

        let resp = app
            .send(json_request(
                Method::DELETE,
                "/api/conversations/does-not-exist",
                None,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(parse_body(resp).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_twice_second_is_404() {
        let app = TestApp::new();
        let id = app.create_conversation(None).await;
        let uri = format!("/api/conversations/{}", id);

        let first = app.send(json_request(Method::DELETE, &uri, None)).await;
        let second = app.send(json_request(Method::DELETE, &uri, None)).await;

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }
}

mod test_infrastructure_routes {
    use super::*;
    use crate::common::body_text;

    #[tokio::test]
    async fn test_health() {
        let resp = TestApp::new()
            .send(json_request(Method::GET, "/health", None))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "OK");
    }

    #[tokio::test]
    async fn test_banner() {
        let resp = TestApp::new()
            .send(json_request(Method::GET, "/api", None))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await["message"], nexo_app::BANNER);
    }
}
