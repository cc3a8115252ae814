//! Common test utilities and fixtures for integration tests
//!
//! Every test builds its own app on a fresh in-memory store, so tests are
//! isolated without database cleanup.

use std::env;
use std::sync::{Arc, Once};

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use nexo_common::Config;
use nexo_conversations::{ConversationStore, InMemoryConversationStore};
use nexo_llm::{LlmService, MockLlmService, MockMode};
use serde_json::Value;
use tower::ServiceExt;

static INIT: Once = Once::new();

/// Load `.env.test` / `.env` once per test binary
pub fn load_test_env() {
    INIT.call_once(|| {
        dotenvy::from_filename(".env.test").ok();
        dotenvy::dotenv().ok();
    });
}

/// Postgres URL for store tests, if one is configured
pub fn test_database_url() -> Option<String> {
    load_test_env();
    env::var("TEST_DATABASE_URL").ok()
}

/// Test configuration: memory store, no streaming delay
pub fn test_config(cors_origins: &str) -> Config {
    let cors_origins = cors_origins.to_string();
    Config::from_lookup(move |key| match key {
        "STORE_PROVIDER" => Some("memory".to_string()),
        "CORS_ALLOWED_ORIGINS" => Some(cors_origins.clone()),
        "STREAM_CHUNK_DELAY_MS" => Some("0".to_string()),
        "MAX_UPLOAD_BYTES" => Some("1024".to_string()),
        _ => None,
    })
    .expect("test config should load")
}

/// Composed application over an in-memory store
pub struct TestApp {
    pub store: Arc<InMemoryConversationStore>,
    pub config: Config,
    llm: Arc<dyn LlmService>,
}

impl TestApp {
    /// App backed by the echo mock provider
    pub fn new() -> Self {
        Self::with_llm(Arc::new(MockLlmService::new(MockMode::Echo)))
    }

    pub fn with_llm(llm: Arc<dyn LlmService>) -> Self {
        Self {
            store: Arc::new(InMemoryConversationStore::new()),
            config: test_config("*"),
            llm,
        }
    }

    pub fn with_cors(mut self, origins: &str) -> Self {
        self.config = test_config(origins);
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.config.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn router(&self) -> Router {
        let store: Arc<dyn ConversationStore> = self.store.clone();
        nexo_app::create_app(&self.config, store, Arc::clone(&self.llm))
    }

    /// Send one request through a fresh router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router()
            .oneshot(request)
            .await
            .expect("router should not fail")
    }

    /// Create a conversation via the API and return its id
    pub async fn create_conversation(&self, title: Option<&str>) -> String {
        let body = title.map(|t| serde_json::json!({ "title": t }));
        let response = self
            .send(json_request(Method::POST, "/api/conversations", body))
            .await;
        parse_body(response).await["id"]
            .as_str()
            .expect("conversation id")
            .to_string()
    }
}

/// Build a request with an optional JSON body
pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read the whole response body as text
pub async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Decode the JSON payloads of an SSE body, in order
pub fn sse_payloads(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim_start()).unwrap())
        .collect()
}
