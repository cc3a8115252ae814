//! Nexo application composition root
//!
//! Composes the domain router with shared infrastructure routes and layers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use nexo_common::{Config, CorsOrigins, LogFormat};
use nexo_conversations::{ChatSettings, ConversationStore, ConversationsState};
use nexo_llm::LlmService;
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

/// Banner served at `GET /api`
pub const BANNER: &str = "Nexo AI backend is running successfully 🚀";

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Room for the data-URL prefix, message text and JSON framing around an
/// inline image
const JSON_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the main application router with all routes and middleware
pub fn create_app(
    config: &Config,
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmService>,
) -> Router {
    let settings = ChatSettings {
        chunk_delay: Duration::from_millis(config.stream_chunk_delay_ms),
    };
    let conversations_state =
        ConversationsState::new(store, llm, settings, config.max_upload_bytes);

    Router::new()
        .route("/health", get(health_check))
        .route("/api", get(banner))
        .merge(nexo_conversations::routes().with_state(conversations_state))
        .layer(body_limit_layer(config.max_upload_bytes))
        .layer(build_cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Build the CORS layer for the configured origins.
///
/// A wildcard allows any origin without credentials. An explicit list
/// allows credentials, mirrors requested headers and limits methods.
pub fn build_cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(values))
                .allow_credentials(origins.allows_credentials())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        }
    }
}

/// Request body limit sized for the largest accepted request
pub fn body_limit_layer(max_upload_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_body_bytes(max_upload_bytes))
}

/// Largest request body accepted by any route.
///
/// A chat send that carries an uploaded file as base64 `image_data` is about
/// 4/3 the size of the file, so it usually sets the bound. The upload handler
/// still enforces the exact file cap.
pub fn max_body_bytes(max_upload_bytes: usize) -> usize {
    let multipart = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    let inline_image = max_upload_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(JSON_OVERHEAD_BYTES);
    multipart.max(inline_image)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` in the environment wins over the configured filter.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.rust_log))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn banner() -> Json<Value> {
    Json(json!({ "message": BANNER }))
}
