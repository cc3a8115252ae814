//! Chat send handler: single JSON reply or an SSE stream of fragments

use std::convert::Infallible;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use nexo_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use validator::Validate;

use super::messages::MessageResponse;
use crate::api::middleware::ConversationsState;
use crate::domain::orchestrator::ReplyChunk;

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1))]
    pub conversation_id: String,

    /// Message content; must contain non-whitespace text
    pub content: String,

    /// Inline base64 image, optionally as a data URL
    pub image_data: Option<String>,

    /// Deliver the reply as server-sent events
    #[serde(default)]
    pub stream: bool,
}

/// Response for a non-streamed send
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub reply: String,
    pub message: MessageResponse,
}

/// Send a message to a conversation
pub async fn send_message(
    State(state): State<ConversationsState>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Response> {
    if req.stream || accepts_event_stream(&headers) {
        let chunks = state
            .orchestrator
            .send_message_stream(&req.conversation_id, req.content, req.image_data)
            .await?;

        let events = chunks.map(|chunk| Ok::<Event, Infallible>(chunk_event(chunk)));

        return Ok(Sse::new(events)
            .keep_alive(KeepAlive::default())
            .into_response());
    }

    let message = state
        .orchestrator
        .send_message(&req.conversation_id, req.content, req.image_data)
        .await?;

    Ok(Json(SendMessageResponse {
        reply: message.content.clone(),
        message: message.into(),
    })
    .into_response())
}

fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/event-stream"))
        .unwrap_or(false)
}

fn chunk_event(chunk: ReplyChunk) -> Event {
    let payload = match chunk {
        ReplyChunk::Content(content) => serde_json::json!({ "content": content }),
        ReplyChunk::Error(error) => serde_json::json!({ "error": error }),
        ReplyChunk::Done => serde_json::json!({ "done": true }),
    };
    Event::default().data(payload.to_string())
}
