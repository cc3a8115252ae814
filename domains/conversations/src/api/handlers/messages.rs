//! Message API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use nexo_common::Result;
use serde::Serialize;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Message, MessageRole};

/// Message response DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            role: m.role,
            content: m.content,
            image_data: m.image_data,
            timestamp: m.timestamp,
        }
    }
}

/// List messages for a conversation.
/// Unknown conversations have no messages rather than a 404.
pub async fn list_messages(
    State(state): State<ConversationsState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>> {
    let messages = state.conversations.list_messages(&conversation_id).await?;

    let responses: Vec<MessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}
