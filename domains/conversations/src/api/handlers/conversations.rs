//! Conversation management API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use nexo_common::{OptionalValidatedJson, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::Conversation;

/// Request for creating a conversation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationRequest {
    /// Optional conversation title
    #[validate(length(max = 200))]
    pub title: Option<String>,
}

/// Conversation response DTO
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            title: c.title,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response for a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteConversationResponse {
    pub status: &'static str,
}

/// Create a new conversation
pub async fn create_conversation(
    State(state): State<ConversationsState>,
    OptionalValidatedJson(req): OptionalValidatedJson<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>)> {
    let title = req.and_then(|r| r.title);
    let created = state.conversations.create_conversation(title).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List conversations, most recently active first
pub async fn list_conversations(
    State(state): State<ConversationsState>,
) -> Result<Json<Vec<ConversationResponse>>> {
    let convs = state.conversations.list_conversations().await?;

    let responses: Vec<ConversationResponse> = convs.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Delete a conversation and its messages
pub async fn delete_conversation(
    State(state): State<ConversationsState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConversationResponse>> {
    state.conversations.delete_conversation(&id).await?;
    Ok(Json(DeleteConversationResponse { status: "deleted" }))
}
