//! Route definitions for Conversations domain API

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{chat, conversations, messages, uploads};
use super::middleware::ConversationsState;

/// Create conversation routes
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            "/api/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/api/conversations/{id}",
            delete(conversations::delete_conversation),
        )
}

/// Create message routes
fn message_routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            "/api/conversations/{conversation_id}/messages",
            get(messages::list_messages),
        )
        .route("/api/chat/send", post(chat::send_message))
}

/// Create upload routes
fn upload_routes() -> Router<ConversationsState> {
    Router::new().route("/api/upload", post(uploads::upload_file))
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
        .merge(upload_routes())
}
