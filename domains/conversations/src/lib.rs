//! Conversations domain: chat threads, messages, reply orchestration

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Conversation, Message, MessageRole, DEFAULT_TITLE};
pub use domain::orchestrator::{ChatSettings, ReplyChunk, ReplyOrchestrator};
pub use domain::service::ConversationService;

// Re-export repository types
pub use repository::{
    ConversationStore, InMemoryConversationStore, PgConversationStore, StoreFactory,
};

// Re-export API types
pub use api::routes::routes;
pub use api::ConversationsState;
