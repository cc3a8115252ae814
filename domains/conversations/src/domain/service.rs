//! Conversation management over a [`ConversationStore`]

use std::sync::Arc;

use nexo_common::{Error, Result};

use crate::domain::entities::{Conversation, Message};
use crate::repository::ConversationStore;

/// CRUD over conversations and their message history
#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
}

impl ConversationService {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    pub async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.store.list_conversations().await
    }

    /// Create a conversation; a missing or blank title gets the default
    pub async fn create_conversation(&self, title: Option<String>) -> Result<Conversation> {
        let conversation = Conversation::new(title)?;
        let created = self.store.create_conversation(&conversation).await?;

        tracing::info!(conversation_id = %created.id, "Created conversation");
        Ok(created)
    }

    /// Delete a conversation and all its messages
    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        if !self.store.delete_conversation(id).await? {
            return Err(Error::NotFound("Conversation not found".to_string()));
        }

        tracing::info!(conversation_id = %id, "Deleted conversation");
        Ok(())
    }

    /// Message history, oldest first. Unknown ids yield an empty list.
    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.store.list_messages(conversation_id).await
    }
}
