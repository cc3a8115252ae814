//! In-memory conversation store
//!
//! Process-local and non-durable. Used for local development and tests.
//! Thread-safe via `Arc<Mutex<>>`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use nexo_common::{Error, Result};

use super::ConversationStore;
use crate::domain::entities::{Conversation, Message};

#[derive(Default)]
struct Inner {
    conversations: HashMap<String, Conversation>,
    /// Kept in insertion order so equal timestamps sort stably
    messages: Vec<Message>,
}

/// Conversation store held entirely in memory
#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("In-memory store lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let inner = self.lock()?;
        let mut convs: Vec<Conversation> = inner.conversations.values().cloned().collect();
        convs.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(convs)
    }

    async fn find_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.lock()?.conversations.get(id).cloned())
    }

    async fn create_conversation(&self, conversation: &Conversation) -> Result<Conversation> {
        let mut inner = self.lock()?;
        if inner.conversations.contains_key(&conversation.id) {
            return Err(Error::Internal(format!(
                "Conversation {} already exists",
                conversation.id
            )));
        }
        inner
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation.clone())
    }

    async fn touch_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.conversations.get_mut(id) {
            Some(conv) => {
                conv.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_conversation(&self, id: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        if inner.conversations.remove(id).is_none() {
            return Ok(false);
        }
        inner.messages.retain(|m| m.conversation_id != id);
        Ok(true)
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let inner = self.lock()?;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn create_message(&self, message: &Message) -> Result<Message> {
        let mut inner = self.lock()?;
        if !inner.conversations.contains_key(&message.conversation_id) {
            return Err(Error::NotFound("Conversation not found".to_string()));
        }
        inner.messages.push(message.clone());
        Ok(message.clone())
    }

    async fn close(&self) {}
}
