//! Repository implementations for Conversations domain
//!
//! Persistence goes through [`ConversationStore`]. Two backends exist:
//! Postgres ([`PgConversationStore`]) and an in-memory map
//! ([`InMemoryConversationStore`]). [`StoreFactory`] picks one from config.

pub mod conversations;
pub mod memory;
pub mod messages;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nexo_common::{Config, Error, Result, StoreProvider};
use sqlx::PgPool;

use crate::domain::entities::{Conversation, Message};

pub use conversations::ConversationRepository;
pub use memory::InMemoryConversationStore;
pub use messages::MessageRepository;

/// Storage capability for conversations and their messages
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// All conversations, most recently updated first
    async fn list_conversations(&self) -> Result<Vec<Conversation>>;

    async fn find_conversation(&self, id: &str) -> Result<Option<Conversation>>;

    async fn create_conversation(&self, conversation: &Conversation) -> Result<Conversation>;

    /// Set `updated_at`; returns false when the conversation is unknown
    async fn touch_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<bool>;

    /// Remove a conversation and all of its messages atomically.
    /// Returns false when the conversation is unknown.
    async fn delete_conversation(&self, id: &str) -> Result<bool>;

    /// Messages of a conversation in chronological order; empty for unknown ids
    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;

    async fn create_message(&self, message: &Message) -> Result<Message>;

    /// Release backend resources
    async fn close(&self);
}

/// Postgres-backed store, one repository per table
#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
    pub conversations: ConversationRepository,
    pub messages: MessageRepository,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect, then apply the bootstrap schema
    pub async fn connect(database_url: &str, database_name: Option<&str>) -> Result<Self> {
        let pool = nexo_common::db::connect(database_url, database_name).await?;

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::Internal(format!("Failed to apply migrations: {}", e)))?;

        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl ConversationStore for PgConversationStore {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.conversations.list().await
    }

    async fn find_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        self.conversations.find(id).await
    }

    async fn create_conversation(&self, conversation: &Conversation) -> Result<Conversation> {
        self.conversations.create(conversation).await
    }

    async fn touch_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        self.conversations.touch(id, at).await
    }

    async fn delete_conversation(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let removed_messages = messages::delete_by_conversation_tx(&mut tx, id).await?;
        let deleted = conversations::delete_conversation_tx(&mut tx, id).await?;

        tx.commit().await?;

        if deleted {
            tracing::debug!(conversation_id = %id, removed_messages, "Deleted conversation");
        }
        Ok(deleted)
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.messages.list_by_conversation(conversation_id).await
    }

    async fn create_message(&self, message: &Message) -> Result<Message> {
        self.messages.create(message).await
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}

/// Factory for creating ConversationStore implementations.
pub struct StoreFactory;

impl StoreFactory {
    /// Create a ConversationStore based on configuration.
    ///
    /// Connection failures are returned to the caller, which treats them as fatal.
    pub async fn create(config: &Config) -> Result<Arc<dyn ConversationStore>> {
        match config.store_provider {
            StoreProvider::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    Error::Internal("DATABASE_URL is required for the postgres store".to_string())
                })?;
                tracing::info!("Creating Postgres conversation store");
                let store =
                    PgConversationStore::connect(url, config.database_name.as_deref()).await?;
                Ok(Arc::new(store))
            }
            StoreProvider::Memory => {
                tracing::info!("Creating in-memory conversation store");
                Ok(Arc::new(InMemoryConversationStore::new()))
            }
        }
    }
}
