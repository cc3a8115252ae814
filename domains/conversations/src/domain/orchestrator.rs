//! Reply orchestration
//!
//! Records the user's turn, asks the completion provider for a reply and
//! records the assistant's turn. Provider failures never reach the caller:
//! they become a fallback reply stored like any other assistant message.

use std::sync::Arc;
use std::time::Duration;

use futures_core::Stream;
use nexo_common::{Error, Result};
use nexo_llm::{CompletionRequest, LlmError, LlmMessage, LlmService};

use crate::domain::entities::Message;
use crate::repository::ConversationStore;

/// Tuning for reply delivery
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Pause between streamed fragments; presentation only
    pub chunk_delay: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            chunk_delay: Duration::from_millis(20),
        }
    }
}

/// One unit of a streamed reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyChunk {
    /// A fragment of reply text
    Content(String),
    /// The reply could not be stored
    Error(String),
    /// End of stream; always last and emitted once
    Done,
}

/// Drives a single send-message exchange
#[derive(Clone)]
pub struct ReplyOrchestrator {
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmService>,
    settings: ChatSettings,
}

impl ReplyOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        llm: Arc<dyn LlmService>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            store,
            llm,
            settings,
        }
    }

    /// Send a message and wait for the complete reply.
    ///
    /// Returns the stored assistant message.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        content: String,
        image_data: Option<String>,
    ) -> Result<Message> {
        let user_message = self
            .record_user_message(conversation_id, content, image_data)
            .await?;

        let reply = self.generate_reply(&user_message).await;

        persist_assistant(self.store.as_ref(), conversation_id, reply).await
    }

    /// Send a message and deliver the reply as a stream of fragments.
    ///
    /// Validation and unknown-conversation errors are returned before any
    /// fragment is produced. The assistant message is stored only once the
    /// last fragment has been handed out, so dropping the stream early
    /// stores nothing for the assistant.
    pub async fn send_message_stream(
        &self,
        conversation_id: &str,
        content: String,
        image_data: Option<String>,
    ) -> Result<impl Stream<Item = ReplyChunk> + Send + 'static> {
        let user_message = self
            .record_user_message(conversation_id, content, image_data)
            .await?;

        let reply = self.generate_reply(&user_message).await;
        let fragments = self.llm.fragments(&reply);

        let store = Arc::clone(&self.store);
        let delay = self.settings.chunk_delay;
        let conversation_id = user_message.conversation_id;

        Ok(async_stream::stream! {
            let total = fragments.len();
            for (index, fragment) in fragments.into_iter().enumerate() {
                yield ReplyChunk::Content(fragment);
                if index + 1 < total && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            if let Err(e) = persist_assistant(store.as_ref(), &conversation_id, reply).await {
                tracing::error!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Failed to store streamed reply"
                );
                yield ReplyChunk::Error("Failed to save the assistant reply".to_string());
            }

            yield ReplyChunk::Done;
        })
    }

    /// Validate input, check the conversation exists, store the user turn
    async fn record_user_message(
        &self,
        conversation_id: &str,
        content: String,
        image_data: Option<String>,
    ) -> Result<Message> {
        if conversation_id.trim().is_empty() {
            return Err(Error::Validation(
                "conversation_id is required".to_string(),
            ));
        }

        let message = Message::new_user(conversation_id, content, image_data)?;

        self.store
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

        let created = self.store.create_message(&message).await?;
        self.store
            .touch_conversation(conversation_id, created.timestamp)
            .await?;

        tracing::debug!(
            conversation_id = %conversation_id,
            message_id = %created.id,
            "Stored user message"
        );
        Ok(created)
    }

    /// Ask the provider for reply text, substituting a fallback on failure
    async fn generate_reply(&self, user_message: &Message) -> String {
        let request = CompletionRequest {
            messages: vec![LlmMessage::user(user_message.content.clone())],
            ..CompletionRequest::default()
        };

        let result = match self.llm.complete(request).await {
            Ok(response) if response.content.trim().is_empty() => Err(LlmError::Response(
                "Provider returned an empty reply".to_string(),
            )),
            Ok(response) => Ok(response),
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                tracing::debug!(
                    conversation_id = %user_message.conversation_id,
                    model = %response.model,
                    output_tokens = ?response.output_tokens,
                    "Completion succeeded"
                );
                response.content
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %user_message.conversation_id,
                    error = %e,
                    "Completion failed, using fallback reply"
                );
                e.fallback_reply()
            }
        }
    }
}

async fn persist_assistant(
    store: &dyn ConversationStore,
    conversation_id: &str,
    reply: String,
) -> Result<Message> {
    let message = Message::new_assistant(conversation_id, reply)?;
    let created = store.create_message(&message).await?;
    store
        .touch_conversation(conversation_id, created.timestamp)
        .await?;

    tracing::info!(
        conversation_id = %conversation_id,
        message_id = %created.id,
        "Stored assistant reply"
    );
    Ok(created)
}
