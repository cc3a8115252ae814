//! Conversations domain state

use std::sync::Arc;

use nexo_llm::LlmService;

use crate::domain::orchestrator::{ChatSettings, ReplyOrchestrator};
use crate::domain::service::ConversationService;
use crate::repository::ConversationStore;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub conversations: ConversationService,
    pub orchestrator: ReplyOrchestrator,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

impl ConversationsState {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        llm: Arc<dyn LlmService>,
        settings: ChatSettings,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            conversations: ConversationService::new(Arc::clone(&store)),
            orchestrator: ReplyOrchestrator::new(store, llm, settings),
            max_upload_bytes,
        }
    }
}
