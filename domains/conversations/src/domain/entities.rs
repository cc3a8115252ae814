//! Domain entities for Conversations domain
//!
//! Conversations group an ordered sequence of messages. Each entity
//! validates its own fields on construction.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nexo_common::{Error, Result};

/// Title applied when the caller omits one or sends only whitespace
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Maximum title length (varchar(200))
const MAX_TITLE_LENGTH: usize = 200;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation, applying the default title when needed
    pub fn new(title: Option<String>) -> Result<Self> {
        let title = match title {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => DEFAULT_TITLE.to_string(),
        };

        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(Error::Validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        let now = Utc::now();
        Ok(Conversation {
            id: Uuid::new_v4().to_string(),
            title,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub image_data: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn new_user(
        conversation_id: &str,
        content: String,
        image_data: Option<String>,
    ) -> Result<Self> {
        Self::validate_content(&content)?;
        if let Some(ref data) = image_data {
            validate_image_data(data)?;
        }

        Ok(Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role: MessageRole::User,
            content,
            image_data,
            timestamp: Utc::now(),
        })
    }

    /// Create a new assistant message
    pub fn new_assistant(conversation_id: &str, content: String) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role: MessageRole::Assistant,
            content,
            image_data: None,
            timestamp: Utc::now(),
        })
    }

    /// Validate message content (CHECK (length(trim(content)) > 0))
    fn validate_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check that inline image data decodes as base64.
///
/// Accepts an optional `data:<mime>;base64,` prefix.
pub fn validate_image_data(data: &str) -> Result<()> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| Error::Validation("Image data URL must be base64 encoded".to_string()))?,
        None => data,
    };

    if payload.trim().is_empty() {
        return Err(Error::Validation("Image data cannot be empty".to_string()));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|_| Error::Validation("Image data is not valid base64".to_string()))?;
    Ok(())
}
