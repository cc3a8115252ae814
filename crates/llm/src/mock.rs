//! Mock LLM Service Implementation
//!
//! Used by `LlmServiceFactory` when provider is `"mock"`.
//! Returns deterministic responses for testing and offline development.

use std::str::FromStr;

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService};

const MOCK_MODEL: &str = "mock-model";

const GREETING: &str = "Hello! I'm Nexo, your AI assistant. How can I help you today?";

/// How the mock shapes its replies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MockMode {
    /// `"Echo: <last user message>"`
    #[default]
    Echo,
    /// Fixed greeting regardless of input
    Greeting,
    /// Echo text, streamed one character at a time
    Typing,
}

impl FromStr for MockMode {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "echo" => Ok(MockMode::Echo),
            "greeting" => Ok(MockMode::Greeting),
            "typing" => Ok(MockMode::Typing),
            other => Err(LlmError::Configuration(format!(
                "Unknown mock mode: {}. Supported modes: echo, greeting, typing",
                other
            ))),
        }
    }
}

/// Mock LLM service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    mode: MockMode,
}

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new(mode: MockMode) -> Self {
        Self { mode }
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!(mode = ?self.mode, "Mock LLM service processing completion request");

        let model = if request.model.is_empty() {
            MOCK_MODEL.to_string()
        } else {
            request.model
        };

        let last_message = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let content = match self.mode {
            MockMode::Echo | MockMode::Typing => format!("Echo: {}", last_message),
            MockMode::Greeting => GREETING.to_string(),
        };

        let input_tokens = request
            .messages
            .iter()
            .map(|m| m.content.len() as u32 / 4)
            .sum::<u32>();
        let output_tokens = content.len() as u32 / 4;

        Ok(CompletionResponse {
            content,
            model,
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            stop_reason: Some("stop".to_string()),
        })
    }

    fn fragments(&self, text: &str) -> Vec<String> {
        match self.mode {
            MockMode::Typing => text.chars().map(String::from).collect(),
            _ => crate::split_after_whitespace(text),
        }
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }
}
