//! Nexo Completion Provider
//!
//! Turns user text into assistant reply text with support for:
//! - OpenAI-compatible chat completions over HTTP for production
//! - Mock service (echo, canned greeting, simulated typing) for testing and development
//! - Deterministic fallback replies when the upstream call fails

pub mod chat_completions;
pub mod mock;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use chat_completions::ChatCompletionsService;
pub use mock::{MockLlmService, MockMode};

const DEFAULT_BASE_URL: &str = "https://api.emergent.run";
const DEFAULT_MODEL: &str = "claude-3.5-sonnet";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request timed out")]
    Timeout,

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response error: {0}")]
    Response(String),
}

impl LlmError {
    /// User-visible reply substituted for a failed completion.
    ///
    /// Stored as the assistant turn, so it must stay stable for a given failure.
    pub fn fallback_reply(&self) -> String {
        match self {
            LlmError::Timeout => {
                "⚠️ The AI service took too long to respond. Please try again.".to_string()
            }
            LlmError::Status { status, .. } => format!("❌ AI error ({})", status),
            LlmError::Request(detail) => format!("❌ Connection error: {}", detail),
            LlmError::Response(_) => "❌ AI returned an unreadable response".to_string(),
            LlmError::Configuration(_) => "❌ AI service is not configured".to_string(),
        }
    }
}

/// Message author as seen by the completion API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    System,
    User,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::System => "system",
            LlmRole::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: content.into(),
        }
    }
}

/// A single completion call
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model override; empty means the provider default
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

/// Completion result
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub stop_reason: Option<String>,
}

/// Completion provider configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// Provider (http, mock)
    pub provider: String,
    /// Bearer credential for the upstream API
    pub api_key: String,
    /// Upstream base URL; `/v1/chat/completions` is appended
    pub base_url: String,
    pub default_model: String,
    pub max_tokens: u32,
    /// Whole-request timeout for the upstream call
    pub timeout: Duration,
    pub system_prompt: Option<String>,
    pub mock_mode: MockMode,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("system_prompt", &self.system_prompt)
            .field("mock_mode", &self.mock_mode)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            system_prompt: None,
            mock_mode: MockMode::default(),
        }
    }
}

impl LlmConfig {
    /// Create provider config from environment variables.
    pub fn from_env() -> Result<Self, LlmError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build provider config from an arbitrary key lookup.
    ///
    /// Without an explicit `LLM_PROVIDER`, the live provider is chosen only
    /// when an API key is present.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("LLM_API_KEY")
            .map(|k| k.trim().to_string())
            .unwrap_or_default();

        let provider = lookup("LLM_PROVIDER")
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| {
                if api_key.is_empty() {
                    "mock".to_string()
                } else {
                    "http".to_string()
                }
            });

        let mock_mode = match lookup("LLM_MOCK_MODE") {
            Some(mode) => mode.parse()?,
            None => MockMode::default(),
        };

        let timeout_secs = lookup("LLM_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            provider,
            api_key,
            base_url: lookup("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: lookup("LLM_MAX_TOKENS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(timeout_secs),
            system_prompt: lookup("LLM_SYSTEM_PROMPT").filter(|p| !p.trim().is_empty()),
            mock_mode,
        })
    }
}

/// Completion provider capability.
///
/// Callers depend only on this trait, never on which variant is active.
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Produce reply text for the given conversation turn(s)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Split reply text into fragments for incremental delivery.
    ///
    /// Fragments must concatenate back to `text`.
    fn fragments(&self, text: &str) -> Vec<String> {
        split_after_whitespace(text)
    }

    /// Model used when a request does not name one
    fn default_model(&self) -> &str;
}

/// Split text into word-sized fragments, keeping each trailing whitespace run
/// attached to the word before it.
pub fn split_after_whitespace(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut in_whitespace = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            in_whitespace = true;
        } else if in_whitespace {
            fragments.push(std::mem::take(&mut current));
            in_whitespace = false;
        }
        current.push(ch);
    }

    if !current.is_empty() {
        fragments.push(current);
    }
    fragments
}

/// Factory for creating LlmService implementations.
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create an LlmService based on configuration.
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "http" | "openai" => {
                tracing::info!(
                    base_url = %config.base_url,
                    model = %config.default_model,
                    "Creating chat completions service"
                );
                Ok(Box::new(ChatCompletionsService::new(config)?))
            }
            "mock" => {
                tracing::info!(mode = ?config.mock_mode, "Creating mock LLM service");
                Ok(Box::new(MockLlmService::new(config.mock_mode)))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}
