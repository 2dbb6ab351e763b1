use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a chat-completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Successful completion with the provider's token accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderReply {
    pub text: String,
    pub tokens_used: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Failures reported by a completion provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Provider rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Invalid completion request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Quota and authentication failures are reported by status code
    pub fn is_auth_or_quota(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if matches!(status, 401 | 403 | 429))
    }
}

/// A chat-completion backend with token accounting.
///
/// `token_budget` caps the reply length; enforcement is left to the provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        turns: &[ChatTurn],
        token_budget: u32,
    ) -> Result<ProviderReply, ProviderError>;

    /// Model identifier for logging
    fn model(&self) -> &str;
}
