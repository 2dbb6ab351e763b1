//! # Language-Model Access
//!
//! - [`CompletionProvider`]: the seam to any chat-completion backend
//! - [`OpenAiCompatibleProvider`]: HTTP implementation for OpenAI-style endpoints
//! - [`TokenTrackingClient`]: wraps a provider and keeps the session token ledger

pub mod openai_compatible;
pub mod provider;
pub mod token_tracking;

pub use openai_compatible::OpenAiCompatibleProvider;
pub use provider::{ChatRole, ChatTurn, CompletionProvider, ProviderError, ProviderReply};
pub use token_tracking::{SessionTokenLedger, TokenStats, TokenTrackingClient};
