//! # Token-Tracking Completion Client
//!
//! Wraps a [`CompletionProvider`] and keeps a session-wide ledger of token usage.
//! Only successful calls touch the ledger; failures are returned untouched and are
//! never retried here.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::provider::{ChatTurn, CompletionProvider, ProviderError, ProviderReply};

/// Running token totals for one client instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokenLedger {
    pub session_total: u64,
    pub per_call_history: Vec<u64>,
}

impl SessionTokenLedger {
    fn record(&mut self, tokens: u64) {
        self.session_total += tokens;
        self.per_call_history.push(tokens);
    }

    fn stats(&self) -> TokenStats {
        let calls = self.per_call_history.len() as u64;
        TokenStats {
            session_total: self.session_total,
            questions_asked: calls,
            average_per_question: if calls == 0 {
                0
            } else {
                self.session_total / calls
            },
            last_call: self.per_call_history.last().copied().unwrap_or(0),
        }
    }
}

/// Snapshot of the ledger.
///
/// `questions_asked` counts completion calls, matching how the ledger is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStats {
    pub session_total: u64,
    pub questions_asked: u64,
    pub average_per_question: u64,
    pub last_call: u64,
}

pub struct TokenTrackingClient {
    provider: Arc<dyn CompletionProvider>,
    ledger: Mutex<SessionTokenLedger>,
}

impl TokenTrackingClient {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            ledger: Mutex::new(SessionTokenLedger::default()),
        }
    }

    /// Run one chat completion and record its token usage on success
    pub async fn complete(
        &self,
        turns: &[ChatTurn],
        token_budget: u32,
    ) -> Result<ProviderReply, ProviderError> {
        if turns.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "at least one chat turn is required".to_string(),
            ));
        }
        if token_budget == 0 {
            return Err(ProviderError::InvalidRequest(
                "token budget must be greater than zero".to_string(),
            ));
        }

        match self.provider.complete(turns, token_budget).await {
            Ok(reply) => {
                self.ledger.lock().record(reply.tokens_used);
                debug!(
                    model = %self.provider.model(),
                    tokens_used = reply.tokens_used,
                    prompt_tokens = reply.prompt_tokens,
                    completion_tokens = reply.completion_tokens,
                    "Completion recorded"
                );
                Ok(reply)
            }
            Err(e) if e.is_auth_or_quota() => {
                error!(
                    model = %self.provider.model(),
                    error = %e,
                    "Completion rejected; check the API key and quota"
                );
                Err(e)
            }
            Err(e) => {
                warn!(model = %self.provider.model(), error = %e, "Completion failed");
                Err(e)
            }
        }
    }

    pub fn get_stats(&self) -> TokenStats {
        self.ledger.lock().stats()
    }

    /// Clear totals and history. Meant for use between sessions, not mid-question.
    pub fn reset_session(&self) {
        let mut ledger = self.ledger.lock();
        *ledger = SessionTokenLedger::default();
        debug!("Token ledger reset");
    }

    pub fn ledger_snapshot(&self) -> SessionTokenLedger {
        self.ledger.lock().clone()
    }
}
