use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::llm::{ChatTurn, CompletionProvider, ProviderError, ProviderReply};

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Result<ProviderReply, ProviderError>>,
    prompts: Vec<String>,
    budgets: Vec<u32>,
}

/// Completion provider that plays back a fixed sequence of replies and failures.
///
/// Calls past the end of the script fail with [`ProviderError::Unreachable`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply charging `tokens`
    pub fn reply(self, text: impl Into<String>, tokens: u64) -> Self {
        self.script.lock().replies.push_back(Ok(ProviderReply {
            text: text.into(),
            tokens_used: tokens,
            prompt_tokens: tokens / 2,
            completion_tokens: tokens - tokens / 2,
        }));
        self
    }

    /// Queue a failure
    pub fn failure(self, error: ProviderError) -> Self {
        self.script.lock().replies.push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().prompts.len()
    }

    /// Prompt text of every call so far, turns joined by newlines
    pub fn prompts(&self) -> Vec<String> {
        self.script.lock().prompts.clone()
    }

    /// Token budget passed with every call so far
    pub fn budgets(&self) -> Vec<u32> {
        self.script.lock().budgets.clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().replies.len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        turns: &[ChatTurn],
        token_budget: u32,
    ) -> Result<ProviderReply, ProviderError> {
        let prompt = turns
            .iter()
            .map(|turn| turn.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let mut script = self.script.lock();
        script.prompts.push(prompt);
        script.budgets.push(token_budget);
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Unreachable("script exhausted".to_string())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
