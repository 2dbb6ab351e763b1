//! OpenAI-compatible chat-completion provider.
//!
//! Works against any endpoint implementing `POST {base_url}/chat/completions` with a
//! `usage` block in the response (Groq, OpenAI, vLLM, Ollama's compatibility layer).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::provider::{ChatTurn, CompletionProvider, ProviderError, ProviderReply};
use crate::config::{ConfigurationError, LlmConfig};

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigurationError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigurationError::missing_required_field("llm.api_key", "llm"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                ConfigurationError::invalid_value(
                    "llm.request_timeout_seconds",
                    config.request_timeout_seconds.to_string(),
                    format!("Failed to build HTTP client: {e}"),
                )
            })?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

fn parse_reply(body: &str) -> Result<ProviderReply, ProviderError> {
    let api_response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let text = api_response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::MalformedResponse("no choices returned".to_string()))?;

    let usage = api_response
        .usage
        .ok_or_else(|| ProviderError::MalformedResponse("missing usage block".to_string()))?;

    Ok(ProviderReply {
        text,
        tokens_used: usage.total_tokens,
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
    })
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    async fn complete(
        &self,
        turns: &[ChatTurn],
        token_budget: u32,
    ) -> Result<ProviderReply, ProviderError> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": turns,
            "max_tokens": token_budget,
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let preview: String = text.chars().take(200).collect();
        debug!(
            model = %self.model,
            response_preview = %preview,
            "Completion response received"
        );

        parse_reply(&text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
