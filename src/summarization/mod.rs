//! Abstractions for summarizing extracted text via a chat completions provider.
//!
//! The prompt is fixed: a system message framing the model as an OCR summary assistant and a
//! user message carrying the text verbatim after [`USER_PROMPT_PREFIX`]. The OpenAI-compatible
//! client issues the HTTP request directly with `reqwest`.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// System instruction sent ahead of every summarization request.
pub const SYSTEM_PROMPT: &str =
    "You're an OCR summary assistant. Clean and summarize the extracted text.";
/// Prefix placed before the caller's text in the user message.
pub const USER_PROMPT_PREFIX: &str = "Summarize this OCR result:\n\n";
/// Sampling temperature for summaries.
pub const SUMMARY_TEMPERATURE: f32 = 0.5;
/// Hard cap on generated tokens.
pub const SUMMARY_MAX_TOKENS: u32 = 200;

/// Errors surfaced while attempting summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider could not be reached.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or carried no content.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Role attached to a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instruction framing the assistant.
    System,
    /// End-user content.
    User,
}

/// One role-tagged message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
}

/// Chat completion request as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Ordered conversation.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens the provider may generate.
    pub max_tokens: u32,
}

/// Build the fixed two-message summarization request for `text`.
pub fn build_summary_request(model: &str, text: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: ChatRole::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: format!("{USER_PROMPT_PREFIX}{text}"),
            },
        ],
        temperature: SUMMARY_TEMPERATURE,
        max_tokens: SUMMARY_MAX_TOKENS,
    }
}

/// Interface implemented by chat completion providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Run the completion and return the content of the first choice.
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Client for OpenAI-compatible `/v1/chat/completions` endpoints.
pub struct OpenAiSummarizationClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiSummarizationClient {
    /// Build a client from the API key and base URL in `config`.
    pub fn new(config: &Config) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent("ocr-summary/summary")
            .build()
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to construct HTTP client: {error}"
                ))
            })?;
        tracing::debug!(
            base_url = %config.openai_base_url,
            model = %config.openai_model,
            "Initialized chat completions client"
        );
        Ok(Self::with_http(
            http,
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
        ))
    }

    fn with_http(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl SummarizationClient for OpenAiSummarizationClient {
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<String, SummarizationClientError> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "provider returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode completion response: {error}"
            ))
        })?;

        body.choices
            .into_iter()
            .next()
            .ok_or_else(|| SummarizationClientError::InvalidResponse("no choices returned".into()))?
            .message
            .content
            .ok_or_else(|| {
                SummarizationClientError::InvalidResponse("first choice has no content".into())
            })
    }
}
