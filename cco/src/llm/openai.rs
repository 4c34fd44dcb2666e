//! OpenAI-compatible chat completions client
//!
//! Talks to any endpoint that implements `POST /v1/chat/completions`
//! (the Hugging Face router by default). Transport failures are retried
//! according to the configured [`RetryPolicy`]; protocol failures are not.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, TokenUsage};
use crate::config::ResolvedLlmConfig;
use crate::extract::snippet;

/// Longest slice of a bad response body quoted in error messages
const BODY_SNIPPET_CHARS: usize = 200;

/// Chat completions API client
pub struct ChatCompletionsClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ChatCompletionsClient {
    /// Create a new client from resolved configuration
    ///
    /// The credential has already been looked up by the time this runs, so
    /// the only failure left is an unusable setting.
    pub fn from_config(config: &ResolvedLlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }
        if config.base_url.trim().is_empty() {
            return Err(LlmError::Configuration("base-url is empty".to_string()));
        }

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            retry: config.retry,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the sleeper used between retries
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Build the request body for the chat completions API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "stream": false,
        })
    }

    /// One HTTP round-trip. Non-2xx and network failures are transport errors.
    async fn send_once(&self, url: &str, body: &serde_json::Value, attempt: u32) -> Result<ChatResponse, LlmError> {
        debug!(attempt, %url, "send_once: called");
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(attempt, status = status.as_u16(), "send_once: non-success status");
            return Err(LlmError::transport(
                format!("HTTP {}", status),
                if text.is_empty() { None } else { Some(text) },
            ));
        }

        let text = response.text().await?;
        serde_json::from_str::<ChatResponse>(&text).map_err(|e| {
            debug!(error = %e, "send_once: body is not a chat response");
            LlmError::Protocol(format!(
                "response body is not a chat completion ({}): {}",
                e,
                snippet(&text, BODY_SNIPPET_CHARS)
            ))
        })
    }

    /// Pull the first choice's text out of a decoded response
    fn parse_response(&self, api_response: ChatResponse) -> Result<CompletionResponse, LlmError> {
        debug!("parse_response: called");
        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Protocol("response has no choices".to_string()))?;

        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| LlmError::Protocol("response is missing choices[0].message.content".to_string()))?;

        if content.trim().is_empty() {
            return Err(LlmError::Protocol("choices[0].message.content is empty".to_string()));
        }

        Ok(CompletionResponse {
            content,
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, temperature = request.temperature, "complete: called");
        if request.messages.is_empty() {
            return Err(LlmError::InvalidRequest("conversation is empty".to_string()));
        }
        if request.max_tokens == 0 {
            return Err(LlmError::InvalidRequest("max_tokens must be greater than zero".to_string()));
        }

        let url = self.endpoint();
        let body = self.build_request_body(&request);

        let api_response = self
            .retry
            .run(self.sleeper.as_ref(), |attempt| self.send_once(&url, &body, attempt))
            .await?;

        let response = self.parse_response(api_response)?;
        info!(
            model = %self.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            finish_reason = ?response.finish_reason,
            "completion received"
        );
        Ok(response)
    }
}

// Chat completions API response types. Everything is optional so that a
// structurally odd body becomes a protocol error rather than a decode error.

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}
