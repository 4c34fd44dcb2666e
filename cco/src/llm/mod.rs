//! LLM client module
//!
//! Provides the completion client trait, the HTTP implementation for
//! OpenAI-style chat endpoints, and the retry policy that wraps it.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod openai;
pub mod retry;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::ChatCompletionsClient;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, TokenUsage};

use crate::config::LlmConfig;
use crate::config::RetryConfig;

/// Create an LLM client from configuration
///
/// Resolves the credential first, so a missing token fails here before any
/// network attempt is made.
pub fn create_client(config: &LlmConfig, retry: &RetryConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(model = %config.model, base_url = %config.base_url, "create_client: called");
    let resolved = config.resolve(retry)?;
    Ok(Arc::new(ChatCompletionsClient::from_config(&resolved)?))
}
