//! LLM request/response types
//!
//! These model the OpenAI-style chat completions API, which is what the
//! Hugging Face router and most hosted inference endpoints speak.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The conversation, sent verbatim
    pub messages: Vec<Message>,

    /// Max tokens for the response
    pub max_tokens: u32,

    /// Sampling temperature, nominally 0.0..=1.0 (passed through unchecked)
    pub temperature: f32,
}

impl CompletionRequest {
    /// Single-turn request with one user message
    pub fn user(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            max_tokens,
            temperature,
        }
    }

    /// Prepend a system message
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.messages.insert(0, Message::system(system));
        self
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        debug!("Message::system: called");
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        debug!("Message::assistant: called");
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text of the first generated message
    pub content: String,

    /// Why the model stopped, if the endpoint said
    pub finish_reason: Option<String>,

    /// Token usage, if the endpoint reported it
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Plain text response with no usage data (used by scripted clients)
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: None,
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = Message::system("be strict");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be strict");

        let json = serde_json::to_value(Message::assistant("ok")).unwrap();
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn test_with_system_prepends() {
        let req = CompletionRequest::user("hello", 100, 0.2).with_system("You are a JSON generator");

        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.messages[1].role, Role::User);
        assert_eq!(req.messages[1].content, "hello");
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 120,
            output_tokens: 30,
        };
        assert_eq!(usage.total(), 150);
    }
}
