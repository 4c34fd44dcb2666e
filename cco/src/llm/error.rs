//! LLM error types

use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing or unusable credentials/settings. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request failed a local precondition and was never sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP failure, after all attempts were used up
    #[error("Transport error after {attempts} attempt(s): {detail}")]
    Transport {
        attempts: u32,
        detail: String,
        /// Body of the last non-2xx response, if one was received
        body: Option<String>,
    },

    /// The endpoint answered but the payload did not have the expected shape
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl LlmError {
    /// A single failed attempt; the retry policy fills in the final count
    pub fn transport(detail: impl Into<String>, body: Option<String>) -> Self {
        LlmError::Transport {
            attempts: 1,
            detail: detail.into(),
            body,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport { .. } => true,
            LlmError::Configuration(_) => false,
            LlmError::InvalidRequest(_) => false,
            LlmError::Protocol(_) => false,
        }
    }

    /// Record how many attempts were made before giving up
    pub fn with_attempts(self, n: u32) -> Self {
        match self {
            LlmError::Transport { detail, body, .. } => LlmError::Transport {
                attempts: n,
                detail,
                body,
            },
            other => other,
        }
    }

    /// Number of attempts for a transport error
    pub fn attempts(&self) -> Option<u32> {
        match self {
            LlmError::Transport { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Response body captured from the last failed attempt
    pub fn last_body(&self) -> Option<&str> {
        match self {
            LlmError::Transport { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        let detail = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            e.to_string()
        };
        LlmError::transport(detail, None)
    }
}
