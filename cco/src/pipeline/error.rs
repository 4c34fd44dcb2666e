//! Stage failure types

use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Profile,
    Billing,
    Analysis,
    Recommendations,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Profile => "profile",
            Stage::Billing => "billing",
            Stage::Analysis => "analysis",
            Stage::Recommendations => "recommendations",
        };
        write!(f, "{}", s)
    }
}

/// Coarse classification of a failure, for callers that branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Configuration,
    InvalidRequest,
    Transport,
    Protocol,
    Extraction,
    ShapeMismatch,
    Prompt,
}

/// Why a stage produced no value
///
/// The display form names the stage and carries the underlying detail, so
/// it can be shown to the user as-is.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage} stage failed: {source}")]
    Llm { stage: Stage, source: LlmError },

    #[error("{stage} stage failed: no JSON value found in model response: {snippet}")]
    Extraction { stage: Stage, snippet: String },

    #[error("{stage} stage failed: expected {expected}, got {found}")]
    ShapeMismatch {
        stage: Stage,
        expected: &'static str,
        found: String,
    },

    #[error("{stage} stage failed: {message}")]
    Prompt { stage: Stage, message: String },
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Llm { stage, .. }
            | StageError::Extraction { stage, .. }
            | StageError::ShapeMismatch { stage, .. }
            | StageError::Prompt { stage, .. } => *stage,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            StageError::Llm { source, .. } => match source {
                LlmError::Configuration(_) => FailureKind::Configuration,
                LlmError::InvalidRequest(_) => FailureKind::InvalidRequest,
                LlmError::Transport { .. } => FailureKind::Transport,
                LlmError::Protocol(_) => FailureKind::Protocol,
            },
            StageError::Extraction { .. } => FailureKind::Extraction,
            StageError::ShapeMismatch { .. } => FailureKind::ShapeMismatch,
            StageError::Prompt { .. } => FailureKind::Prompt,
        }
    }
}
