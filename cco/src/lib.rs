//! Cloud Cost Optimizer - LLM-driven cloud cost analysis
//!
//! Chains calls to a text-generation endpoint into a four-stage pipeline:
//! a free-text project description becomes a structured profile, the profile
//! becomes a synthetic month of billing records, the records are aggregated
//! against the budget, and the summary is turned into savings advice.
//!
//! # Modules
//!
//! - [`llm`] - completion client trait, HTTP implementation and retry policy
//! - [`extract`] - recovering JSON from free-form model output
//! - [`domain`] - profile, billing, recommendation and report records
//! - [`prompts`] - stage prompt templates
//! - [`pipeline`] - the stages and the runner that chains them
//! - [`store`] - JSON artifacts passed between CLI invocations
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod store;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use domain::{BillingRecord, CostSummary, ProjectProfile, Recommendation, Report};
pub use extract::{Extracted, extract};
pub use llm::{ChatCompletionsClient, LlmClient, LlmError, create_client};
pub use pipeline::{FailureKind, Pipeline, PipelineRun, Stage, StageError, analyze_costs};
pub use store::ArtifactStore;
