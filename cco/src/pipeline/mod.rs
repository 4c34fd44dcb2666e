//! Cost optimization pipeline
//!
//! Four stages run in a fixed order, each consuming the previous one's output:
//!
//! 1. [`Pipeline::extract_profile`] - free text to [`ProjectProfile`]
//! 2. [`Pipeline::generate_billing`] - profile to synthetic billing records
//! 3. [`analyze_costs`] - pure aggregation against the budget
//! 4. [`Pipeline::generate_recommendations`] - profile and summary to advice
//!
//! A stage either yields its value or a [`StageError`]; the first failure
//! ends the run.

mod analysis;
mod billing;
mod error;
mod profile;
mod recommend;

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub use analysis::{analyze_costs, summarize};
pub use billing::{BILLING_WRAPPER_KEYS, billing_records};
pub use error::{FailureKind, Stage, StageError};
pub use profile::profile_from;
pub use recommend::{RECOMMENDATIONS_WRAPPER_KEY, recommendations_from};

use crate::config::{Config, GenerationConfig, StagesConfig};
use crate::domain::{BillingRecord, ProjectProfile, Report};
use crate::extract::{self, Extracted};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

/// Length of the response excerpt carried by extraction failures
const SNIPPET_CHARS: usize = 200;

/// Artifacts of one complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub profile: ProjectProfile,
    pub billing: Vec<BillingRecord>,
    pub report: Report,
}

/// Runs the stages against one completion client
///
/// Holds no per-run state, so one pipeline can drive several runs at once.
pub struct Pipeline {
    client: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    stages: StagesConfig,
    default_budget: u64,
}

impl Pipeline {
    pub fn new(client: Arc<dyn LlmClient>, prompts: PromptLoader, stages: StagesConfig, default_budget: u64) -> Self {
        debug!(default_budget, "Pipeline::new: called");
        Self {
            client,
            prompts,
            stages,
            default_budget,
        }
    }

    /// Build a pipeline from loaded configuration
    pub fn from_config(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        let prompts = PromptLoader::new(&config.pipeline.prompts_root);
        Self::new(client, prompts, config.stages.clone(), config.pipeline.default_budget)
    }

    /// Run every stage for one project description
    pub async fn run(&self, description: &str) -> Result<PipelineRun, StageError> {
        let run_id = Uuid::now_v7();
        let span = info_span!("run", %run_id);
        async {
            info!("Starting pipeline run");
            let profile = self.extract_profile(description).await?;
            let billing = self.generate_billing(&profile).await?;
            let analysis = analyze_costs(&profile, &billing);
            let recommendations = self.generate_recommendations(&profile, &analysis).await?;
            let report = Report::build(&profile, analysis, recommendations);
            info!(
                project = %report.project_name,
                recommendations = report.recommendations_count,
                savings = report.total_potential_savings,
                "Pipeline run complete"
            );
            Ok(PipelineRun {
                profile,
                billing,
                report,
            })
        }
        .instrument(span)
        .await
    }

    /// Run several descriptions concurrently; results keep input order
    pub async fn run_many(&self, descriptions: &[String]) -> Vec<Result<PipelineRun, StageError>> {
        debug!(count = descriptions.len(), "Pipeline::run_many: called");
        join_all(descriptions.iter().map(|d| self.run(d))).await
    }

    /// Render a template, ask the model, and pull the JSON out of its reply
    ///
    /// Never returns [`Extracted::NotFound`]; that case becomes
    /// [`StageError::Extraction`].
    async fn ask<C: Serialize>(
        &self,
        stage: Stage,
        template: &str,
        context: &C,
        generation: GenerationConfig,
    ) -> Result<Extracted, StageError> {
        debug!(%stage, %template, "Pipeline::ask: called");
        let prompt_error = |e: eyre::Report| StageError::Prompt {
            stage,
            message: e.to_string(),
        };
        let prompt = self.prompts.render(template, context).map_err(prompt_error)?;
        let system = self.prompts.system_prompt().map_err(prompt_error)?;

        let request = CompletionRequest::user(prompt, generation.max_tokens, generation.temperature).with_system(system);
        let response = self
            .client
            .complete(request)
            .await
            .map_err(|source| StageError::Llm { stage, source })?;

        let extracted = extract::extract(&response.content);
        if !extracted.is_found() {
            warn!(%stage, "No JSON value in model response");
            return Err(StageError::Extraction {
                stage,
                snippet: extract::snippet(&response.content, SNIPPET_CHARS),
            });
        }
        debug!(%stage, kind = extracted.kind(), "Pipeline::ask: extracted");
        Ok(extracted)
    }
}
