//! Profile extraction stage

use tracing::{debug, info};

use super::{Pipeline, Stage, StageError};
use crate::domain::ProjectProfile;
use crate::extract::Extracted;
use crate::prompts::ProfilePrompt;

/// Turn the extracted reply into a profile; only an object will do
pub fn profile_from(extracted: Extracted, description: &str, default_budget: u64) -> Result<ProjectProfile, StageError> {
    match extracted {
        Extracted::Object(map) => Ok(ProjectProfile::from_object(&map, description, default_budget)),
        Extracted::NotFound => Err(StageError::Extraction {
            stage: Stage::Profile,
            snippet: String::new(),
        }),
        other => Err(StageError::ShapeMismatch {
            stage: Stage::Profile,
            expected: "object",
            found: other.kind().to_string(),
        }),
    }
}

impl Pipeline {
    /// Extract a structured project profile from a free-text description
    pub async fn extract_profile(&self, description: &str) -> Result<ProjectProfile, StageError> {
        debug!(len = description.len(), "extract_profile: called");
        let extracted = self
            .ask(
                Stage::Profile,
                "profile",
                &ProfilePrompt::new(description),
                self.stages.profile,
            )
            .await?;

        let profile = profile_from(extracted, description, self.default_budget)?;
        info!(name = %profile.name, budget = profile.budget_per_month, "Profile extracted");
        Ok(profile)
    }
}
