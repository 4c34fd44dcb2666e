//! Recommendation generation stage

use serde_json::Value;
use tracing::{debug, info};

use super::{Pipeline, Stage, StageError};
use crate::domain::{CostSummary, ProjectProfile, Recommendation};
use crate::extract::Extracted;
use crate::prompts::RecommendationPrompt;

/// Key a model may wrap the recommendation list in
pub const RECOMMENDATIONS_WRAPPER_KEY: &str = "recommendations";

const EXPECTED: &str = "list of recommendations";

fn mismatch(found: String) -> StageError {
    StageError::ShapeMismatch {
        stage: Stage::Recommendations,
        expected: EXPECTED,
        found,
    }
}

/// Turn the extracted reply into recommendations
pub fn recommendations_from(extracted: Extracted) -> Result<Vec<Recommendation>, StageError> {
    let items = match extracted {
        Extracted::List(items) => items,
        Extracted::Object(mut map) => match map.remove(RECOMMENDATIONS_WRAPPER_KEY) {
            Some(Value::Array(items)) => items,
            _ => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                return Err(mismatch(format!("object with keys [{}]", keys.join(", "))));
            }
        },
        Extracted::NotFound => {
            return Err(StageError::Extraction {
                stage: Stage::Recommendations,
                snippet: String::new(),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Recommendation::from_value(item).ok_or_else(|| mismatch(format!("non-object element at index {}", i)))
        })
        .collect()
}

impl Pipeline {
    /// Ask for cost optimization recommendations given the cost summary
    pub async fn generate_recommendations(
        &self,
        profile: &ProjectProfile,
        analysis: &CostSummary,
    ) -> Result<Vec<Recommendation>, StageError> {
        debug!(name = %profile.name, total_cost = analysis.total_cost, "generate_recommendations: called");
        let extracted = self
            .ask(
                Stage::Recommendations,
                "recommendations",
                &RecommendationPrompt::new(profile, analysis),
                self.stages.recommendations,
            )
            .await?;

        let recommendations = recommendations_from(extracted)?;
        info!(count = recommendations.len(), "Recommendations generated");
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::StagesConfig;
    use crate::domain::Level;
    use crate::llm::client::mock::MockLlmClient;
    use crate::pipeline::fixtures::RECOMMENDATIONS_REPLY;
    use crate::pipeline::{FailureKind, summarize};
    use crate::prompts::PromptLoader;

    fn profile() -> ProjectProfile {
        ProjectProfile {
            name: "Tutor App".to_string(),
            budget_per_month: 4000,
            description: String::new(),
            tech_stack: Default::default(),
            non_functional_requirements: vec![],
        }
    }

    #[test]
    fn test_wrapped_and_bare_lists() {
        let bare = json!([{"title": "a"}, {"title": "b"}]);
        let Value::Array(items) = bare else { unreachable!() };
        assert_eq!(recommendations_from(Extracted::List(items)).unwrap().len(), 2);

        let wrapped = json!({"recommendations": [{"title": "a"}]});
        let Value::Object(map) = wrapped else { unreachable!() };
        assert_eq!(recommendations_from(Extracted::Object(map)).unwrap()[0].title, "a");
    }

    #[test]
    fn test_other_object_is_mismatch() {
        let Value::Object(map) = json!({"advice": []}) else { unreachable!() };
        let err = recommendations_from(Extracted::Object(map)).unwrap_err();

        assert_eq!(err.kind(), FailureKind::ShapeMismatch);
        assert!(err.to_string().contains("object with keys [advice]"));
    }

    #[test]
    fn test_nothing_extracted_is_extraction_failure() {
        let err = recommendations_from(Extracted::NotFound).unwrap_err();
        assert_eq!(err.stage(), Stage::Recommendations);
        assert_eq!(err.kind(), FailureKind::Extraction);
    }

    #[tokio::test]
    async fn test_generate_recommendations() {
        let mock = Arc::new(MockLlmClient::with_texts(&[RECOMMENDATIONS_REPLY]));
        let pipeline = Pipeline::new(mock.clone(), PromptLoader::embedded_only(), StagesConfig::default(), 5000);
        let analysis = summarize(&[], 4000);

        let recs = pipeline.generate_recommendations(&profile(), &analysis).await.unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].effort, Level::Medium);
        assert_eq!(recs[1].kind, "open_source");
        assert!(mock.requests()[0].messages[1].content.contains("Variance: -4000 INR"));
    }
}
