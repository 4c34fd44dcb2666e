//! Billing generation stage

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Pipeline, Stage, StageError};
use crate::domain::{BillingRecord, ProjectProfile};
use crate::extract::Extracted;
use crate::prompts::BillingPrompt;

/// Keys a model may wrap the record list in when it returns an object
pub const BILLING_WRAPPER_KEYS: &[&str] = &["billing", "billing_records", "records", "billing_data"];

const EXPECTED: &str = "list of billing records";

/// Turn the extracted reply into billing records
///
/// Accepts a bare list or an object wrapping one under a known key. Every
/// element must be an object.
pub fn billing_records(extracted: Extracted) -> Result<Vec<BillingRecord>, StageError> {
    let items = match extracted {
        Extracted::List(items) => items,
        Extracted::Object(mut map) => {
            let key = BILLING_WRAPPER_KEYS
                .iter()
                .find(|k| matches!(map.get(**k), Some(Value::Array(_))));
            match key.and_then(|k| map.remove(*k)) {
                Some(Value::Array(items)) => {
                    debug!(key = ?key, "billing_records: unwrapped list");
                    items
                }
                _ => {
                    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                    return Err(StageError::ShapeMismatch {
                        stage: Stage::Billing,
                        expected: EXPECTED,
                        found: format!("object with keys [{}]", keys.join(", ")),
                    });
                }
            }
        }
        Extracted::NotFound => {
            return Err(StageError::Extraction {
                stage: Stage::Billing,
                snippet: String::new(),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            BillingRecord::from_value(item).ok_or_else(|| StageError::ShapeMismatch {
                stage: Stage::Billing,
                expected: EXPECTED,
                found: format!("non-object element at index {}", i),
            })
        })
        .collect()
}

impl Pipeline {
    /// Generate a synthetic month of billing records for a profile
    pub async fn generate_billing(&self, profile: &ProjectProfile) -> Result<Vec<BillingRecord>, StageError> {
        debug!(name = %profile.name, "generate_billing: called");
        let extracted = self
            .ask(
                Stage::Billing,
                "billing",
                &BillingPrompt::new(profile),
                self.stages.billing,
            )
            .await?;

        let records = billing_records(extracted)?;
        if records.is_empty() {
            warn!("Model returned no billing records");
        }
        info!(count = records.len(), "Billing records generated");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::StagesConfig;
    use crate::domain::OTHER_SERVICE;
    use crate::llm::client::mock::MockLlmClient;
    use crate::pipeline::FailureKind;
    use crate::pipeline::fixtures::BILLING_REPLY;
    use crate::prompts::PromptLoader;

    fn list(value: Value) -> Extracted {
        match value {
            Value::Array(items) => Extracted::List(items),
            Value::Object(map) => Extracted::Object(map),
            _ => Extracted::NotFound,
        }
    }

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
    fn test_bare_list() {
        let records = billing_records(list(json!([{"service": "Compute", "cost": 10}, {}]))).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].service, OTHER_SERVICE);
    }

    #[test]
    fn test_wrapped_list() {
        for key in BILLING_WRAPPER_KEYS {
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), json!([{"service": "DB", "cost_inr": 5}]));
            let records = billing_records(Extracted::Object(map)).unwrap();
            assert_eq!(records.len(), 1, "key {}", key);
            assert_eq!(records[0].cost, 5.0);
        }
    }

    #[test]
    fn test_unwrapped_object_is_mismatch() {
        let err = billing_records(list(json!({"service": "Compute", "cost": 10}))).unwrap_err();
        assert_eq!(err.kind(), FailureKind::ShapeMismatch);
        assert!(err.to_string().contains("object with keys [cost, service]"));
    }

    #[test]
    fn test_non_object_element_is_mismatch() {
        let err = billing_records(list(json!([{"service": "Compute"}, "Storage: 400"]))).unwrap_err();
        assert!(err.to_string().contains("non-object element at index 1"));
    }

    #[test]
    fn test_nothing_extracted_is_extraction_failure() {
        let err = billing_records(Extracted::NotFound).unwrap_err();
        assert_eq!(err.stage(), Stage::Billing);
        assert_eq!(err.kind(), FailureKind::Extraction);
    }

    #[test]
    fn test_empty_list_is_accepted() {
        assert!(billing_records(list(json!([]))).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_billing() {
        let mock = Arc::new(MockLlmClient::with_texts(&[BILLING_REPLY]));
        let pipeline = Pipeline::new(mock.clone(), PromptLoader::embedded_only(), StagesConfig::default(), 5000);

        let records = pipeline.generate_billing(&profile()).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].cost, 3000.0);
        assert_eq!(records[2].service, "Storage");
        assert!(mock.requests()[0].messages[1].content.contains("Budget: 4000 INR per month"));
    }

    #[tokio::test]
    async fn test_prose_reply_is_extraction_failure() {
        let mock = Arc::new(MockLlmClient::with_texts(&["Sorry, I can only describe bills in words."]));
        let pipeline = Pipeline::new(mock, PromptLoader::embedded_only(), StagesConfig::default(), 5000);

        let err = pipeline.generate_billing(&profile()).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Billing);
        assert_eq!(err.kind(), FailureKind::Extraction);
    }
}
