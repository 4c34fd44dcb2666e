//! Project profile record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::coerce;

/// Technology per layer; values are a name (string) or a nested mapping
pub type TechStack = BTreeMap<String, Value>;

/// Name used when the model gives none
pub const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Structured description of a project, extracted from free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProfile {
    pub name: String,

    /// Monthly budget in whole currency units
    #[serde(alias = "budget_inr_per_month")]
    pub budget_per_month: u64,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tech_stack: TechStack,

    #[serde(default)]
    pub non_functional_requirements: Vec<String>,
}

impl ProjectProfile {
    /// Build a profile from an extracted JSON object
    ///
    /// Never fails: a missing or unreadable budget becomes `default_budget`,
    /// a missing name becomes [`UNKNOWN_PROJECT`] and a missing description
    /// becomes the text the user typed.
    pub fn from_object(map: &Map<String, Value>, original_description: &str, default_budget: u64) -> Self {
        debug!(keys = map.len(), "ProjectProfile::from_object: called");

        let budget_field = coerce::first_of(map, &["budget_inr_per_month", "budget_per_month", "budget"]);
        let budget_per_month = match budget_field.and_then(coerce::whole_number) {
            Some(budget) => budget,
            None => {
                warn!(raw = ?budget_field, default_budget, "budget missing or not a whole number, using default");
                default_budget
            }
        };

        let name = coerce::first_of(map, &["name", "project_name"])
            .and_then(coerce::text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_PROJECT.to_string());

        let description = map
            .get("description")
            .and_then(coerce::text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| original_description.trim().to_string());

        let tech_stack = match map.get("tech_stack") {
            Some(Value::Object(stack)) => stack
                .iter()
                .filter_map(|(layer, tech)| stack_entry(tech).map(|tech| (layer.clone(), tech)))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(coerce::text)
                .enumerate()
                .map(|(i, tech)| (format!("component_{}", i + 1), Value::String(tech)))
                .collect(),
            Some(other) => {
                warn!(raw = ?other, "tech_stack is not a mapping, ignoring");
                TechStack::new()
            }
            None => TechStack::new(),
        };

        let non_functional_requirements = map
            .get("non_functional_requirements")
            .map(coerce::text_list)
            .unwrap_or_default();

        Self {
            name,
            budget_per_month,
            description,
            tech_stack,
            non_functional_requirements,
        }
    }
}

/// A tech stack value is a name or a nested mapping
///
/// Lists are joined into one name, other scalars rendered as text, and nulls
/// or empty values dropped.
fn stack_entry(tech: &Value) -> Option<Value> {
    let entry = match tech {
        Value::Object(_) => return Some(tech.clone()),
        Value::Array(_) => coerce::text_list(tech).join(", "),
        other => coerce::text(other)?,
    };
    if entry.is_empty() {
        return None;
    }
    Some(Value::String(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_full_profile() {
        let map = obj(json!({
            "name": "ShopEase",
            "budget_inr_per_month": 15000,
            "description": "E-commerce for local stores",
            "tech_stack": {"frontend": "Next.js", "backend": {"language": "Go", "framework": "Gin"}},
            "non_functional_requirements": ["PCI compliance", "p95 < 200ms"]
        }));

        let profile = ProjectProfile::from_object(&map, "ignored", 5000);

        assert_eq!(profile.name, "ShopEase");
        assert_eq!(profile.budget_per_month, 15000);
        assert_eq!(profile.description, "E-commerce for local stores");
        assert_eq!(profile.tech_stack["backend"]["language"], "Go");
        assert_eq!(profile.non_functional_requirements.len(), 2);
    }

    #[test]
    fn test_non_numeric_budget_uses_default() {
        let map = obj(json!({"budget_inr_per_month": "abc"}));
        let profile = ProjectProfile::from_object(&map, "a blog", 5000);
        assert_eq!(profile.budget_per_month, 5000);
    }

    #[test]
    fn test_missing_fields_use_fallbacks() {
        let profile = ProjectProfile::from_object(&Map::new(), "  my weekend project  ", 7000);

        assert_eq!(profile.name, UNKNOWN_PROJECT);
        assert_eq!(profile.budget_per_month, 7000);
        assert_eq!(profile.description, "my weekend project");
        assert!(profile.tech_stack.is_empty());
        assert!(profile.non_functional_requirements.is_empty());
    }

    #[test]
    fn test_budget_variants() {
        let cases = [
            (json!({"budget_inr_per_month": "12,000"}), 12000),
            (json!({"budget_per_month": 900.75}), 900),
            (json!({"budget": 300}), 300),
            (json!({"budget_inr_per_month": -50}), 5000),
            (json!({"budget_inr_per_month": null, "budget": 42}), 42),
            (json!({"budget": "₹8,000 INR/month"}), 8000),
            (json!({"budget": "10k"}), 5000),
            (json!({"budget": "1.5 lakh"}), 5000),
            (json!({"budget": "between 10 and 20 thousand"}), 5000),
            (json!({"budget": "1e4"}), 5000),
            (json!({"budget": "4999.5"}), 5000),
        ];
        for (value, expected) in cases {
            let profile = ProjectProfile::from_object(&obj(value.clone()), "", 5000);
            assert_eq!(profile.budget_per_month, expected, "input: {}", value);
        }
    }

    #[test]
    fn test_tech_stack_list_is_keyed() {
        let map = obj(json!({"tech_stack": ["React", "Node.js"]}));
        let profile = ProjectProfile::from_object(&map, "", 5000);
        assert_eq!(profile.tech_stack["component_1"], "React");
        assert_eq!(profile.tech_stack["component_2"], "Node.js");
    }

    #[test]
    fn test_tech_stack_values_are_names_or_mappings() {
        let map = obj(json!({"tech_stack": {
            "frontend": "React",
            "database": ["PostgreSQL", "Redis"],
            "replicas": 3,
            "cache": null,
            "queue": [],
            "backend": {"language": "Go"}
        }}));
        let profile = ProjectProfile::from_object(&map, "", 5000);

        assert_eq!(profile.tech_stack["frontend"], "React");
        assert_eq!(profile.tech_stack["database"], "PostgreSQL, Redis");
        assert_eq!(profile.tech_stack["replicas"], "3");
        assert_eq!(profile.tech_stack["backend"]["language"], "Go");
        assert!(!profile.tech_stack.contains_key("cache"));
        assert!(!profile.tech_stack.contains_key("queue"));
        assert!(profile.tech_stack.values().all(|v| v.is_string() || v.is_object()));
    }

    #[test]
    fn test_saved_profile_with_original_field_name_loads() {
        let saved = r#"{"name": "Legacy", "budget_inr_per_month": 2500}"#;
        let profile: ProjectProfile = serde_json::from_str(saved).unwrap();
        assert_eq!(profile.budget_per_month, 2500);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["budget_per_month"], 2500);
    }
}
