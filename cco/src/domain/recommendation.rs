//! Cost optimization recommendation record

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::coerce;

/// Effort or risk rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Case-insensitive parse of `low`, `medium`/`med`/`moderate`, `high`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Level::Low),
            "medium" | "med" | "moderate" => Some(Level::Medium),
            "high" => Some(Level::High),
            _ => None,
        }
    }

    fn coerce(value: Option<&Value>, field: &str) -> Self {
        let raw = value.and_then(coerce::text);
        match raw.as_deref().and_then(Level::parse) {
            Some(level) => level,
            None => {
                warn!(field, raw = ?raw, "unrecognized level, using medium");
                Level::Medium
            }
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// One cost optimization suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub service: String,
    pub current_cost: f64,
    pub potential_savings: f64,
    /// e.g. `open_source`, `free_tier`, `right_sizing`, `alternative_provider`
    #[serde(rename = "type", alias = "recommendation_type")]
    pub kind: String,
    pub description: String,
    #[serde(alias = "implementation_effort")]
    pub effort: Level,
    #[serde(alias = "risk_level")]
    pub risk: Level,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, alias = "cloud_providers")]
    pub providers: Vec<String>,
}

impl Recommendation {
    /// Coerce one element of a model-generated recommendation list
    ///
    /// Returns `None` when the element is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let text = |keys: &[&str]| coerce::first_of(map, keys).and_then(coerce::text).unwrap_or_default();
        let amount = |keys: &[&str]| {
            coerce::first_of(map, keys)
                .and_then(coerce::number)
                .unwrap_or(0.0)
                .max(0.0)
        };

        Some(Self {
            title: text(&["title"]),
            service: text(&["service"]),
            current_cost: amount(&["current_cost"]),
            potential_savings: amount(&["potential_savings"]),
            kind: text(&["type", "recommendation_type"]),
            description: text(&["description"]),
            effort: Level::coerce(coerce::first_of(map, &["effort", "implementation_effort"]), "effort"),
            risk: Level::coerce(coerce::first_of(map, &["risk", "risk_level"]), "risk"),
            steps: coerce::first_of(map, &["steps"]).map(coerce::text_list).unwrap_or_default(),
            providers: coerce::first_of(map, &["providers", "cloud_providers"])
                .map(coerce::text_list)
                .unwrap_or_default(),
        })
    }
}
