//! Billing record

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::coerce;

/// Service name used when a record has none
pub const OTHER_SERVICE: &str = "Other";

/// One line of a (synthetic) cloud bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
    /// Billing month, `YYYY-MM`
    #[serde(default)]
    pub month: String,

    #[serde(default = "other_service")]
    pub service: String,

    #[serde(default)]
    pub resource_id: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub usage_type: String,

    #[serde(default)]
    pub usage_quantity: f64,

    #[serde(default)]
    pub unit: String,

    /// Never negative
    #[serde(default, alias = "cost_inr")]
    pub cost: f64,

    #[serde(default, alias = "desc")]
    pub description: String,
}

fn other_service() -> String {
    OTHER_SERVICE.to_string()
}

impl BillingRecord {
    /// Coerce one element of a model-generated billing list
    ///
    /// Returns `None` when the element is not a JSON object. Within an
    /// object every field is optional: missing cost is 0, missing service is
    /// [`OTHER_SERVICE`], and negative costs are clamped to 0.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let field = |keys: &[&str]| coerce::first_of(map, keys).and_then(coerce::text).unwrap_or_default();

        let service = coerce::first_of(map, &["service", "service_name"])
            .and_then(coerce::text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(other_service);

        let cost = coerce::first_of(map, &["cost", "cost_inr"])
            .and_then(coerce::number)
            .unwrap_or(0.0)
            .max(0.0);

        let record = Self {
            month: field(&["month"]),
            service,
            resource_id: field(&["resource_id"]),
            region: field(&["region"]),
            usage_type: field(&["usage_type"]),
            usage_quantity: map.get("usage_quantity").and_then(coerce::number).unwrap_or(0.0),
            unit: field(&["unit"]),
            cost,
            description: field(&["description", "desc"]),
        };
        debug!(service = %record.service, cost = record.cost, "BillingRecord::from_value: coerced");
        Some(record)
    }
}
