//! Cost analysis stage
//!
//! Pure aggregation; no model call and no failure path.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::domain::{BillingRecord, CostSummary, ProjectProfile, ServiceCost};

/// How many services `top_services` holds at most
const TOP_SERVICES: usize = 3;

/// Aggregate billing records against a monthly budget
///
/// Equal costs keep the order in which their services first appear, so the
/// same records always give the same summary.
pub fn summarize(records: &[BillingRecord], budget: u64) -> CostSummary {
    debug!(count = records.len(), budget, "summarize: called");
    let mut first_seen: Vec<ServiceCost> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.service.as_str()) {
            Some(&i) => first_seen[i].cost += record.cost,
            None => {
                index.insert(record.service.as_str(), first_seen.len());
                first_seen.push(ServiceCost {
                    service: record.service.clone(),
                    cost: record.cost,
                });
            }
        }
    }

    let total_cost: f64 = records.iter().map(|r| r.cost).sum();
    let budget = budget as f64;
    let variance = total_cost - budget;

    let cost_by_service: BTreeMap<String, f64> = first_seen.iter().map(|s| (s.service.clone(), s.cost)).collect();

    // sort_by is stable
    let mut top_services = first_seen;
    top_services.sort_by(|a, b| b.cost.total_cmp(&a.cost));
    top_services.truncate(TOP_SERVICES);

    CostSummary {
        total_cost,
        budget,
        variance,
        cost_by_service,
        top_services,
        is_over_budget: total_cost > budget,
    }
}

/// Summarize a profile's billing against its own budget
pub fn analyze_costs(profile: &ProjectProfile, records: &[BillingRecord]) -> CostSummary {
    let summary = summarize(records, profile.budget_per_month);
    info!(
        total_cost = summary.total_cost,
        budget = summary.budget,
        variance = summary.variance,
        over_budget = summary.is_over_budget,
        "Cost analysis complete"
    );
    summary
}
