//! Cost summary and final report

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ProjectProfile, Recommendation};

/// Total cost of one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCost {
    pub service: String,
    pub cost: f64,
}

/// Spend against budget, derived from a billing snapshot
///
/// `cost_by_service` is a sorted map so serializing the same summary twice
/// gives identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_cost: f64,
    pub budget: f64,
    /// `total_cost - budget`; positive means overspend
    pub variance: f64,
    pub cost_by_service: BTreeMap<String, f64>,
    /// Up to three most expensive services, highest first
    pub top_services: Vec<ServiceCost>,
    pub is_over_budget: bool,
}

/// Everything one analysis run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub project_name: String,
    pub analysis: CostSummary,
    pub recommendations: Vec<Recommendation>,
    pub total_potential_savings: f64,
    pub recommendations_count: usize,
}

impl Report {
    /// Assemble the report; the derived totals are computed here and nowhere else
    pub fn build(profile: &ProjectProfile, analysis: CostSummary, recommendations: Vec<Recommendation>) -> Self {
        let total_potential_savings = recommendations.iter().map(|r| r.potential_savings).sum();
        Self {
            project_name: profile.name.clone(),
            recommendations_count: recommendations.len(),
            analysis,
            recommendations,
            total_potential_savings,
        }
    }

    /// Savings as a share of current total spend, 0 when nothing is spent
    pub fn savings_ratio(&self) -> f64 {
        if self.analysis.total_cost > 0.0 {
            self.total_potential_savings / self.analysis.total_cost
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Level;

    fn rec(title: &str, savings: f64) -> Recommendation {
        Recommendation {
            title: title.to_string(),
            service: "Compute".to_string(),
            current_cost: 3000.0,
            potential_savings: savings,
            kind: "right_sizing".to_string(),
            description: String::new(),
            effort: Level::Low,
            risk: Level::Low,
            steps: vec![],
            providers: vec![],
        }
    }

    fn summary(total: f64) -> CostSummary {
        CostSummary {
            total_cost: total,
            budget: 4000.0,
            variance: total - 4000.0,
            cost_by_service: BTreeMap::new(),
            top_services: vec![],
            is_over_budget: total > 4000.0,
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
    fn test_build_totals() {
        let report = Report::build(&profile(), summary(4600.0), vec![rec("a", 500.0), rec("b", 250.5)]);

        assert_eq!(report.project_name, "Tutor App");
        assert_eq!(report.recommendations_count, 2);
        assert_eq!(report.total_potential_savings, 750.5);
        assert!((report.savings_ratio() - 750.5 / 4600.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report() {
        let report = Report::build(&profile(), summary(0.0), vec![]);
        assert_eq!(report.recommendations_count, 0);
        assert_eq!(report.total_potential_savings, 0.0);
        assert_eq!(report.savings_ratio(), 0.0);
    }
}
