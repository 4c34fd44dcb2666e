//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::domain::{CostSummary, ProjectProfile};

/// Context for the profile template
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePrompt {
    pub description: String,
}

impl ProfilePrompt {
    pub fn new(description: &str) -> Self {
        // Keep the surrounding quotes in the template intact
        Self {
            description: description.trim().replace('"', "'"),
        }
    }
}

/// Context for the billing template
#[derive(Debug, Clone, Serialize)]
pub struct BillingPrompt {
    pub name: String,
    pub budget: u64,
    /// Tech stack as compact JSON
    pub tech_stack: String,
}

impl BillingPrompt {
    pub fn new(profile: &ProjectProfile) -> Self {
        debug!(name = %profile.name, "BillingPrompt::new: called");
        Self {
            name: profile.name.clone(),
            budget: profile.budget_per_month,
            tech_stack: to_json(&profile.tech_stack),
        }
    }
}

/// Context for the recommendations template
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationPrompt {
    pub name: String,
    pub tech_stack: String,
    pub non_functional_requirements: String,
    pub total_cost: String,
    pub budget: String,
    pub variance: String,
    pub service_costs: String,
}

impl RecommendationPrompt {
    pub fn new(profile: &ProjectProfile, analysis: &CostSummary) -> Self {
        debug!(name = %profile.name, total_cost = analysis.total_cost, "RecommendationPrompt::new: called");
        Self {
            name: profile.name.clone(),
            tech_stack: to_json(&profile.tech_stack),
            non_functional_requirements: to_json(&profile.non_functional_requirements),
            total_cost: format_amount(analysis.total_cost),
            budget: format_amount(analysis.budget),
            variance: format_amount(analysis.variance),
            service_costs: to_json(&analysis.cost_by_service),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Whole amounts print without a fractional part
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.cco/prompts/`)
    user_dir: Option<PathBuf>,
    /// Repo default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at `root`
    ///
    /// # Arguments
    /// * `root` - Directory searched for `.cco/prompts/` and `prompts/`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, "PromptLoader::new: called");
        let user_dir = root.join(".cco/prompts");
        let repo_dir = root.join("prompts");

        Self {
            hbs: Self::engine(),
            user_dir: if user_dir.exists() { Some(user_dir) } else { None },
            repo_dir: if repo_dir.exists() { Some(repo_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            repo_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle JSON
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.set_strict_mode(true);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.cco/prompts/{name}.pmt`
    /// 2. Repo default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in [&self.user_dir, &self.repo_dir].into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found on disk");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<C: Serialize>(&self, template_name: &str, context: &C) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// The system message that precedes every stage prompt
    pub fn system_prompt(&self) -> Result<String> {
        self.load_template("system")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ServiceCost, TechStack};
    use std::collections::BTreeMap;

    fn profile() -> ProjectProfile {
        let mut tech_stack = TechStack::new();
        tech_stack.insert("frontend".to_string(), serde_json::json!("React"));
        tech_stack.insert("database".to_string(), serde_json::json!("PostgreSQL"));
        ProjectProfile {
            name: "Food Delivery".to_string(),
            budget_per_month: 8000,
            description: "Food delivery app".to_string(),
            tech_stack,
            non_functional_requirements: vec!["99.9% uptime".to_string()],
        }
    }

    #[test]
    fn test_profile_prompt_renders_description() {
        let loader = PromptLoader::embedded_only();
        let prompt = loader
            .render("profile", &ProfilePrompt::new("  A \"fast\" e-commerce site for <shoes>  "))
            .unwrap();

        assert!(prompt.contains("Description: \"A 'fast' e-commerce site for <shoes>\""));
        assert!(prompt.contains("budget_inr_per_month"));
    }

    #[test]
    fn test_billing_prompt_is_deterministic() {
        let loader = PromptLoader::embedded_only();
        let ctx = BillingPrompt::new(&profile());

        let first = loader.render("billing", &ctx).unwrap();
        let second = loader.render("billing", &ctx).unwrap();

        assert_eq!(first, second);
        assert!(first.contains("Project: Food Delivery"));
        assert!(first.contains("Budget: 8000 INR per month"));
        assert!(first.contains(r#"{"database":"PostgreSQL","frontend":"React"}"#));
    }

    #[test]
    fn test_recommendation_prompt() {
        let loader = PromptLoader::embedded_only();
        let mut cost_by_service = BTreeMap::new();
        cost_by_service.insert("Compute".to_string(), 3000.0);
        let analysis = CostSummary {
            total_cost: 3000.0,
            budget: 8000.0,
            variance: -5000.0,
            cost_by_service,
            top_services: vec![ServiceCost {
                service: "Compute".to_string(),
                cost: 3000.0,
            }],
            is_over_budget: false,
        };

        let prompt = loader
            .render("recommendations", &RecommendationPrompt::new(&profile(), &analysis))
            .unwrap();

        assert!(prompt.contains("Total Cost: 3000 INR"));
        assert!(prompt.contains("Variance: -5000 INR"));
        assert!(prompt.contains(r#"Service Costs: {"Compute":3000.0}"#));
        assert!(prompt.contains(r#"Non-Functional Reqs: ["99.9% uptime"]"#));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(4600.0), "4600");
        assert_eq!(format_amount(-12.5), "-12.50");
    }

    #[test]
    fn test_user_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".cco/prompts")).unwrap();
        std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
        std::fs::write(dir.path().join(".cco/prompts/profile.pmt"), "USER {{description}}").unwrap();
        std::fs::write(dir.path().join("prompts/profile.pmt"), "REPO {{description}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let prompt = loader.render("profile", &ProfilePrompt::new("x")).unwrap();
        assert_eq!(prompt, "USER x");
    }

    #[test]
    fn test_missing_variable_fails_in_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
        std::fs::write(dir.path().join("prompts/profile.pmt"), "{{nonexistent}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        assert!(loader.render("profile", &ProfilePrompt::new("x")).is_err());
    }

    #[test]
    fn test_prompt_loader_unknown_template() {
        let loader = PromptLoader::embedded_only();
        let result = loader.load_template("nonexistent-template");
        assert!(result.is_err());
    }

    #[test]
    fn test_system_prompt() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.system_prompt().unwrap().contains("strict JSON generator"));
    }
}
