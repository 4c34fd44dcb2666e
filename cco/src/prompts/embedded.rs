//! Embedded fallback prompts
//!
//! These are compiled into the binary and used when template files are not found.

/// System message sent ahead of every stage prompt
pub const JSON_SYSTEM: &str = "You are a strict JSON generator. Return ONLY valid JSON. \
No explanations, no markdown.";

/// Profile extraction from a free-text project description
pub const PROFILE: &str = r#"Analyze this project description and return a JSON object with:
- name: Project Name
- budget_inr_per_month: Estimated monthly budget in INR (integer)
- description: One or two sentence summary of the project
- tech_stack: object mapping each layer (frontend, backend, database, hosting, etc.) to the technology used
- non_functional_requirements: list of strings (scalability, availability, compliance, latency, etc.)

Description: "{{description}}"

Return ONLY JSON.
"#;

/// Synthetic billing generation for a profile
pub const BILLING: &str = r#"You are a Cloud Billing Simulator.
Generate a JSON list of 10-15 realistic cloud billing records for the following project.

Project: {{name}}
Budget: {{budget}} INR per month
Tech Stack: {{tech_stack}}

Constraints:
- Total cost should be roughly around the budget (can be slightly over or under, generate variance).
- Include services like Compute (EC2/VM), Database (RDS/MongoDB), Storage (S3), Networking, etc.
- Fields per record: "month" (e.g., "2025-01"), "service", "resource_id", "region", "usage_type", "usage_quantity", "unit", "cost_inr", "desc".
- Region should be consistent (e.g., "ap-south-1").

Return ONLY the JSON list.
"#;

/// Cost optimization recommendations for a profile and its cost summary
pub const RECOMMENDATIONS: &str = r#"You are a Cloud FinOps Expert.
Based on the following project profile and cost analysis, provide 6-10 cost optimization recommendations.

Project: {{name}}
Tech Stack: {{tech_stack}}
Non-Functional Reqs: {{non_functional_requirements}}

Cost Analysis:
Total Cost: {{total_cost}} INR
Budget: {{budget}} INR
Variance: {{variance}} INR
Service Costs: {{service_costs}}

Task:
Generate a JSON list of recommendations.
Each recommendation must include:
- title
- service (target service)
- current_cost (approx from analysis)
- potential_savings (estimate)
- recommendation_type (e.g., "open_source", "free_tier", "right_sizing", "alternative_provider")
- description
- implementation_effort ("low", "medium", "high")
- risk_level ("low", "medium", "high")
- steps (list of strings)
- cloud_providers (list of applicable providers)

Focus on multi-cloud suggestions (AWS, Azure, GCP, DigitalOcean) and open-source alternatives.

Return ONLY the list of recommendations as a valid JSON array.
"#;

/// Look up an embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "profile" => Some(PROFILE),
        "billing" => Some(BILLING),
        "recommendations" => Some(RECOMMENDATIONS),
        "system" => Some(JSON_SYSTEM),
        _ => None,
    }
}
