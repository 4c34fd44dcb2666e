//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for the model-backed
//! pipeline stages.
//!
//! Template loading chain:
//! 1. `.cco/prompts/{name}.pmt` (user override)
//! 2. `prompts/{name}.pmt` (repo default)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{BillingPrompt, ProfilePrompt, PromptLoader, RecommendationPrompt};
