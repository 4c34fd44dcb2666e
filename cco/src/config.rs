//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::llm::{LlmError, RetryPolicy};

/// Budget used when the model gives no usable monthly budget
pub const DEFAULT_BUDGET: u64 = 5000;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Endpoint and credential configuration
    pub llm: LlmConfig,

    /// Retry behaviour for transport failures
    pub retry: RetryConfig,

    /// Per-stage generation parameters
    pub stages: StagesConfig,

    /// Pipeline-level settings
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the credential can be found. Call this early in startup to
    /// fail fast with a clear error message.
    pub fn validate(&self) -> Result<()> {
        self.llm.get_api_key().map_err(|e| eyre::eyre!("{}", e))?;
        Ok(())
    }

    /// Load configuration with fallback chain
    ///
    /// The first file found wins; a file that exists but does not parse is
    /// an error, not a reason to fall back to defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .cco.yml
        let local_config = PathBuf::from(".cco.yml");
        if local_config.exists() {
            return Self::load_from_file(&local_config)
                .context(format!("Failed to load config from {}", local_config.display()));
        }

        // Try user config: ~/.config/cloud-cost-optimizer/cco.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            return Self::load_from_file(&user_config)
                .context(format!("Failed to load config from {}", user_config.display()));
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Peek at the log level before logging is set up
    ///
    /// Errors are swallowed: the real load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => std::iter::once(PathBuf::from(".cco.yml")).chain(user_config_path()).collect(),
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cloud-cost-optimizer").join("cco.yml"))
}

/// Text-generation endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier sent with every request
    pub model: String,

    /// Environment variable containing the API token
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// File containing the API token (used when the env var is unset)
    #[serde(rename = "api-key-file")]
    pub api_key_file: Option<PathBuf>,

    /// API base URL; `/v1/chat/completions` is appended
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Per-attempt request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "meta-llama/Meta-Llama-3-8B-Instruct".to_string(),
            api_key_env: "HF_API_TOKEN".to_string(),
            api_key_file: None,
            base_url: "https://router.huggingface.co".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Look up the API token: env var first, then the key file
    pub fn get_api_key(&self) -> Result<String, LlmError> {
        debug!(api_key_env = %self.api_key_env, "get_api_key: called");
        if let Ok(key) = std::env::var(&self.api_key_env)
            && !key.trim().is_empty()
        {
            debug!("get_api_key: found in environment");
            return Ok(key.trim().to_string());
        }

        if let Some(ref path) = self.api_key_file {
            debug!(?path, "get_api_key: trying key file");
            let key = fs::read_to_string(path).map_err(|e| {
                LlmError::Configuration(format!("Failed to read API key file {}: {}", path.display(), e))
            })?;
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
            return Err(LlmError::Configuration(format!(
                "API key file {} is empty",
                path.display()
            )));
        }

        Err(LlmError::Configuration(format!(
            "LLM API key not found. Set the {} environment variable.",
            self.api_key_env
        )))
    }

    /// Resolve into the immutable settings the client is built from
    pub fn resolve(&self, retry: &RetryConfig) -> Result<ResolvedLlmConfig, LlmError> {
        debug!("LlmConfig::resolve: called");
        if self.model.trim().is_empty() {
            return Err(LlmError::Configuration("llm.model is empty".to_string()));
        }
        Ok(ResolvedLlmConfig {
            model: self.model.clone(),
            api_key: self.get_api_key()?,
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            retry: retry.policy(),
        })
    }
}

/// Fully resolved endpoint settings, credential included
#[derive(Clone)]
pub struct ResolvedLlmConfig {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for ResolvedLlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedLlmConfig")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request, first try included
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 2_000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

/// Generation parameters for one model-backed stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A stage block as written in the file; missing fields keep the stage default
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct GenerationOverride {
    #[serde(rename = "max-tokens")]
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl GenerationOverride {
    fn apply(self, base: GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            temperature: self.temperature.unwrap_or(base.temperature),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StagesOverride {
    profile: GenerationOverride,
    billing: GenerationOverride,
    recommendations: GenerationOverride,
}

impl From<StagesOverride> for StagesConfig {
    fn from(o: StagesOverride) -> Self {
        let base = StagesConfig::default();
        Self {
            profile: o.profile.apply(base.profile),
            billing: o.billing.apply(base.billing),
            recommendations: o.recommendations.apply(base.recommendations),
        }
    }
}

/// Per-stage generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StagesOverride")]
pub struct StagesConfig {
    pub profile: GenerationConfig,
    pub billing: GenerationConfig,
    pub recommendations: GenerationConfig,
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            profile: GenerationConfig {
                max_tokens: 500,
                temperature: 0.1,
            },
            billing: GenerationConfig {
                max_tokens: 3000,
                temperature: 0.4,
            },
            recommendations: GenerationConfig {
                max_tokens: 2000,
                temperature: 0.3,
            },
        }
    }
}

/// Pipeline-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Monthly budget substituted when the profile has none
    #[serde(rename = "default-budget")]
    pub default_budget: u64,

    /// Where the CLI writes its JSON artifacts
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Root searched for prompt template overrides
    #[serde(rename = "prompts-root")]
    pub prompts_root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_budget: DEFAULT_BUDGET,
            output_dir: PathBuf::from("."),
            prompts_root: PathBuf::from("."),
        }
    }
}
