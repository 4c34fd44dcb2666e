//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::LlmConfig;

/// Cloud Cost Optimizer - LLM-driven cloud cost analysis
#[derive(Parser)]
#[command(
    name = "cco",
    about = "Profile a project, simulate its cloud bill and suggest savings",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Directory for JSON artifacts (overrides config)
    #[arg(short, long = "output-dir", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a project profile from a description
    Profile {
        /// Project description, or @FILE to read it from a file
        #[arg(value_name = "DESCRIPTION|@FILE")]
        description: String,
    },

    /// Generate synthetic billing for the saved profile
    Billing,

    /// Summarize saved billing against the profile budget
    Analyze {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate recommendations and write the report
    Recommend,

    /// Run every stage end to end
    Run {
        /// Project description, or @FILE to read it from a file
        #[arg(value_name = "DESCRIPTION|@FILE")]
        description: String,
    },

    /// Show the saved report
    Report {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cloud-cost-optimizer")
        .join("logs")
        .join("cco.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with credential status and log location
///
/// `llm` is the configuration found by the default lookup chain, so the
/// variable shown is the one the pipeline will read.
pub fn generate_after_help(llm: &LlmConfig) -> String {
    debug!(api_key_env = %llm.api_key_env, "generate_after_help: called");
    let token_set = std::env::var(&llm.api_key_env).is_ok_and(|v| !v.trim().is_empty());

    let mut help = String::new();
    help.push_str("Credential:\n");
    let icon = if token_set { "\u{2705}" } else { "\u{274C}" };
    let status = if token_set { "set" } else { "not set" };
    help.push_str(&format!("  {} {:<14} {}\n", icon, llm.api_key_env, status));
    if let Some(ref path) = llm.api_key_file {
        let status = if path.is_file() { "found" } else { "missing" };
        help.push_str(&format!("     key file {} {}\n", path.display(), status));
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

/// Output format for analyze/report
#[derive(Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}
