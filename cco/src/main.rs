//! Cloud Cost Optimizer
//!
//! CLI entry point: runs pipeline stages and persists their artifacts.

use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use cloud_cost_optimizer::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use cloud_cost_optimizer::config::Config;
use cloud_cost_optimizer::domain::{BillingRecord, CostSummary, ProjectProfile, Report};
use cloud_cost_optimizer::llm::create_client;
use cloud_cost_optimizer::pipeline::{Pipeline, analyze_costs};
use cloud_cost_optimizer::store::{ArtifactStore, read_description};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before anything reads the credential variable
    let dotenv = dotenvy::dotenv();

    let help_llm = Config::load(None).map(|c| c.llm).unwrap_or_default();
    let cmd = Cli::command().after_help(generate_after_help(&help_llm));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    match dotenv {
        Ok(path) => debug!(?path, "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.output_dir {
        config.pipeline.output_dir = dir;
    }
    info!(model = %config.llm.model, output_dir = %config.pipeline.output_dir.display(), "Loaded config");

    let store = ArtifactStore::new(&config.pipeline.output_dir);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Profile { description } => cmd_profile(&config, &store, &description).await,
        Command::Billing => cmd_billing(&config, &store).await,
        Command::Analyze { format } => cmd_analyze(&store, format),
        Command::Recommend => cmd_recommend(&config, &store).await,
        Command::Run { description } => cmd_run(&config, &store, &description).await,
        Command::Report { format } => cmd_report(&store, format),
    }
}

/// Build a pipeline, failing early if the credential is missing
fn build_pipeline(config: &Config) -> Result<Pipeline> {
    config.validate()?;
    let client = create_client(&config.llm, &config.retry)?;
    Ok(Pipeline::from_config(client, config))
}

async fn cmd_profile(config: &Config, store: &ArtifactStore, description: &str) -> Result<()> {
    debug!("cmd_profile: called");
    let description = read_description(description)?;
    let pipeline = build_pipeline(config)?;

    println!("{}", "Extracting project profile...".cyan());
    let profile = pipeline.extract_profile(&description).await?;

    store.save_description(&description)?;
    let path = store.save_profile(&profile)?;
    print_profile(&profile);
    println!("\nSaved to {}", path.display().to_string().green());
    Ok(())
}

async fn cmd_billing(config: &Config, store: &ArtifactStore) -> Result<()> {
    debug!("cmd_billing: called");
    let profile = store.load_profile()?;
    let pipeline = build_pipeline(config)?;

    println!("{} {}", "Generating billing for".cyan(), profile.name.bold());
    let records = pipeline.generate_billing(&profile).await?;

    let path = store.save_billing(&records)?;
    print_billing(&records);
    println!("\nSaved to {}", path.display().to_string().green());
    Ok(())
}

fn cmd_analyze(store: &ArtifactStore, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_analyze: called");
    let profile = store.load_profile()?;
    let records = store.load_billing()?;
    let summary = analyze_costs(&profile, &records);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&summary),
    }
    Ok(())
}

async fn cmd_recommend(config: &Config, store: &ArtifactStore) -> Result<()> {
    debug!("cmd_recommend: called");
    let profile = store.load_profile()?;
    let records = store.load_billing()?;
    let pipeline = build_pipeline(config)?;

    let analysis = analyze_costs(&profile, &records);
    println!("{}", "Generating recommendations...".cyan());
    let recommendations = pipeline.generate_recommendations(&profile, &analysis).await?;

    let report = Report::build(&profile, analysis, recommendations);
    let path = store.save_report(&report)?;
    print_report(&report);
    println!("\nSaved to {}", path.display().to_string().green());
    Ok(())
}

async fn cmd_run(config: &Config, store: &ArtifactStore, description: &str) -> Result<()> {
    debug!("cmd_run: called");
    let description = read_description(description)?;
    let pipeline = build_pipeline(config)?;

    println!("{}", "Running full analysis...".cyan());
    let run = pipeline.run(&description).await?;

    store.save_description(&description)?;
    store.save_profile(&run.profile)?;
    store.save_billing(&run.billing)?;
    let path = store.save_report(&run.report)?;

    print_profile(&run.profile);
    println!();
    print_report(&run.report);
    println!("\nArtifacts written to {}", store.dir().display().to_string().green());
    debug!(report = %path.display(), "cmd_run: done");
    Ok(())
}

fn cmd_report(store: &ArtifactStore, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_report: called");
    let report = store.load_report()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

fn print_profile(profile: &ProjectProfile) {
    println!("{}", profile.name.bold());
    println!("  Budget: {} INR/month", profile.budget_per_month);
    if !profile.description.is_empty() {
        println!("  {}", profile.description.dimmed());
    }
    for (layer, tech) in &profile.tech_stack {
        let tech = match tech {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("  {:<12} {}", format!("{}:", layer), tech);
    }
    for nfr in &profile.non_functional_requirements {
        println!("  - {}", nfr);
    }
}

fn print_billing(records: &[BillingRecord]) {
    let total: f64 = records.iter().map(|r| r.cost).sum();
    println!("{} billing records, total {:.2} INR", records.len(), total);
    for record in records {
        println!("  {:<14} {:<20} {:>10.2}", record.service, record.usage_type, record.cost);
    }
}

fn print_summary(summary: &CostSummary) {
    println!("{}", "Cost Summary".bold());
    println!("  Total:    {:.2} INR", summary.total_cost);
    println!("  Budget:   {:.2} INR", summary.budget);
    let variance = format!("{:+.2} INR", summary.variance);
    if summary.is_over_budget {
        println!("  Variance: {} {}", variance.red(), "(over budget)".red());
    } else {
        println!("  Variance: {}", variance.green());
    }
    println!("  Top services:");
    for service in &summary.top_services {
        println!("    {:<14} {:>10.2}", service.service, service.cost);
    }
}

fn print_report(report: &Report) {
    println!("{} {}", "Report for".bold(), report.project_name.bold());
    print_summary(&report.analysis);
    println!();
    println!("{} ({})", "Recommendations".bold(), report.recommendations_count);
    for (i, rec) in report.recommendations.iter().enumerate() {
        println!(
            "  {}. {} [{}] save {:.2} INR (effort {}, risk {})",
            i + 1,
            rec.title.cyan(),
            rec.service,
            rec.potential_savings,
            rec.effort,
            rec.risk
        );
    }
    println!(
        "\nTotal potential savings: {} ({:.1}% of spend)",
        format!("{:.2} INR", report.total_potential_savings).green().bold(),
        report.savings_ratio() * 100.0
    );
}
