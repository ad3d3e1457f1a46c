//! jobtrack - job-application inbox tracker
//!
//! Fetches recruiting mail, classifies replies, keeps the application store
//! up to date and writes a follow-up report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use jobtrack::config::{build_extractor, load_or_default, Config};
use jobtrack::logging::{init_logging, LogFormat};
use jobtrack::pipeline::{
    archive_store, export_report, store_status, LogProgress, Pipeline, PipelineConfig, RunSummary,
};

mod wiring;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Track job applications from your inbox", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "JOBTRACK_CONFIG")]
    config: Option<PathBuf>,

    /// Log output: text|json
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch new mail, update the store and write the follow-up report
    Run {
        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show status totals for the active and archived partitions
    Status,

    /// Archive settled applications and write the follow-up report
    Report,

    /// Move settled applications into the archive
    Archive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_format).context("Failed to initialize logging")?;
    info!("Starting jobtrack v{}", env!("CARGO_PKG_VERSION"));

    let config = load_or_default(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Run { json } => run(&config, json).await,
        Commands::Status => status(&config),
        Commands::Report => report(&config),
        Commands::Archive => archive(&config),
    }
}

async fn run(config: &Config, json: bool) -> Result<()> {
    let extractor = build_extractor(config)?;
    let collaborators = wiring::build_collaborators(config)?;
    let pipeline = Pipeline::new(
        Arc::new(PipelineConfig::from_config(config)),
        extractor,
        collaborators,
    );

    let summary = match pipeline.run(Utc::now(), &LogProgress).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Run aborted: {}", e);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Run {}", summary.run_id);
    println!("  since:        {}", summary.since.format("%Y-%m-%d"));
    println!(
        "  fetched:      {} ({} eligible, {} after dedupe)",
        summary.fetched, summary.eligible, summary.deduplicated
    );
    println!(
        "  added:        {} ({} classification errors)",
        summary.added, summary.classification_errors
    );
    println!("  archived:     {}", summary.archived);
    println!("  active:       {}", summary.active_counts);
    println!("  archive:      {}", summary.archived_counts);
    if let Some(path) = &summary.report_path {
        println!("  report:       {}", path.display());
    }
    for warning in &summary.warnings {
        println!("  warning:      {}", warning);
    }
}

fn status(config: &Config) -> Result<()> {
    let store = wiring::build_store(config);
    let status = store_status(&store, Utc::now(), config.tracking.stale_after_days)?;

    println!("active:   {} ({})", status.active.total(), status.active);
    println!("archived: {} ({})", status.archived.total(), status.archived);
    for drift in &status.drift {
        println!(
            "warning:  {} is missing columns [{}]",
            drift.path.display(),
            drift.missing_columns.join(", ")
        );
    }
    Ok(())
}

fn report(config: &Config) -> Result<()> {
    let store = wiring::build_store(config);
    let sink = wiring::build_report_sink(config);
    let path = export_report(&store, &sink, Utc::now(), config.tracking.stale_after_days)?;
    println!("{}", path.display());
    Ok(())
}

fn archive(config: &Config) -> Result<()> {
    let store = wiring::build_store(config);
    let moved = archive_store(&store, Utc::now(), config.tracking.stale_after_days)?;
    println!("Archived {} applications", moved);
    Ok(())
}
