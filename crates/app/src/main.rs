mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use taxwise_core::{analyze, AnalysisReport};
use taxwise_import::{ClassifierRules, Ingestion};
use tracing_subscriber::EnvFilter;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "taxwise", version, about = "Turn bank statements into categorized transactions.")]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract transactions from a CSV, spreadsheet or PDF statement.
    Ingest {
        file: PathBuf,
        /// Also print the analysis report
        #[arg(long)]
        report: bool,
    },
    /// Print only the analysis report for a statement.
    Analyze { file: PathBuf },
    /// Print the built-in classifier rules as TOML.
    Rules,
}

#[derive(Serialize)]
struct WithReport<'a> {
    ingestion: &'a Ingestion,
    report: AnalysisReport,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.log_filter);

    match cli.command {
        Commands::Ingest { file, report } => {
            let ingestion = ingest(&config, &file)?;
            let out = if report {
                let report = analyze(&ingestion.transactions);
                serde_json::to_string_pretty(&WithReport {
                    ingestion: &ingestion,
                    report,
                })?
            } else {
                serde_json::to_string_pretty(&ingestion)?
            };
            println!("{out}");
        }
        Commands::Analyze { file } => {
            let ingestion = ingest(&config, &file)?;
            println!("{}", serde_json::to_string_pretty(&analyze(&ingestion.transactions))?);
        }
        Commands::Rules => {
            print!("{}", toml::to_string_pretty(&ClassifierRules::default())?);
        }
    }
    Ok(())
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr.
fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn ingest(config: &AppConfig, file: &Path) -> anyhow::Result<Ingestion> {
    let content = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let router = config.router()?;
    let ingestion = router.ingest(&content, &filename)?;
    if !ingestion.dropped.is_empty() {
        for (reason, count) in ingestion.drop_counts() {
            tracing::info!(%reason, count, "rows dropped");
        }
    }
    Ok(ingestion)
}
