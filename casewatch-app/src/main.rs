use anyhow::Result;
use casewatch_common::observability::{init_logging, LogConfig};
use casewatch_config::CasewatchConfigLoader;
use clap::Parser;
use std::path::PathBuf;

mod pipeline;

/// Fetch regional COVID-19 statistics, chart the weekly rates per 100,000
/// population, and post the chart with a short summary.
#[derive(Parser, Debug)]
#[command(name = "casewatch", version)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "casewatch.yaml")]
    config: PathBuf,
    /// Fetch, derive, and render, but skip the publish step.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config first so a bad file fails before any side effects.
    let cfg = CasewatchConfigLoader::new().with_file(&cli.config).load()?;

    let log_path = init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;
    tracing::info!(
        config = %cli.config.display(),
        log = %log_path.display(),
        dry_run = cli.dry_run,
        "casewatch starting"
    );

    pipeline::run(cfg, cli.dry_run).await
}
