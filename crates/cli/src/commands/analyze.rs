use super::{build_provider, day_after, parse_date};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use tank_recon_core::{flatten_snapshots, ConfigLoader};
use tank_recon_engine::{AnalysisEngine, AnalysisInput, TicketIndex};
use tracing::info;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
    /// First day of the analysis range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub start: String,
    /// Last day of the analysis range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub end: String,
    /// Read fixtures from this directory instead of the upstream service
    #[arg(long)]
    pub fixtures: Option<PathBuf>,
    /// Output report path
    #[arg(short, long, default_value = "report.json")]
    pub output: String,
    /// Override the configured volume tolerance
    #[arg(long)]
    pub tolerance: Option<f64>,
    /// Override the configured simplification epsilon
    #[arg(long)]
    pub epsilon: Option<f64>,
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let mut config = ConfigLoader::load_from(&args.config)?;
    if let Some(tolerance) = args.tolerance {
        config.analysis.volume_tolerance = tolerance;
    }
    if let Some(epsilon) = args.epsilon {
        config.analysis.epsilon = epsilon;
    }

    let start = parse_date(&args.start)?;
    let end = parse_date(&args.end)?;
    if start > end {
        bail!("start date {start} is after end date {end}");
    }

    let provider = build_provider(&config, args.fixtures.as_deref())?;

    // The vessel fill rate is derived from the entire available history, so
    // readings are fetched from the epoch up to the end of the range, not
    // just the analysis window.
    let fetch_start = DateTime::<Utc>::UNIX_EPOCH;
    let fetch_end = day_after(end);
    let snapshots = provider.fetch_readings(fetch_start, fetch_end).await?;
    let vessels = provider.fetch_vessels().await?;
    let ledger = provider.fetch_tickets().await?;

    let input = AnalysisInput {
        readings: flatten_snapshots(&snapshots),
        vessels,
        tickets: TicketIndex::build(ledger),
    };

    let engine = AnalysisEngine::new(config.analysis.clone(), config.trend.clone());
    let report = engine.run(&input, start, end);

    std::fs::write(&args.output, report.to_json_pretty()?)
        .with_context(|| format!("writing report to {}", args.output))?;
    info!(
        output = %args.output,
        matches = report.match_count(),
        anomalies = report.anomaly_count(),
        "report written"
    );

    Ok(())
}
