use super::{build_provider, series_by_vessel};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use tank_recon_core::{flatten_snapshots, ConfigLoader};
use tank_recon_engine::trend::detect_trend_changes;
use tracing::info;

#[derive(Args)]
pub struct TrendArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
    /// Vessel to analyze
    #[arg(long)]
    pub vessel: String,
    /// Read fixtures from this directory instead of the upstream service
    #[arg(long)]
    pub fixtures: Option<PathBuf>,
}

pub async fn run(args: TrendArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;
    let provider = build_provider(&config, args.fixtures.as_deref())?;

    let snapshots = provider
        .fetch_readings(DateTime::<Utc>::UNIX_EPOCH, Utc::now())
        .await?;
    let readings = flatten_snapshots(&snapshots);
    let grouped = series_by_vessel(&readings);

    let Some((timestamps, levels)) = grouped.get(&args.vessel) else {
        bail!("no readings found for vessel {}", args.vessel);
    };

    let analysis = detect_trend_changes(&args.vessel, timestamps, levels, &config.trend)?;
    info!(
        vessel_id = %args.vessel,
        samples = levels.len(),
        changes = analysis.changes.len(),
        "trend analysis complete"
    );
    println!("{}", serde_json::to_string_pretty(&analysis.changes)?);

    Ok(())
}
