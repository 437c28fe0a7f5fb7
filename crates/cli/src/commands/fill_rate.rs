use super::{build_provider, series_by_vessel};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use tank_recon_core::{flatten_snapshots, ConfigLoader};
use tank_recon_engine::fill_rate::{fill_rate_summary, FillRateSummary};
use tracing::warn;

#[derive(Args)]
pub struct FillRateArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
    /// Read fixtures from this directory instead of the upstream service
    #[arg(long)]
    pub fixtures: Option<PathBuf>,
}

pub async fn run(args: FillRateArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;
    let provider = build_provider(&config, args.fixtures.as_deref())?;

    let snapshots = provider
        .fetch_readings(DateTime::<Utc>::UNIX_EPOCH, Utc::now())
        .await?;
    let vessels = provider.fetch_vessels().await?;
    let readings = flatten_snapshots(&snapshots);
    let grouped = series_by_vessel(&readings);

    let mut summaries: Vec<FillRateSummary> = Vec::new();
    for vessel in &vessels {
        let Some((_, levels)) = grouped.get(&vessel.id) else {
            warn!(vessel_id = %vessel.id, "no readings, skipping");
            continue;
        };
        match fill_rate_summary(&vessel.id, levels, Some(vessel.max_volume)) {
            Some(summary) => summaries.push(summary),
            None => warn!(vessel_id = %vessel.id, "series too short, skipping"),
        }
    }

    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}
