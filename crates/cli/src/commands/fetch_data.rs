use super::{build_provider, day_after, parse_date};
use anyhow::{bail, Result};
use chrono::NaiveTime;
use clap::Args;
use std::path::PathBuf;
use tank_recon_core::{flatten_snapshots, ConfigLoader};
use tank_recon_data::CsvStorage;
use tracing::info;

#[derive(Args)]
pub struct FetchDataArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
    /// First day to fetch (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub start: String,
    /// Last day to fetch (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub end: String,
    /// Read fixtures from this directory instead of the upstream service
    #[arg(long)]
    pub fixtures: Option<PathBuf>,
    /// Output CSV file path
    #[arg(short, long)]
    pub output: String,
}

pub async fn run(args: FetchDataArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;
    let start = parse_date(&args.start)?;
    let end = parse_date(&args.end)?;
    if start > end {
        bail!("start date {start} is after end date {end}");
    }

    let provider = build_provider(&config, args.fixtures.as_deref())?;
    let snapshots = provider
        .fetch_readings(start.and_time(NaiveTime::MIN).and_utc(), day_after(end))
        .await?;
    let readings = flatten_snapshots(&snapshots);

    CsvStorage::write_readings(&args.output, &readings)?;
    info!(
        output = %args.output,
        readings = readings.len(),
        "snapshot written"
    );

    Ok(())
}
