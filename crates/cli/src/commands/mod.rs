pub mod analyze;
pub mod fetch_data;
pub mod fill_rate;
pub mod trend;

pub use analyze::AnalyzeArgs;
pub use fetch_data::FetchDataArgs;
pub use fill_rate::FillRateArgs;
pub use trend::TrendArgs;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use tank_recon_core::{AppConfig, DataProvider, Reading};
use tank_recon_data::{FixtureStore, UpstreamClient};

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date {s:?}, expected YYYY-MM-DD"))
}

/// Start of the day after `date`, used as an exclusive upper fetch bound.
pub(crate) fn day_after(date: NaiveDate) -> DateTime<Utc> {
    date.succ_opt()
        .unwrap_or(date)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Upstream client by default, fixture directory when one is given.
pub(crate) fn build_provider(
    config: &AppConfig,
    fixtures: Option<&Path>,
) -> Result<Box<dyn DataProvider>> {
    match fixtures {
        Some(dir) => Ok(Box::new(FixtureStore::new(dir))),
        None => Ok(Box::new(UpstreamClient::new(&config.upstream)?)),
    }
}

/// Splits flattened readings into per-vessel timestamp/level columns.
pub(crate) fn series_by_vessel(
    readings: &[Reading],
) -> BTreeMap<String, (Vec<DateTime<Utc>>, Vec<f64>)> {
    let mut grouped: BTreeMap<String, (Vec<DateTime<Utc>>, Vec<f64>)> = BTreeMap::new();
    for reading in readings {
        let (timestamps, levels) = grouped.entry(reading.vessel_id.clone()).or_default();
        timestamps.push(reading.timestamp);
        levels.push(reading.level);
    }
    grouped
}
