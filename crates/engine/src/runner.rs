//! Batch driver for a reconciliation run.
//!
//! Fetching already happened by the time this runs: the engine is handed
//! flattened readings, the vessel catalog, and the ticket index, and walks
//! every (vessel, date) pair in the inclusive range. Per-vessel profiles are
//! built once and reused across dates. Per-pair problems degrade to "no
//! activity for this pair"; nothing here aborts the batch.

use crate::extract::extract_drain_events;
use crate::reconcile::{reconcile, SubsetBudget};
use crate::report::ReconciliationReport;
use crate::segment::SegmentProfile;
use crate::ticket_index::TicketIndex;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use tank_recon_core::{AnalysisConfig, Reading, ReconError, TrendConfig, Vessel};
use tracing::{debug, info, warn};

/// Everything a run consumes, assembled by the caller from a `DataProvider`.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub readings: Vec<Reading>,
    pub vessels: Vec<Vessel>,
    pub tickets: TicketIndex,
}

/// One vessel's series split into parallel timestamp/level columns.
struct VesselSeries {
    timestamps: Vec<DateTime<Utc>>,
    levels: Vec<f64>,
}

fn group_by_vessel(readings: &[Reading]) -> BTreeMap<String, VesselSeries> {
    let mut grouped: BTreeMap<String, VesselSeries> = BTreeMap::new();
    for reading in readings {
        let series = grouped
            .entry(reading.vessel_id.clone())
            .or_insert_with(|| VesselSeries {
                timestamps: Vec::new(),
                levels: Vec::new(),
            });
        series.timestamps.push(reading.timestamp);
        series.levels.push(reading.level);
    }
    grouped
}

/// The reconciliation engine: configuration plus the date×vessel loop.
pub struct AnalysisEngine {
    analysis: AnalysisConfig,
    trend: TrendConfig,
}

impl AnalysisEngine {
    #[must_use]
    pub fn new(analysis: AnalysisConfig, trend: TrendConfig) -> Self {
        Self { analysis, trend }
    }

    /// Runs the full reconciliation over `start..=end` and returns the
    /// aggregated report.
    #[must_use]
    pub fn run(
        &self,
        input: &AnalysisInput,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReconciliationReport {
        let mut report = ReconciliationReport::new(start, end, self.analysis.volume_tolerance);
        let grouped = group_by_vessel(&input.readings);
        let budget = SubsetBudget {
            max_pool: self.analysis.max_subset_pool,
            max_subsets: self.analysis.max_subsets_explored,
        };
        let min_samples = self.trend.min_required_samples();
        let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();

        info!(
            vessels = input.vessels.len(),
            readings = input.readings.len(),
            tickets = input.tickets.accepted(),
            days = dates.len(),
            "starting reconciliation run"
        );

        for vessel in &input.vessels {
            let Some(series) = grouped.get(&vessel.id) else {
                debug!(vessel_id = %vessel.id, "no readings in range, skipping");
                continue;
            };
            if series.levels.is_empty() {
                debug!(vessel_id = %vessel.id, "empty series, skipping");
                continue;
            }
            if series.levels.len() < min_samples {
                let err = ReconError::InsufficientSeries {
                    vessel_id: vessel.id.clone(),
                    samples: series.levels.len(),
                    required: min_samples,
                };
                warn!(%err, "skipping vessel for this run");
                continue;
            }

            let epsilon = self.analysis.epsilon_for(&vessel.id);
            let profile = SegmentProfile::from_series(&series.timestamps, &series.levels, epsilon);
            let fill_rate = profile.average_positive_slope();
            debug!(
                vessel_id = %vessel.id,
                inflection_points = profile.inflection_points().len(),
                fill_rate,
                "vessel profile ready"
            );

            for &date in &dates {
                let events = extract_drain_events(&profile, date, fill_rate);
                let tickets = input.tickets.get(&vessel.id, date);
                if events.is_empty() && tickets.is_empty() {
                    continue;
                }

                let outcome = reconcile(
                    &vessel.id,
                    date,
                    &events,
                    tickets,
                    self.analysis.volume_tolerance,
                    &budget,
                );
                report.record_pair(date, &vessel.id, outcome);
            }
        }

        info!(
            matches = report.match_count(),
            anomalies = report.anomaly_count(),
            "reconciliation run complete"
        );
        report
    }
}
