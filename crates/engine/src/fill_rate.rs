//! Per-vessel net fill-rate summary.
//!
//! The mean of consecutive level deltas over the fetched history (one sample
//! per minute) gives a vessel's net rate. Combined with the catalog capacity
//! and the latest observed level it yields a rough time-to-capacity
//! projection for dispatch planning.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FillRateSummary {
    pub vessel_id: String,
    /// Mean net level change per minute across the whole series.
    pub avg_rate_per_min: f64,
    pub latest_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_volume: Option<f64>,
    /// Projected minutes until the vessel reaches capacity; absent when the
    /// net rate is not positive or the vessel is not in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_to_capacity: Option<f64>,
}

/// Summarizes a vessel's net fill behavior. Returns `None` for series with
/// fewer than two samples (no delta to average).
#[must_use]
pub fn fill_rate_summary(
    vessel_id: &str,
    levels: &[f64],
    max_volume: Option<f64>,
) -> Option<FillRateSummary> {
    if levels.len() < 2 {
        return None;
    }

    let deltas = levels.len() - 1;
    let avg_rate_per_min: f64 = levels
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .sum::<f64>()
        / deltas as f64;
    let latest_level = levels[levels.len() - 1];

    let minutes_to_capacity = match max_volume {
        Some(capacity) if avg_rate_per_min > 0.0 => {
            Some(((capacity - latest_level) / avg_rate_per_min).max(0.0))
        }
        _ => None,
    };

    Some(FillRateSummary {
        vessel_id: vessel_id.to_string(),
        avg_rate_per_min,
        latest_level,
        max_volume,
        minutes_to_capacity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_delta_over_steady_fill() {
        let levels: Vec<f64> = (0..10).map(|i| f64::from(i) * 2.0).collect();
        let summary = fill_rate_summary("vessel_001", &levels, Some(100.0)).unwrap();
        assert!((summary.avg_rate_per_min - 2.0).abs() < 1e-9);
        assert_eq!(summary.latest_level, 18.0);
        // (100 - 18) / 2 = 41 minutes.
        assert!((summary.minutes_to_capacity.unwrap() - 41.0).abs() < 1e-9);
    }

    #[test]
    fn draining_vessel_has_no_capacity_projection() {
        let levels: Vec<f64> = (0..10).map(|i| 100.0 - f64::from(i)).collect();
        let summary = fill_rate_summary("vessel_001", &levels, Some(200.0)).unwrap();
        assert!(summary.avg_rate_per_min < 0.0);
        assert!(summary.minutes_to_capacity.is_none());
    }

    #[test]
    fn unknown_vessel_has_no_capacity_projection() {
        let levels = vec![1.0, 2.0, 3.0];
        let summary = fill_rate_summary("vessel_x", &levels, None).unwrap();
        assert!(summary.minutes_to_capacity.is_none());
    }

    #[test]
    fn short_series_yields_none() {
        assert!(fill_rate_summary("vessel_001", &[5.0], Some(10.0)).is_none());
        assert!(fill_rate_summary("vessel_001", &[], Some(10.0)).is_none());
    }

    #[test]
    fn overfull_vessel_projects_zero_minutes() {
        let levels = vec![90.0, 95.0, 100.0, 105.0];
        let summary = fill_rate_summary("vessel_001", &levels, Some(100.0)).unwrap();
        assert_eq!(summary.minutes_to_capacity, Some(0.0));
    }
}
