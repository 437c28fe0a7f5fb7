//! Long-horizon trend-change detection.
//!
//! The drain pipeline reacts to individual negative segments; this variant
//! looks for regime changes instead: the raw series is smoothed with a
//! Savitzky-Golay filter (quadratic fit), differentiated against real
//! timestamps into a per-minute slope curve, smoothed again, and classified
//! into rising/flat/falling with a dead-band. Only sign flips that persist
//! long enough are reported.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tank_recon_core::{ReconError, TrendConfig};

/// A persistent sign flip of the smoothed slope curve.
#[derive(Debug, Clone, Serialize)]
pub struct TrendChange {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    /// +1 rising, -1 falling.
    pub new_sign: i8,
    /// Samples the new sign held from this index.
    pub persist_samples: usize,
    /// Smoothed slope (level per minute) at the flip.
    pub slope_at_change: f64,
}

/// Full output of one vessel's trend analysis.
#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    pub smoothed: Vec<f64>,
    pub slope_per_min: Vec<f64>,
    pub sign: Vec<i8>,
    pub changes: Vec<TrendChange>,
}

/// Clamps a requested window to an odd value that fits the series, never
/// below 3.
fn clamp_odd_window(requested: usize, n: usize) -> usize {
    let mut window = requested.min(n.saturating_sub(1));
    if window % 2 == 0 {
        window = window.saturating_sub(1);
    }
    window.max(3)
}

/// Savitzky-Golay smoothing with a quadratic fit. Windows shrink near the
/// edges so every output point uses a symmetric neighborhood.
fn savgol_quadratic(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window / 2;
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let m = half.min(i).min(n - 1 - i);
        if m == 0 {
            out.push(values[i]);
            continue;
        }
        let mf = m as f64;
        let denom = (2.0 * mf - 1.0) * (2.0 * mf + 1.0) * (2.0 * mf + 3.0);
        let mut acc = 0.0;
        for j in -(m as i64)..=(m as i64) {
            let jf = j as f64;
            let weight = (3.0 * (3.0 * mf * mf + 3.0 * mf - 1.0) - 15.0 * jf * jf) / denom;
            acc += weight * values[(i as i64 + j) as usize];
        }
        out.push(acc);
    }

    out
}

/// Moving average with the same shrink-at-edges policy.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window / 2;
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let m = half.min(i).min(n - 1 - i);
        let slice = &values[i - m..=i + m];
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }

    out
}

/// Central-difference slope against real timestamps, in level per minute.
fn slope_per_minute(timestamps: &[DateTime<Utc>], smoothed: &[f64]) -> Vec<f64> {
    let n = smoothed.len();
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let (lo, hi) = match i {
            0 => (0, 1),
            i if i == n - 1 => (n - 2, n - 1),
            i => (i - 1, i + 1),
        };
        let dt_secs = (timestamps[hi] - timestamps[lo]).num_seconds() as f64;
        let per_sec = (smoothed[hi] - smoothed[lo]) / (dt_secs + 1e-9);
        out.push(per_sec * 60.0);
    }

    out
}

/// Detects persistent long-term trend changes in one vessel's level series.
///
/// # Errors
///
/// Returns `ReconError::InsufficientSeries` when the series is shorter than
/// the configured smoothing windows require.
pub fn detect_trend_changes(
    vessel_id: &str,
    timestamps: &[DateTime<Utc>],
    levels: &[f64],
    config: &TrendConfig,
) -> Result<TrendAnalysis, ReconError> {
    let n = levels.len();
    let required = config.min_required_samples();
    if n < required {
        return Err(ReconError::InsufficientSeries {
            vessel_id: vessel_id.to_string(),
            samples: n,
            required,
        });
    }

    let smooth_window = clamp_odd_window(config.smooth_window, n);
    let slope_window = clamp_odd_window(config.slope_window, n);

    let smoothed = savgol_quadratic(levels, smooth_window);
    let slope = slope_per_minute(timestamps, &smoothed);
    let slope_smoothed = moving_average(&slope, slope_window);

    let sign: Vec<i8> = slope_smoothed
        .iter()
        .map(|&s| {
            if s > config.slope_threshold {
                1
            } else if s < -config.slope_threshold {
                -1
            } else {
                0
            }
        })
        .collect();

    let mut changes = Vec::new();
    for i in 1..n {
        if sign[i] == sign[i - 1] || sign[i] == 0 {
            continue;
        }
        let new_sign = sign[i];
        let mut j = i;
        while j < n && sign[j] == new_sign {
            j += 1;
        }
        let persist = j - i;
        if persist >= config.min_persist_minutes {
            changes.push(TrendChange {
                index: i,
                timestamp: timestamps[i],
                new_sign,
                persist_samples: persist,
                slope_at_change: slope_smoothed[i],
            });
        }
    }

    Ok(TrendAnalysis {
        smoothed,
        slope_per_min: slope,
        sign,
        changes,
    })
}
