//! Slope segmentation of a simplified level series.
//!
//! Consecutive inflection points define implicit segments whose slope is
//! level change per sample ordinal (samples arrive once a minute, so the
//! unit is level per minute). Positive slopes are fill periods, negative
//! slopes are drain periods. The mean of all strictly positive slopes over
//! the vessel's entire history is its characteristic background fill rate,
//! used by the extractor's inflow compensation.

use crate::simplify::{simplify_polyline, Point};
use chrono::{DateTime, Utc};

/// A retained sample after simplification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InflectionPoint {
    /// Position of the sample in the original series.
    pub ordinal: usize,
    pub timestamp: DateTime<Utc>,
    pub level: f64,
}

/// Inflection points and per-segment slopes for one vessel's full history.
#[derive(Debug, Clone)]
pub struct SegmentProfile {
    points: Vec<InflectionPoint>,
    slopes: Vec<f64>,
}

impl SegmentProfile {
    /// Simplifies the series with tolerance `epsilon` and derives segment
    /// slopes. `timestamps` and `levels` must be parallel and ordered.
    #[must_use]
    pub fn from_series(timestamps: &[DateTime<Utc>], levels: &[f64], epsilon: f64) -> Self {
        debug_assert_eq!(timestamps.len(), levels.len());

        let raw: Vec<Point> = levels
            .iter()
            .enumerate()
            .map(|(i, &y)| Point { x: i as f64, y })
            .collect();

        let points: Vec<InflectionPoint> = simplify_polyline(&raw, epsilon)
            .into_iter()
            .map(|p| {
                let ordinal = p.x as usize;
                InflectionPoint {
                    ordinal,
                    timestamp: timestamps[ordinal],
                    level: p.y,
                }
            })
            .collect();

        let mut slopes = Vec::with_capacity(points.len().saturating_sub(1));
        for pair in points.windows(2) {
            let dt = pair[1].ordinal as i64 - pair[0].ordinal as i64;
            if dt <= 0 {
                continue;
            }
            slopes.push((pair[1].level - pair[0].level) / dt as f64);
        }

        Self { points, slopes }
    }

    #[must_use]
    pub fn inflection_points(&self) -> &[InflectionPoint] {
        &self.points
    }

    #[must_use]
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    /// Mean of the strictly positive segment slopes, or 0 if none exist.
    /// Non-negative by construction.
    #[must_use]
    pub fn average_positive_slope(&self) -> f64 {
        let positive: Vec<f64> = self.slopes.iter().copied().filter(|s| *s > 0.0).collect();
        if positive.is_empty() {
            0.0
        } else {
            positive.iter().sum::<f64>() / positive.len() as f64
        }
    }

    /// Mean of the strictly negative segment slopes, or 0 if none exist.
    #[must_use]
    pub fn average_negative_slope(&self) -> f64 {
        let negative: Vec<f64> = self.slopes.iter().copied().filter(|s| *s < 0.0).collect();
        if negative.is_empty() {
            0.0
        } else {
            negative.iter().sum::<f64>() / negative.len() as f64
        }
    }
}
