use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub analysis: AnalysisConfig,
    pub trend: TrendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Knobs for the reconciliation engine. The analysis date range is a run
/// argument, not configuration (see `AnalysisEngine::run`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Absolute volume margin within which a drain and a ticket (or ticket
    /// sum) are considered the same event. Same units as the level series.
    pub volume_tolerance: f64,
    /// Polyline-simplification tolerance applied to every vessel unless
    /// overridden per vessel.
    pub epsilon: f64,
    /// Per-vessel epsilon overrides, keyed by vessel id.
    #[serde(default)]
    pub epsilon_overrides: HashMap<String, f64>,
    /// Largest remaining-ticket pool the combinatorial phase will search.
    pub max_subset_pool: usize,
    /// Budget of candidate subsets examined per drain event before the
    /// search gives up.
    pub max_subsets_explored: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Savitzky-Golay smoothing window over raw levels (odd).
    pub smooth_window: usize,
    /// Moving-average window over the slope curve (odd).
    pub slope_window: usize,
    /// Minimum samples a new slope sign must persist to count as a change.
    pub min_persist_minutes: usize,
    /// Dead-band below which the smoothed slope is treated as flat (L/min).
    pub slope_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_secs: 30,
            },
            analysis: AnalysisConfig::default(),
            trend: TrendConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            volume_tolerance: 1.5,
            epsilon: 20.0,
            epsilon_overrides: HashMap::new(),
            max_subset_pool: 20,
            max_subsets_explored: 200_000,
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            smooth_window: 31,
            slope_window: 11,
            min_persist_minutes: 30,
            slope_threshold: 1e-3,
        }
    }
}

impl AnalysisConfig {
    /// Simplification tolerance for a vessel, honoring per-vessel overrides.
    #[must_use]
    pub fn epsilon_for(&self, vessel_id: &str) -> f64 {
        self.epsilon_overrides
            .get(vessel_id)
            .copied()
            .unwrap_or(self.epsilon)
    }
}

impl TrendConfig {
    /// Minimum series length the smoothing windows require. Vessels below
    /// this are skipped for the run with `ReconError::InsufficientSeries`.
    #[must_use]
    pub fn min_required_samples(&self) -> usize {
        self.smooth_window.max(self.slope_window) + 2
    }
}
