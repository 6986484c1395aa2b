// =============================================================================
// Profiling & Selection Configuration
// =============================================================================
//
// Both configs load from JSON. Every field carries a serde default so that a
// partial file, or `{}`, is a valid configuration. Horizons are written as
// strings ("1s", "30s", "2min").
//
// Defaults are plain values handed to the profiler and selector; there is no
// process-wide mutable configuration.
//
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::forward::{serde_horizon, serde_horizons, DEFAULT_GROUP_COLUMN};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_horizon() -> Duration {
    Duration::from_secs(1)
}

fn default_decay_horizons() -> Vec<Duration> {
    [1, 5, 10, 30, 60, 120, 300]
        .into_iter()
        .map(Duration::from_secs)
        .collect()
}

fn default_group_column() -> String {
    DEFAULT_GROUP_COLUMN.to_string()
}

fn default_weights() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("mean_signed_return".to_string(), 0.5),
        ("hit_rate".to_string(), 0.3),
        ("adverse_selection".to_string(), 0.2),
    ])
}

// =============================================================================
// ProfileConfig
// =============================================================================

/// Horizon settings for one profiling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Primary horizon for hit rate, signed return, regime and adverse
    /// selection metrics.
    #[serde(default = "default_horizon", with = "serde_horizon")]
    pub horizon: Duration,

    /// Horizons for the decay curve, in reporting order.
    #[serde(default = "default_decay_horizons", with = "serde_horizons")]
    pub decay_horizons: Vec<Duration>,

    /// Instrument identifier column.
    #[serde(default = "default_group_column")]
    pub group_column: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            decay_horizons: default_decay_horizons(),
            group_column: default_group_column(),
        }
    }
}

impl ProfileConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse profile config from {}", path.display()))?;

        info!(
            path = %path.display(),
            horizon_secs = config.horizon.as_secs_f64(),
            decay_horizons = config.decay_horizons.len(),
            "profile config loaded"
        );

        Ok(config)
    }
}

// =============================================================================
// SelectionConfig
// =============================================================================

/// Constraints and weights for ranking a summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Metric → threshold. `max_<metric>` is an upper bound, any other key a
    /// lower bound.
    #[serde(default)]
    pub constraints: BTreeMap<String, f64>,

    /// Metric → signed weight of its cross-sectional z-score.
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, f64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            constraints: BTreeMap::new(),
            weights: default_weights(),
        }
    }
}

impl SelectionConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read selection config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).with_context(|| {
            format!("failed to parse selection config from {}", path.display())
        })?;

        info!(
            path = %path.display(),
            constraints = ?config.constraints,
            weights = ?config.weights,
            "selection config loaded"
        );

        Ok(config)
    }
}
