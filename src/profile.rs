// =============================================================================
// Profile Runner — Applies the metric suite to every candidate alpha
// =============================================================================
//
// Pipeline:
//   1. Resolve the forward return once at the primary horizon.
//   2. Plan the decay horizons (configured ∩ available, else all available).
//   3. Evaluate each signal column independently (in parallel): hit rate,
//      mean signed return, decay curve, regime dependence, adverse
//      selection, conditional distribution.
//   4. Sort the summary by mean signed return, best first.
//
// A signal whose metrics are all undefined still gets a summary row; one bad
// column never aborts the others.

use std::cmp::Ordering;
use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ProfileConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::forward::{
    available_horizons, resolve, ForwardReturnSpec, DEFAULT_MID_COLUMN, FORWARD_RETURN,
};
use crate::metrics::stats::{is_defined, mean, sign};
use crate::metrics::{
    adverse_selection_proxy, conditional_return_distribution, decay_curve, hit_rate,
    regime_dependence, BucketStats, DecayPoint, RegimeStats, DEFAULT_BINS, DEFAULT_REGIMES,
    DEFAULT_VOL_WINDOW,
};

// =============================================================================
// Signal discovery
// =============================================================================

const ALPHA_PREFIX: &str = "ob";
const ALPHA_RETURN_MARKER: &str = "_ret";
const ALPHA_SUFFIX: &str = "_";

/// Whether `name` follows the return-style alpha naming convention:
/// `ob…_ret…_`.
pub fn is_alpha_column(name: &str) -> bool {
    name.starts_with(ALPHA_PREFIX)
        && name.contains(ALPHA_RETURN_MARKER)
        && name.ends_with(ALPHA_SUFFIX)
}

/// Alpha columns of `dataset`, in column order.
pub fn alpha_columns(dataset: &Dataset) -> Vec<String> {
    dataset
        .column_names()
        .iter()
        .filter(|name| is_alpha_column(name))
        .cloned()
        .collect()
}

// =============================================================================
// Decay horizon policy
// =============================================================================

/// Where the decay curve's horizons came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayHorizonSource {
    /// Configured horizons that exist in the dataset.
    Configured,
    /// None of the configured horizons exist; every available horizon is
    /// used instead.
    AllAvailable,
}

impl std::fmt::Display for DecayHorizonSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::AllAvailable => write!(f, "all-available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecayHorizonPlan {
    pub horizons: Vec<Duration>,
    pub source: DecayHorizonSource,
}

/// Keep configured horizons that are available, in configured order. If
/// none are, degrade to every available horizon (ascending) rather than
/// failing.
pub fn plan_decay_horizons(configured: &[Duration], available: &[Duration]) -> DecayHorizonPlan {
    let horizons: Vec<Duration> = configured
        .iter()
        .copied()
        .filter(|h| available.contains(h))
        .collect();

    if horizons.is_empty() {
        return DecayHorizonPlan {
            horizons: available.to_vec(),
            source: DecayHorizonSource::AllAvailable,
        };
    }

    DecayHorizonPlan {
        horizons,
        source: DecayHorizonSource::Configured,
    }
}

// =============================================================================
// Report types
// =============================================================================

/// One row of the profile summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub alpha: String,
    pub hit_rate: Option<f64>,
    pub hit_n: usize,
    pub mean_signed_return: Option<f64>,
    pub adverse_selection: Option<f64>,
    pub adverse_n: usize,
    /// Composite score, set by selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SummaryRow {
    /// Metric value by column name. Outer `None`: no such metric. Inner
    /// `None`: metric undefined for this alpha.
    pub fn metric(&self, name: &str) -> Option<Option<f64>> {
        match name {
            "hit_rate" => Some(self.hit_rate),
            "hit_n" => Some(Some(self.hit_n as f64)),
            "mean_signed_return" => Some(self.mean_signed_return),
            "adverse_selection" => Some(self.adverse_selection),
            "adverse_n" => Some(Some(self.adverse_n as f64)),
            "score" => Some(self.score),
            _ => None,
        }
    }
}

/// Detail tables for one alpha.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlphaDetail {
    pub alpha: String,
    pub decay_curve: Vec<DecayPoint>,
    pub regime_dependence: Vec<RegimeStats>,
    pub conditional_distribution: Vec<BucketStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    /// Sorted by mean signed return, best first.
    pub summary: Vec<SummaryRow>,
    /// In signal evaluation order.
    pub details: Vec<AlphaDetail>,
    pub decay_source: DecayHorizonSource,
}

impl ProfileReport {
    pub fn detail(&self, alpha: &str) -> Option<&AlphaDetail> {
        self.details.iter().find(|d| d.alpha == alpha)
    }
}

/// Descending order with undefined values last.
pub(crate) fn descending_defined_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Mean of `sign(signal) * forward_return`. Zero signals count, contributing
/// zero; only undefined rows are skipped.
pub fn mean_signed_return(signal: &[f64], forward_return: &[f64]) -> Option<f64> {
    let signed: Vec<f64> = signal
        .iter()
        .zip(forward_return)
        .map(|(s, r)| sign(*s) * r)
        .filter(|x| is_defined(*x))
        .collect();
    mean(&signed)
}

/// Profile every signal column of `dataset`.
///
/// `signal_columns = None` discovers signals with [`is_alpha_column`].
pub fn run_profile(
    dataset: &Dataset,
    signal_columns: Option<&[String]>,
    config: &ProfileConfig,
) -> Result<ProfileReport> {
    let signals: Vec<String> = match signal_columns {
        Some(cols) => {
            for col in cols {
                dataset.require_float(col)?;
            }
            cols.to_vec()
        }
        None => alpha_columns(dataset)
            .into_iter()
            .filter(|col| {
                let numeric = dataset.float(col).is_some();
                if !numeric {
                    warn!(alpha = %col, "alpha column is not numeric, skipped");
                }
                numeric
            })
            .collect(),
    };

    let plan = plan_decay_horizons(&config.decay_horizons, &available_horizons(dataset));
    if plan.source == DecayHorizonSource::AllAvailable {
        warn!(
            configured = ?config.decay_horizons,
            using = ?plan.horizons,
            "no configured decay horizon available, falling back to all available"
        );
    }

    let spec = ForwardReturnSpec::new(config.horizon, config.group_column.clone());
    let resolved = resolve(dataset, &spec)?;
    let forward = resolved.require_float(FORWARD_RETURN)?;

    info!(
        rows = dataset.len(),
        signals = signals.len(),
        horizon_secs = config.horizon.as_secs(),
        decay_horizons = plan.horizons.len(),
        decay_source = %plan.source,
        "profiling alphas"
    );

    let evaluated = signals
        .par_iter()
        .map(|col| evaluate_signal(&resolved, col, forward, &plan.horizons, config))
        .collect::<Result<Vec<_>>>()?;

    let (mut summary, details): (Vec<SummaryRow>, Vec<AlphaDetail>) =
        evaluated.into_iter().unzip();
    summary.sort_by(|a, b| descending_defined_last(a.mean_signed_return, b.mean_signed_return));

    Ok(ProfileReport {
        summary,
        details,
        decay_source: plan.source,
    })
}

fn evaluate_signal(
    resolved: &Dataset,
    column: &str,
    forward: &[f64],
    decay_horizons: &[Duration],
    config: &ProfileConfig,
) -> Result<(SummaryRow, AlphaDetail)> {
    let signal = resolved.require_float(column)?;

    let hr = hit_rate(signal, forward);
    let msr = mean_signed_return(signal, forward);
    let decay = decay_curve(resolved, column, decay_horizons, &config.group_column)?;
    let regime = regime_dependence(
        resolved,
        column,
        FORWARD_RETURN,
        DEFAULT_MID_COLUMN,
        DEFAULT_VOL_WINDOW,
        DEFAULT_REGIMES,
    )?;
    let adverse = adverse_selection_proxy(signal, forward);
    let conditional = conditional_return_distribution(signal, forward, DEFAULT_BINS);

    debug!(
        alpha = column,
        hit_rate = ?hr.hit_rate,
        hit_n = hr.n,
        mean_signed_return = ?msr,
        adverse_selection = ?adverse.value,
        regimes = regime.len(),
        buckets = conditional.len(),
        "alpha profiled"
    );

    let row = SummaryRow {
        alpha: column.to_string(),
        hit_rate: hr.hit_rate,
        hit_n: hr.n,
        mean_signed_return: msr,
        adverse_selection: adverse.value,
        adverse_n: adverse.n,
        score: None,
    };
    let detail = AlphaDetail {
        alpha: column.to_string(),
        decay_curve: decay,
        regime_dependence: regime,
        conditional_distribution: conditional,
    };
    Ok((row, detail))
}
