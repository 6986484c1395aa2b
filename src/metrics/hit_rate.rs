// =============================================================================
// Hit Rate — Directional accuracy of the signal
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::metrics::stats::{is_defined, sign};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRateResult {
    /// Fraction of predictions whose sign matched the forward return's sign.
    pub hit_rate: Option<f64>,
    /// Number of rows that carried a prediction.
    pub n: usize,
}

/// Fraction of rows where `sign(signal) == sign(forward_return)`.
///
/// A zero signal makes no prediction and is neither a hit nor a miss. A zero
/// forward return against a non-zero signal is a miss.
pub fn hit_rate(signal: &[f64], forward_return: &[f64]) -> HitRateResult {
    let mut hits = 0usize;
    let mut n = 0usize;

    for (&s, &r) in signal.iter().zip(forward_return) {
        if !is_defined(s) || !is_defined(r) || s == 0.0 {
            continue;
        }
        n += 1;
        if sign(s) == sign(r) {
            hits += 1;
        }
    }

    HitRateResult {
        hit_rate: (n > 0).then(|| hits as f64 / n as f64),
        n,
    }
}
