// =============================================================================
// Adverse Selection Proxy
// =============================================================================
//
// proxy = -mean(sign(signal) * forward_return)
//
// A positive value means trading in the signal's direction systematically
// loses: the flow on the other side knew more.

use serde::{Deserialize, Serialize};

use crate::metrics::stats::{is_defined, sign};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdverseSelection {
    pub value: Option<f64>,
    pub n: usize,
}

/// Negative mean signed forward return over rows carrying a prediction.
///
/// Zero-signal rows make no prediction and are excluded, as for hit rate.
pub fn adverse_selection_proxy(signal: &[f64], forward_return: &[f64]) -> AdverseSelection {
    let (sum, n) = signal
        .iter()
        .zip(forward_return)
        .filter(|(s, r)| is_defined(**s) && is_defined(**r) && **s != 0.0)
        .fold((0.0_f64, 0usize), |(sum, n), (s, r)| (sum + sign(*s) * r, n + 1));

    AdverseSelection {
        value: (n > 0).then(|| -(sum / n as f64)),
        n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_returns_have_no_adverse_selection() {
        let result = adverse_selection_proxy(&[1.0, -1.0], &[0.05, 0.05]);
        assert_eq!(result.n, 2);
        let value = result.value.unwrap();
        assert!(value.abs() < 1e-15);
    }

    #[test]
    fn losing_direction_is_positive() {
        // buy before a fall, sell before a rise
        let result = adverse_selection_proxy(&[2.0, -0.5], &[-0.01, 0.03]);
        assert!((result.value.unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_undefined() {
        let result = adverse_selection_proxy(&[f64::NAN], &[0.1]);
        assert_eq!(result, AdverseSelection { value: None, n: 0 });
    }

    #[test]
    fn zero_signal_rows_are_excluded() {
        let result = adverse_selection_proxy(&[0.0, 1.0], &[0.5, 0.1]);
        assert_eq!(result.n, 1);
        assert!((result.value.unwrap() + 0.1).abs() < 1e-12);
    }
}
