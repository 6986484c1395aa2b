// =============================================================================
// Decay Curve — Information coefficient per horizon
// =============================================================================
//
// IC(h) = corr(signal, forward_return(h)). Reading the curve left to right
// shows how quickly the signal's predictive power fades.

use std::time::Duration;

use serde::Serialize;
use tracing::trace;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::forward::{
    forward_view, serde_horizon, ForwardReturnSpec, DEFAULT_MID_COLUMN, DEFAULT_TIMESTAMP_COLUMN,
};
use crate::metrics::stats::pearson;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecayPoint {
    #[serde(with = "serde_horizon")]
    pub horizon: Duration,
    /// Pearson correlation; `None` when undefined (constant or too few rows).
    pub ic: Option<f64>,
}

/// IC of `signal_column` at each horizon, in the order given.
///
/// Every horizon must resolve; a missing horizon column is a configuration
/// error, not a gap in the curve.
pub fn decay_curve(
    dataset: &Dataset,
    signal_column: &str,
    horizons: &[Duration],
    group_column: &str,
) -> Result<Vec<DecayPoint>> {
    let signal = dataset.require_float(signal_column)?;

    horizons
        .iter()
        .map(|&horizon| {
            let spec = ForwardReturnSpec::new(horizon, group_column);
            let view =
                forward_view(dataset, &spec, DEFAULT_TIMESTAMP_COLUMN, DEFAULT_MID_COLUMN)?;
            let ic = pearson(signal, view.returns);
            trace!(
                signal = signal_column,
                horizon_secs = horizon.as_secs(),
                ic = ?ic,
                "decay point"
            );
            Ok(DecayPoint { horizon, ic })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::error::ProfileError;

    fn dataset() -> Dataset {
        let n = 6;
        let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        Dataset::new()
            .with_column("timestamp", Column::Timestamp(vec![None; n]))
            .unwrap()
            .with_float("mid", vec![100.0; n])
            .unwrap()
            .with_float("ob_ret_a_", signal)
            .unwrap()
            .with_float("ret1", vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6])
            .unwrap()
            .with_float("ret5", vec![0.6, 0.5, 0.4, 0.3, 0.2, 0.1])
            .unwrap()
            .with_float("ret10", vec![0.3; n])
            .unwrap()
    }

    #[test]
    fn preserves_horizon_order() {
        let horizons = [
            Duration::from_secs(10),
            Duration::from_secs(1),
            Duration::from_secs(5),
        ];
        let curve = decay_curve(&dataset(), "ob_ret_a_", &horizons, "name").unwrap();
        let got: Vec<Duration> = curve.iter().map(|p| p.horizon).collect();
        assert_eq!(got, horizons.to_vec());
        assert_eq!(curve[0].ic, None);
        assert!((curve[1].ic.unwrap() - 1.0).abs() < 1e-12);
        assert!((curve[2].ic.unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn unresolvable_horizon_is_an_error() {
        let err = decay_curve(&dataset(), "ob_ret_a_", &[Duration::from_secs(30)], "name")
            .unwrap_err();
        assert!(matches!(err, ProfileError::MissingColumn { .. }));
    }

    #[test]
    fn missing_signal_is_an_error() {
        assert!(decay_curve(&dataset(), "ob_ret_zz_", &[Duration::from_secs(1)], "name").is_err());
    }

    #[test]
    fn no_horizons_gives_empty_curve() {
        assert!(decay_curve(&dataset(), "ob_ret_a_", &[], "name")
            .unwrap()
            .is_empty());
    }
}
