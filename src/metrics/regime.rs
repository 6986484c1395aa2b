// =============================================================================
// Regime Dependence — Alpha efficacy across realized-volatility regimes
// =============================================================================
//
// Algorithm:
//   1. Keep rows where signal, forward return and mid are all defined.
//   2. vol_t = sample std of mid pct-change over the trailing `window` rows
//      (full window required; the leading rows without history are dropped).
//   3. Split the remaining rows into `regimes` equal-frequency vol buckets
//      (low → high).
//   4. Per bucket: mean / std / count of forward return and the IC between
//      signal and forward return.

use serde::Serialize;
use tracing::trace;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::metrics::stats::{
    is_defined, mean, pct_change, pearson, quantile_buckets, rolling_std, sample_std, take,
    BucketRange,
};

pub const DEFAULT_VOL_WINDOW: usize = 50;
pub const DEFAULT_REGIMES: usize = 3;

/// Forward return statistics within one volatility regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeStats {
    /// Realized volatility range of the regime.
    pub regime: BucketRange,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub count: usize,
    pub signal_ic: Option<f64>,
}

/// Profile `signal_column` against `return_column` per volatility regime.
///
/// Missing columns are configuration errors. Too little history yields an
/// empty table.
pub fn regime_dependence(
    dataset: &Dataset,
    signal_column: &str,
    return_column: &str,
    mid_column: &str,
    window: usize,
    regimes: usize,
) -> Result<Vec<RegimeStats>> {
    let signal = dataset.require_float(signal_column)?;
    let returns = dataset.require_float(return_column)?;
    let mids = dataset.require_float(mid_column)?;

    let rows: Vec<usize> = (0..dataset.len())
        .filter(|&i| is_defined(signal[i]) && is_defined(returns[i]) && is_defined(mids[i]))
        .collect();
    if rows.is_empty() {
        trace!(signal = signal_column, "regime dependence: no defined rows");
        return Ok(Vec::new());
    }

    let signal = take(signal, &rows);
    let returns = take(returns, &rows);
    let vol = rolling_std(&pct_change(&take(mids, &rows)), window);

    let warm: Vec<usize> = (0..rows.len()).filter(|&i| is_defined(vol[i])).collect();
    if warm.is_empty() {
        trace!(
            signal = signal_column,
            rows = rows.len(),
            window,
            "regime dependence: insufficient history"
        );
        return Ok(Vec::new());
    }

    let signal = take(&signal, &warm);
    let returns = take(&returns, &warm);
    let vol = take(&vol, &warm);

    let table = quantile_buckets(&vol, regimes)
        .into_iter()
        .map(|(regime, members)| {
            let r = take(&returns, &members);
            let s = take(&signal, &members);
            RegimeStats {
                regime,
                mean: mean(&r),
                std: sample_std(&r),
                count: members.len(),
                signal_ic: pearson(&s, &r),
            }
        })
        .collect();

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mid path whose step size grows over time, so later rows sit in higher
    /// volatility regimes.
    fn widening_path(n: usize) -> Vec<f64> {
        let mut mid = 100.0;
        (0..n)
            .map(|i| {
                let step = 0.001 * (1.0 + i as f64 / 20.0);
                mid *= if i % 2 == 0 { 1.0 + step } else { 1.0 - step * 0.9 };
                mid
            })
            .collect()
    }

    fn dataset(n: usize) -> Dataset {
        let signal: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64 - 2.0).collect();
        let ret: Vec<f64> = signal
            .iter()
            .enumerate()
            .map(|(i, s)| s * 1e-4 + ((i % 3) as f64 - 1.0) * 1e-5)
            .collect();
        Dataset::new()
            .with_float("sig", signal)
            .unwrap()
            .with_float("forward_return", ret)
            .unwrap()
            .with_float("mid", widening_path(n))
            .unwrap()
    }

    #[test]
    fn drops_warmup_rows_and_partitions_the_rest() {
        let ds = dataset(200);
        let table = regime_dependence(&ds, "sig", "forward_return", "mid", 50, 3).unwrap();
        assert_eq!(table.len(), 3);
        // pct_change loses one row, the window needs 50 defined changes
        let total: usize = table.iter().map(|r| r.count).sum();
        assert_eq!(total, 200 - 50);
        assert!(table[0].regime.upper <= table[2].regime.lower);
        for regime in &table {
            assert!(regime.signal_ic.unwrap() > 0.9);
        }
    }

    #[test]
    fn insufficient_history_is_empty() {
        let ds = dataset(40);
        let table = regime_dependence(&ds, "sig", "forward_return", "mid", 50, 3).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn undefined_rows_are_skipped_before_rolling() {
        let mut ds = dataset(120);
        let mut ret = ds.float("forward_return").unwrap().to_vec();
        for r in ret.iter_mut().take(30) {
            *r = f64::NAN;
        }
        ds.insert("forward_return", crate::dataset::Column::Float(ret))
            .unwrap();
        let table = regime_dependence(&ds, "sig", "forward_return", "mid", 50, 3).unwrap();
        let total: usize = table.iter().map(|r| r.count).sum();
        assert_eq!(total, 90 - 50);
    }

    #[test]
    fn missing_column_is_an_error() {
        let ds = dataset(10);
        assert!(regime_dependence(&ds, "sig", "forward_return", "mid_x", 50, 3).is_err());
    }
}
