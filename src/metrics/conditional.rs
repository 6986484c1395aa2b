// =============================================================================
// Conditional Return Distribution — Forward return profile per signal bucket
// =============================================================================
//
// Signal values are split into equal-frequency buckets (deciles by default).
// Each bucket reports the location, spread, skew and tails of the forward
// return it precedes, exposing non-monotone signal/return relationships and
// per-bucket tail risk.
//
// Ties in the signal can collapse quantile edges; the bucket count then drops
// instead of failing.

use serde::Serialize;
use tracing::trace;

use crate::metrics::stats::{
    is_defined, mean, quantile_buckets, quantile_sorted, sample_std, skew, sorted_defined, take,
    BucketRange,
};

pub const DEFAULT_BINS: usize = 10;

/// Forward return statistics for one signal bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketStats {
    pub bucket: BucketRange,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub skew: Option<f64>,
    pub count: usize,
    pub q01: Option<f64>,
    pub q05: Option<f64>,
    pub q95: Option<f64>,
    pub q99: Option<f64>,
}

impl BucketStats {
    fn from_returns(bucket: BucketRange, returns: &[f64]) -> Self {
        let sorted = sorted_defined(returns);
        Self {
            bucket,
            mean: mean(returns),
            median: quantile_sorted(&sorted, 0.5),
            std: sample_std(returns),
            skew: skew(returns),
            count: sorted.len(),
            q01: quantile_sorted(&sorted, 0.01),
            q05: quantile_sorted(&sorted, 0.05),
            q95: quantile_sorted(&sorted, 0.95),
            q99: quantile_sorted(&sorted, 0.99),
        }
    }
}

/// Bucket `signal` into `bins` equal-frequency groups and summarise
/// `forward_return` within each.
///
/// Rows with either value undefined are dropped first. Empty input gives an
/// empty table.
pub fn conditional_return_distribution(
    signal: &[f64],
    forward_return: &[f64],
    bins: usize,
) -> Vec<BucketStats> {
    let (keys, returns): (Vec<f64>, Vec<f64>) = signal
        .iter()
        .zip(forward_return)
        .filter(|(s, r)| is_defined(**s) && is_defined(**r))
        .map(|(s, r)| (*s, *r))
        .unzip();

    if keys.is_empty() {
        trace!("conditional distribution: no defined rows");
        return Vec::new();
    }

    quantile_buckets(&keys, bins)
        .into_iter()
        .map(|(range, rows)| BucketStats::from_returns(range, &take(&returns, &rows)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_cover_every_defined_row() {
        let signal: Vec<f64> = (0..103).map(|i| ((i * 17) % 29) as f64).collect();
        let mut ret: Vec<f64> = (0..103).map(|i| (i as f64 - 50.0) * 1e-4).collect();
        ret[7] = f64::NAN;
        let mut signal = signal;
        signal[11] = f64::NAN;

        let table = conditional_return_distribution(&signal, &ret, 10);
        let total: usize = table.iter().map(|b| b.count).sum();
        assert_eq!(total, 101);
        assert!(table.len() <= 10);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(conditional_return_distribution(&[], &[], 10).is_empty());
        assert!(conditional_return_distribution(&[f64::NAN], &[0.1], 10).is_empty());
    }

    #[test]
    fn ties_reduce_bucket_count() {
        let signal = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0];
        let ret = [0.01; 10];
        let table = conditional_return_distribution(&signal, &ret, 10);
        assert!(table.len() < 10);
        assert_eq!(table.iter().map(|b| b.count).sum::<usize>(), 10);
    }

    #[test]
    fn monotone_signal_has_increasing_bucket_means() {
        let signal: Vec<f64> = (0..100).map(f64::from).collect();
        let ret: Vec<f64> = signal.iter().map(|s| s * 1e-4).collect();
        let table = conditional_return_distribution(&signal, &ret, 5);
        assert_eq!(table.len(), 5);
        for pair in table.windows(2) {
            assert!(pair[1].mean.unwrap() > pair[0].mean.unwrap());
        }
        let first = &table[0];
        assert_eq!(first.count, 20);
        assert!(first.q01.unwrap() <= first.q05.unwrap());
        assert!(first.q95.unwrap() <= first.q99.unwrap());
        assert!(first.median.unwrap() >= first.q05.unwrap());
    }
}
