// =============================================================================
// Descriptive statistics shared by the metric suite
// =============================================================================
//
// Conventions:
//   - NaN marks an undefined observation and is skipped or propagated, never
//     treated as zero.
//   - Standard deviations are sample (n - 1) estimates.
//   - Quantiles interpolate linearly between order statistics.
//   - Every function that needs more data than it received returns `None`.

use std::fmt;

use serde::{Serialize, Serializer};

#[inline]
pub fn is_defined(x: f64) -> bool {
    !x.is_nan()
}

/// Sign with `sign(0) = 0` and NaN propagated.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else if x == 0.0 {
        0.0
    } else {
        f64::NAN
    }
}

/// Mean of the defined values.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .filter(|x| is_defined(**x))
        .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Sample standard deviation of the defined values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().copied().filter(|x| is_defined(*x)).collect();
    if defined.len() < 2 {
        return None;
    }
    let m = defined.iter().sum::<f64>() / defined.len() as f64;
    let ss = defined.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    Some((ss / (defined.len() - 1) as f64).sqrt())
}

/// Defined values sorted ascending.
pub fn sorted_defined(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|x| is_defined(*x)).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Linear-interpolated quantile of an ascending slice, `q` in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted_defined(values), 0.5)
}

/// Adjusted Fisher–Pearson sample skewness (G1). Needs three observations;
/// a constant sample has zero skew.
pub fn skew(values: &[f64]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().copied().filter(|x| is_defined(*x)).collect();
    let n = defined.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let m = defined.iter().sum::<f64>() / nf;
    let m2 = defined.iter().map(|x| (x - m).powi(2)).sum::<f64>() / nf;
    let m3 = defined.iter().map(|x| (x - m).powi(3)).sum::<f64>() / nf;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

/// Pearson correlation over rows where both sides are defined.
///
/// `None` with fewer than two such rows or when either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| is_defined(**a) && is_defined(**b))
        .map(|(a, b)| (*a, *b))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxy = 0.0_f64;
    let mut sxx = 0.0_f64;
    let mut syy = 0.0_f64;
    for (a, b) in &pairs {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Relative change to the previous observation; the first entry is NaN.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    for w in values.windows(2) {
        out.push((w[1] - w[0]) / w[0]);
    }
    out
}

/// Trailing sample standard deviation over `window` observations.
///
/// Entries without `window` defined observations behind them are NaN.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for end in window..=values.len() {
        let slice = &values[end - window..end];
        if slice.iter().all(|x| is_defined(*x)) {
            if let Some(sd) = sample_std(slice) {
                out[end - 1] = sd;
            }
        }
    }
    out
}

// =============================================================================
// Equal-frequency bucketing
// =============================================================================

/// Right-closed value range `(lower, upper]` of one bucket. The first bucket
/// also contains its lower edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketRange {
    pub lower: f64,
    pub upper: f64,
}

impl fmt::Display for BucketRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.lower, self.upper)
    }
}

impl Serialize for BucketRange {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Quantile edges splitting `values` into `bins` equal-frequency buckets.
///
/// Duplicate edges are collapsed, so the result can describe fewer buckets
/// than requested. Empty when no value is defined.
pub fn quantile_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let sorted = sorted_defined(values);
    if sorted.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut edges: Vec<f64> = (0..=bins)
        .filter_map(|i| quantile_sorted(&sorted, i as f64 / bins as f64))
        .collect();
    edges.dedup();
    edges
}

/// Bucket index of `value` for the given edges.
pub fn bucket_index(edges: &[f64], value: f64) -> usize {
    let buckets = edges.len().saturating_sub(1).max(1);
    let idx = edges
        .get(1..)
        .unwrap_or(&[])
        .partition_point(|edge| *edge < value);
    idx.min(buckets - 1)
}

/// Group row indices by equal-frequency bucket of `keys`.
///
/// Rows with an undefined key are left out. When every key is identical a
/// single degenerate bucket holds all rows. Buckets are returned in
/// ascending order, including empty ones.
pub fn quantile_buckets(keys: &[f64], bins: usize) -> Vec<(BucketRange, Vec<usize>)> {
    let edges = quantile_edges(keys, bins);
    if edges.is_empty() {
        return Vec::new();
    }

    let mut buckets: Vec<(BucketRange, Vec<usize>)> = if edges.len() == 1 {
        vec![(
            BucketRange {
                lower: edges[0],
                upper: edges[0],
            },
            Vec::new(),
        )]
    } else {
        edges
            .windows(2)
            .map(|w| {
                (
                    BucketRange {
                        lower: w[0],
                        upper: w[1],
                    },
                    Vec::new(),
                )
            })
            .collect()
    };

    for (row, key) in keys.iter().enumerate() {
        if is_defined(*key) {
            let idx = bucket_index(&edges, *key);
            buckets[idx].1.push(row);
        }
    }
    buckets
}

/// Values of `column` at the given row indices.
pub fn take(column: &[f64], rows: &[usize]) -> Vec<f64> {
    rows.iter().map(|&i| column[i]).collect()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn sign_convention() {
        assert_eq!(sign(2.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert!(sign(f64::NAN).is_nan());
    }

    #[test]
    fn mean_and_std_skip_undefined() {
        let v = [1.0, f64::NAN, 3.0];
        assert!(close(mean(&v).unwrap(), 2.0));
        assert!(close(sample_std(&v).unwrap(), 2.0_f64.sqrt()));
        assert!(mean(&[f64::NAN]).is_none());
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile_sorted(&sorted, 0.5).unwrap(), 2.5));
        assert!(close(quantile_sorted(&sorted, 0.0).unwrap(), 1.0));
        assert!(close(quantile_sorted(&sorted, 1.0).unwrap(), 4.0));
        assert!(close(quantile_sorted(&sorted, 0.99).unwrap(), 3.97));
        assert!(close(median(&[5.0, 1.0, 3.0]).unwrap(), 3.0));
    }

    #[test]
    fn skew_matches_adjusted_estimator() {
        // Right-skewed sample: G1 for [1, 2, 3, 10] is ≈ 1.7636.
        let g1 = skew(&[1.0, 2.0, 3.0, 10.0]).unwrap();
        assert!((g1 - 1.7636).abs() < 1e-3, "g1={g1}");
        assert!(close(skew(&[1.0, 2.0, 3.0]).unwrap(), 0.0));
        assert!(close(skew(&[4.0, 4.0, 4.0]).unwrap(), 0.0));
        assert!(skew(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn pearson_basic_cases() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!(close(pearson(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0));
        assert!(close(pearson(&x, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0));
        assert!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]).is_none());
        assert!(pearson(&[1.0, f64::NAN], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn rolling_std_needs_full_window() {
        let v = [f64::NAN, 1.0, 2.0, 3.0, 4.0];
        let out = rolling_std(&v, 2);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(close(out[2], 0.5_f64.sqrt()));
        assert!(close(out[4], 0.5_f64.sqrt()));
    }

    #[test]
    fn pct_change_first_is_undefined() {
        let out = pct_change(&[100.0, 110.0, 99.0]);
        assert!(out[0].is_nan());
        assert!(close(out[1], 0.1));
        assert!(close(out[2], -0.1));
    }

    #[test]
    fn duplicate_edges_reduce_bucket_count() {
        let keys = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0];
        let buckets = quantile_buckets(&keys, 10);
        assert!(buckets.len() < 10);
        let total: usize = buckets.iter().map(|(_, rows)| rows.len()).sum();
        assert_eq!(total, keys.len());
    }

    #[test]
    fn constant_keys_form_one_bucket() {
        let buckets = quantile_buckets(&[7.0; 5], 4);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].1.len(), 5);
    }

    #[test]
    fn quartile_buckets_split_evenly() {
        let keys: Vec<f64> = (1..=8).map(f64::from).collect();
        let buckets = quantile_buckets(&keys, 4);
        assert_eq!(buckets.len(), 4);
        for (_, rows) in &buckets {
            assert_eq!(rows.len(), 2);
        }
        // lowest edge value lands in the first bucket
        assert_eq!(buckets[0].1, vec![0, 1]);
        assert_eq!(buckets[0].0.to_string(), "(1, 2.75]");
    }
}
