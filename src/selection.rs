// =============================================================================
// Alpha Selection — Constraint filter + weighted z-score composite
// =============================================================================
//
//   score_i = Σ_m  w_m · d_m · z_{m,i}
//
//   z_{m,i} = (x_{m,i} - mean_m) / std_m   (sample std across alphas)
//   d_m     = -1 for lower-is-better metrics (adverse selection), else +1
//
// A metric with zero or undefined spread contributes nothing (z = 0). An
// alpha with an undefined value in a weighted metric has an undefined score
// and sorts last.

use tracing::{debug, info};

use crate::config::SelectionConfig;
use crate::metrics::stats::{mean, sample_std};
use crate::profile::{descending_defined_last, SummaryRow};

/// Constraint key prefix marking an upper bound.
pub const UPPER_BOUND_PREFIX: &str = "max_";

/// Metrics where a lower raw value ranks higher.
const LOWER_IS_BETTER: [&str; 1] = ["adverse_selection"];

/// Summary column holding a previous selection's composite score.
const SCORE_COLUMN: &str = "score";

/// Metric lookup that treats `score` as absent on an unscored summary.
fn lookup(row: &SummaryRow, metric: &str, scored: bool) -> Option<Option<f64>> {
    if metric == SCORE_COLUMN && !scored {
        return None;
    }
    row.metric(metric)
}

/// Whether `row` passes every constraint it can be checked against.
fn passes(row: &SummaryRow, constraints: &[(&str, bool, f64)], scored: bool) -> bool {
    constraints.iter().all(|&(metric, upper, threshold)| match lookup(row, metric, scored) {
        // unknown metric: constraint does not apply
        None => true,
        Some(None) => false,
        Some(Some(value)) if upper => value <= threshold,
        Some(Some(value)) => value >= threshold,
    })
}

/// Cross-sectional z-scores; all zero when the spread is zero or undefined.
fn zscores(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let raw: Vec<f64> = values.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    match (mean(&raw), sample_std(&raw)) {
        (Some(m), Some(sd)) if sd > 0.0 => values.iter().map(|v| v.map(|x| (x - m) / sd)).collect(),
        _ => vec![Some(0.0); values.len()],
    }
}

/// Filter `summary` by the configured constraints and rank the survivors by
/// composite score, best first. Ties keep their input order.
pub fn select_best(summary: &[SummaryRow], config: &SelectionConfig) -> Vec<SummaryRow> {
    let constraints: Vec<(&str, bool, f64)> = config
        .constraints
        .iter()
        .map(|(key, &threshold)| match key.strip_prefix(UPPER_BOUND_PREFIX) {
            Some(metric) => (metric, true, threshold),
            None => (key.as_str(), false, threshold),
        })
        .collect();

    let scored = summary.iter().any(|row| row.score.is_some());
    let mut rows: Vec<SummaryRow> = summary
        .iter()
        .filter(|row| passes(row, &constraints, scored))
        .cloned()
        .collect();

    if rows.is_empty() {
        info!(
            candidates = summary.len(),
            constraints = ?config.constraints,
            "no alpha satisfies the constraints"
        );
        return rows;
    }

    let mut scores: Vec<Option<f64>> = vec![Some(0.0); rows.len()];
    for (metric, &weight) in &config.weights {
        let Some(values) = rows
            .iter()
            .map(|row| lookup(row, metric, scored))
            .collect::<Option<Vec<Option<f64>>>>()
        else {
            debug!(metric = %metric, "weighted metric not in summary, skipped");
            continue;
        };

        let direction = if LOWER_IS_BETTER.contains(&metric.as_str()) {
            -1.0
        } else {
            1.0
        };
        for (score, z) in scores.iter_mut().zip(zscores(&values)) {
            *score = match (*score, z) {
                (Some(s), Some(z)) => Some(s + weight * direction * z),
                _ => None,
            };
        }
    }

    for (row, score) in rows.iter_mut().zip(scores) {
        row.score = score;
    }
    rows.sort_by(|a, b| descending_defined_last(a.score, b.score));

    info!(
        candidates = summary.len(),
        selected = rows.len(),
        best = %rows[0].alpha,
        "alphas ranked"
    );
    rows
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn row(alpha: &str, hit: f64, msr: f64, adverse: f64) -> SummaryRow {
        SummaryRow {
            alpha: alpha.to_string(),
            hit_rate: Some(hit),
            hit_n: 100,
            mean_signed_return: Some(msr),
            adverse_selection: Some(adverse),
            adverse_n: 100,
            score: None,
        }
    }

    fn pair() -> Vec<SummaryRow> {
        vec![row("a", 0.6, 0.01, 0.001), row("b", 0.55, 0.02, 0.003)]
    }

    fn universe() -> Vec<SummaryRow> {
        vec![
            row("a", 0.52, 0.001, 0.0005),
            row("b", 0.61, 0.004, 0.0001),
            row("c", 0.48, -0.002, 0.002),
            row("d", 0.57, 0.003, 0.0009),
            row("e", 0.50, 0.000, 0.0012),
        ]
    }

    fn constrained(pairs: &[(&str, f64)]) -> SelectionConfig {
        SelectionConfig {
            constraints: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..SelectionConfig::default()
        }
    }

    #[test]
    fn higher_return_and_hit_rate_alpha_wins_with_default_weights() {
        let rows = vec![row("a", 0.6, 0.01, 0.001), row("b", 0.65, 0.02, 0.003)];
        let ranked = select_best(&rows, &SelectionConfig::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].alpha, "b");
        assert!(ranked[0].score.unwrap() > ranked[1].score.unwrap());
    }

    #[test]
    fn two_alpha_trade_off_cancels_under_default_weights() {
        // With two rows every z-score is ±1/√2; b gains 0.5 on return and
        // loses 0.3 + 0.2 on hit rate and adverse selection.
        let ranked = select_best(&pair(), &SelectionConfig::default());
        assert_eq!(ranked.len(), 2);
        for r in &ranked {
            assert!(r.score.unwrap().abs() < 1e-9, "{}: {:?}", r.alpha, r.score);
        }
    }

    #[test]
    fn unconstrained_selection_is_a_permutation() {
        let input = universe();
        let ranked = select_best(&input, &SelectionConfig::default());
        assert_eq!(ranked.len(), input.len());
        let mut got: Vec<&str> = ranked.iter().map(|r| r.alpha.as_str()).collect();
        got.sort();
        assert_eq!(got, vec!["a", "b", "c", "d", "e"]);
        assert!(ranked.iter().all(|r| r.score.is_some()));
        for pair in ranked.windows(2) {
            assert!(pair[0].score.unwrap() >= pair[1].score.unwrap());
        }
    }

    #[test]
    fn reselecting_scored_output_keeps_the_order() {
        let config = SelectionConfig::default();
        let once = select_best(&universe(), &config);
        let twice = select_best(&once, &config);
        let once: Vec<&str> = once.iter().map(|r| r.alpha.as_str()).collect();
        let twice: Vec<&str> = twice.iter().map(|r| r.alpha.as_str()).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn lower_bound_constraint() {
        let ranked = select_best(&universe(), &constrained(&[("hit_rate", 0.55)]));
        let mut names: Vec<&str> = ranked.iter().map(|r| r.alpha.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["b", "d"]);
    }

    #[test]
    fn upper_bound_constraint() {
        let ranked = select_best(&universe(), &constrained(&[("max_adverse_selection", 0.001)]));
        let mut names: Vec<&str> = ranked.iter().map(|r| r.alpha.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["a", "b", "d"]);
    }

    #[test]
    fn unknown_constraint_is_ignored() {
        let ranked = select_best(&universe(), &constrained(&[("sharpe", 2.0)]));
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn score_constraint_ignored_on_unscored_summary() {
        let ranked = select_best(&pair()[..1], &constrained(&[("score", -100.0)]));
        assert_eq!(ranked.len(), 1);

        let scored = select_best(&universe(), &SelectionConfig::default());
        let top = scored[0].score.unwrap();
        let ranked = select_best(&scored, &constrained(&[("score", top)]));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].alpha, scored[0].alpha);
    }

    #[test]
    fn exhausted_constraints_return_empty() {
        let ranked = select_best(&universe(), &constrained(&[("hit_rate", 0.99)]));
        assert!(ranked.is_empty());
        assert!(select_best(&[], &SelectionConfig::default()).is_empty());
    }

    #[test]
    fn zero_variance_metric_contributes_nothing() {
        let rows = vec![row("a", 0.5, 0.01, 0.001), row("b", 0.5, 0.02, 0.001)];
        let config = SelectionConfig {
            weights: BTreeMap::from([("hit_rate".to_string(), 1.0)]),
            ..SelectionConfig::default()
        };
        let ranked = select_best(&rows, &config);
        assert!(ranked.iter().all(|r| r.score == Some(0.0)));
        // stable: input order kept on ties
        assert_eq!(ranked[0].alpha, "a");
    }

    #[test]
    fn single_candidate_scores_zero() {
        let ranked = select_best(&pair()[..1], &SelectionConfig::default());
        assert_eq!(ranked[0].score, Some(0.0));
    }

    #[test]
    fn adverse_selection_is_inverted() {
        let rows = vec![row("a", 0.5, 0.01, 0.004), row("b", 0.5, 0.01, 0.001)];
        let config = SelectionConfig {
            weights: BTreeMap::from([("adverse_selection".to_string(), 1.0)]),
            ..SelectionConfig::default()
        };
        let ranked = select_best(&rows, &config);
        assert_eq!(ranked[0].alpha, "b");
    }

    #[test]
    fn undefined_metric_sorts_last() {
        let mut rows = universe();
        rows[1].hit_rate = None;
        let ranked = select_best(&rows, &SelectionConfig::default());
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[4].alpha, "b");
        assert_eq!(ranked[4].score, None);
    }

    #[test]
    fn unknown_weight_is_ignored() {
        let config = SelectionConfig {
            weights: BTreeMap::from([
                ("sharpe".to_string(), 5.0),
                ("mean_signed_return".to_string(), 1.0),
            ]),
            ..SelectionConfig::default()
        };
        let ranked = select_best(&universe(), &config);
        assert_eq!(ranked[0].alpha, "b");
        assert_eq!(ranked[4].alpha, "c");
    }
}
