use crate::polarity::MetricKind;
use core_types::{Metric, MetricResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// A metric's value in the two representative years and whether it moved in
/// the metric's favourable direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub baseline: f64,
    pub intervention: f64,
    /// `intervention - baseline`.
    pub change: f64,
    pub improved: bool,
}

impl PeriodComparison {
    pub fn new(kind: MetricKind, baseline: f64, intervention: f64) -> Self {
        Self {
            baseline,
            intervention,
            change: intervention - baseline,
            improved: kind.polarity().improved(baseline, intervention),
        }
    }
}

/// Compares two values of `kind` using its hardcoded polarity.
pub fn compare_metric(kind: MetricKind, baseline: f64, intervention: f64) -> PeriodComparison {
    PeriodComparison::new(kind, baseline, intervention)
}

/// Re-derives a comparison from time-series rows.
///
/// Returns `None` when either year is missing from `rows` or `kind` is not
/// carried by the series.
pub fn compare_series(
    kind: MetricKind,
    rows: &[MetricResult],
    baseline_year: i32,
    intervention_year: i32,
) -> Option<PeriodComparison> {
    let value_for = |year: i32| {
        rows.iter()
            .find(|r| r.year == year)
            .and_then(|r| kind.value_in(r))
    };
    Some(compare_metric(kind, value_for(baseline_year)?, value_for(intervention_year)?))
}

/// How far the alternative partners absorbed the primary partner's share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiversificationOutcome {
    /// Alternatives gained more share than the primary partner moved.
    Successful,
    Partial,
}

impl DiversificationOutcome {
    pub fn from_score(score: f64) -> Self {
        if score > 1.0 {
            DiversificationOutcome::Successful
        } else {
            DiversificationOutcome::Partial
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiversificationSummary {
    pub score: Metric,
    pub interpretation: DiversificationOutcome,
}

/// Baseline vs. intervention summary of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparisonReport {
    pub baseline_period: String,
    pub intervention_period: String,
    pub baseline_year: i32,
    pub intervention_year: i32,
    /// Dependency, concentration and resilience comparisons.
    pub metrics: BTreeMap<MetricKind, PeriodComparison>,
    pub diversification: DiversificationSummary,
    pub balance_improvement: Metric,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Period;

    fn row(year: i32, dependency: f64, concentration: f64, resilience: f64) -> MetricResult {
        MetricResult {
            year,
            period: Period::for_year(year, 2019),
            dependency_index: dependency,
            concentration_index: concentration,
            resilience_score: resilience,
            source_diversity: 0.0,
            geographic_diversity: 0.0,
            critical_redundancy: 0.0,
            import_rows: 1,
            has_data: true,
        }
    }

    #[test]
    fn comparison_change_and_improvement() {
        let cmp = compare_metric(MetricKind::Dependency, 15.5, 12.25);
        assert_eq!(cmp.change, 12.25 - 15.5);
        assert!(cmp.improved);

        let cmp = compare_metric(MetricKind::Resilience, 40.0, 35.0);
        assert!(!cmp.improved);
    }

    #[test]
    fn series_comparison_matches_direct_comparison() {
        let rows = vec![row(2015, 14.0, 900.0, 41.0), row(2022, 16.0, 850.0, 44.0)];
        for kind in [MetricKind::Dependency, MetricKind::Concentration, MetricKind::Resilience] {
            let from_series = compare_series(kind, &rows, 2015, 2022).unwrap();
            let direct = compare_metric(
                kind,
                kind.value_in(&rows[0]).unwrap(),
                kind.value_in(&rows[1]).unwrap(),
            );
            assert_eq!(from_series, direct);
            assert_eq!(compare_series(kind, &rows, 2015, 2022), Some(direct));
        }
    }

    #[test]
    fn series_comparison_needs_both_years() {
        let rows = vec![row(2015, 14.0, 900.0, 41.0)];
        assert!(compare_series(MetricKind::Dependency, &rows, 2015, 2022).is_none());
        assert!(compare_series(MetricKind::Substitution, &rows, 2015, 2015).is_none());
    }

    #[test]
    fn diversification_interpretation() {
        assert_eq!(DiversificationOutcome::from_score(1.5), DiversificationOutcome::Successful);
        assert_eq!(DiversificationOutcome::from_score(1.0), DiversificationOutcome::Partial);
        assert_eq!(DiversificationOutcome::from_score(-0.2), DiversificationOutcome::Partial);
    }
}
