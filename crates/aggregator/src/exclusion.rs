//! Basket-exclusion sensitivity.
//!
//! The dependency index is recomputed over the import base with a basket of
//! HS chapters removed. If the post-break trend of the reduced series still
//! steepens, the shift is not carried by that basket alone.

use crate::trend::{StructuralBreak, structural_break};
use core_types::{Period, ProductCode};
use serde::Serialize;

/// One year of the full vs. reduced import base comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExclusionRow {
    pub year: i32,
    pub period: Period,
    pub dependency_index: f64,
    pub dependency_excluding: f64,
    /// What the excluded basket adds to the dependency index.
    pub basket_effect: f64,
    /// Both indices were computed from recorded imports.
    pub has_data: bool,
}

/// Means of the data-bearing years of one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodMeans {
    pub years: usize,
    pub dependency_index: f64,
    pub dependency_excluding: f64,
    pub basket_effect: f64,
}

/// The outcome of excluding one basket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExclusionSummary {
    pub label: String,
    pub excluded_codes: Vec<String>,
    pub baseline: Option<PeriodMeans>,
    pub intervention: Option<PeriodMeans>,
    /// Reduced-base dependency trend split at the intervention start.
    pub trend: Option<StructuralBreak>,
    /// Post-break slope minus pre-break slope.
    pub acceleration: Option<f64>,
    /// The post-break slope is steeper than the pre-break one.
    pub trend_persists: Option<bool>,
}

/// Flat CSV form of an `ExclusionSummary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRow {
    pub label: String,
    pub excluded_codes: String,
    pub slope_before: Option<f64>,
    pub slope_after: Option<f64>,
    pub acceleration: Option<f64>,
    pub trend_persists: Option<bool>,
}

impl From<&ExclusionSummary> for SensitivityRow {
    fn from(summary: &ExclusionSummary) -> Self {
        Self {
            label: summary.label.clone(),
            excluded_codes: summary.excluded_codes.join(" "),
            slope_before: summary.trend.map(|t| t.before.slope),
            slope_after: summary.trend.map(|t| t.after.slope),
            acceleration: summary.acceleration,
            trend_persists: summary.trend_persists,
        }
    }
}

/// The headline basket's yearly rows and a summary per basket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityReport {
    pub rows: Vec<ExclusionRow>,
    pub baskets: Vec<ExclusionSummary>,
}

fn period_means(rows: &[ExclusionRow], period: Period) -> Option<PeriodMeans> {
    let selected: Vec<&ExclusionRow> = rows
        .iter()
        .filter(|r| r.has_data && r.period == period)
        .collect();
    if selected.is_empty() {
        return None;
    }

    let n = selected.len() as f64;
    let mean = |f: fn(&ExclusionRow) -> f64| selected.iter().map(|r| f(r)).sum::<f64>() / n;
    Some(PeriodMeans {
        years: selected.len(),
        dependency_index: mean(|r| r.dependency_index),
        dependency_excluding: mean(|r| r.dependency_excluding),
        basket_effect: mean(|r| r.basket_effect),
    })
}

/// Period means and the split trend of an exclusion series.
pub fn summarize(
    label: &str,
    excluded: &[ProductCode],
    rows: &[ExclusionRow],
    break_year: i32,
) -> ExclusionSummary {
    let points: Vec<(i32, f64)> = rows
        .iter()
        .filter(|r| r.has_data)
        .map(|r| (r.year, r.dependency_excluding))
        .collect();
    let trend = structural_break(&points, break_year);

    ExclusionSummary {
        label: label.to_string(),
        excluded_codes: excluded.iter().map(ToString::to_string).collect(),
        baseline: period_means(rows, Period::Baseline),
        intervention: period_means(rows, Period::Intervention),
        trend,
        acceleration: trend.map(|t| t.slope_change),
        trend_persists: trend.map(|t| t.after.slope > t.before.slope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn row(year: i32, with: f64, without: f64) -> ExclusionRow {
        ExclusionRow {
            year,
            period: Period::for_year(year, 2019),
            dependency_index: with,
            dependency_excluding: without,
            basket_effect: with - without,
            has_data: true,
        }
    }

    #[test]
    fn means_are_taken_per_period() {
        let mut rows = vec![row(2018, 40.0, 30.0), row(2019, 50.0, 40.0), row(2021, 60.0, 45.0)];
        rows.push(ExclusionRow {
            has_data: false,
            ..row(2020, 0.0, 0.0)
        });

        let summary = summarize("basket", &[], &rows, 2020);
        let baseline = summary.baseline.unwrap();
        assert_eq!(baseline.years, 2);
        assert!((baseline.dependency_index - 45.0).abs() < EPS);
        assert!((baseline.basket_effect - 10.0).abs() < EPS);
        let intervention = summary.intervention.unwrap();
        assert_eq!(intervention.years, 1);
        assert!((intervention.dependency_excluding - 45.0).abs() < EPS);
    }

    #[test]
    fn steeper_post_break_slope_persists() {
        let rows = [
            row(2017, 30.0, 20.0),
            row(2018, 31.0, 21.0),
            row(2019, 32.0, 22.0),
            row(2020, 35.0, 25.0),
            row(2021, 38.0, 28.0),
        ];
        let codes = [ProductCode::parse("30").unwrap()];
        let summary = summarize("pharma", &codes, &rows, 2020);

        assert_eq!(summary.excluded_codes, vec!["30"]);
        assert!((summary.acceleration.unwrap() - 2.0).abs() < EPS);
        assert_eq!(summary.trend_persists, Some(true));

        let csv_row = SensitivityRow::from(&summary);
        assert!((csv_row.slope_before.unwrap() - 1.0).abs() < EPS);
        assert!((csv_row.slope_after.unwrap() - 3.0).abs() < EPS);
    }

    #[test]
    fn short_series_has_no_trend() {
        let summary = summarize("basket", &[], &[row(2019, 1.0, 1.0), row(2020, 2.0, 2.0)], 2020);
        assert!(summary.trend.is_none());
        assert_eq!(summary.trend_persists, None);
        assert!(SensitivityRow::from(&summary).acceleration.is_none());
    }
}
