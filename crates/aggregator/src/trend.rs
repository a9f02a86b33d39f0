//! Descriptive trend fitting over the per-year series.
//!
//! Ordinary least squares on `(year, value)` points. No significance tests:
//! the slopes describe the series, they do not establish causes.

use crate::polarity::MetricKind;
use core_types::MetricResult;
use serde::Serialize;

/// Slopes closer to zero than this are reported as flat.
const FLAT_SLOPE: f64 = 1e-12;

/// Slope shift, in metric units per year, reported as a structural change.
pub const STRUCTURAL_CHANGE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    /// Change per year.
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub direction: TrendDirection,
    pub points: usize,
}

impl LinearTrend {
    pub fn predict(&self, year: i32) -> f64 {
        self.intercept + self.slope * f64::from(year)
    }
}

/// Fits `value = intercept + slope * year`.
///
/// Returns `None` unless the points span at least two distinct years. A
/// constant series has an `r_squared` of 0.
pub fn linear_trend(points: &[(i32, f64)]) -> Option<LinearTrend> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| f64::from(*x)).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in points {
        let dx = f64::from(*x) - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy == 0.0 {
        0.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };
    let direction = if slope.abs() <= FLAT_SLOPE {
        TrendDirection::Flat
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    Some(LinearTrend {
        slope,
        intercept,
        r_squared,
        direction,
        points: points.len(),
    })
}

/// Separate trends fitted before and from `break_year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructuralBreak {
    pub break_year: i32,
    pub before: LinearTrend,
    pub after: LinearTrend,
    /// `after.slope - before.slope`.
    pub slope_change: f64,
    /// Whether the slope moved by more than `STRUCTURAL_CHANGE_THRESHOLD`.
    pub structural_change: bool,
}

/// Fits one trend to the years before `break_year` and one to the years
/// from it onwards. `None` unless both sides can be fitted.
pub fn structural_break(points: &[(i32, f64)], break_year: i32) -> Option<StructuralBreak> {
    let (before, after): (Vec<_>, Vec<_>) = points.iter().copied().partition(|(year, _)| *year < break_year);
    let before = linear_trend(&before)?;
    let after = linear_trend(&after)?;
    let slope_change = after.slope - before.slope;

    Some(StructuralBreak {
        break_year,
        before,
        after,
        slope_change,
        structural_change: slope_change.abs() > STRUCTURAL_CHANGE_THRESHOLD,
    })
}

/// The `(year, value)` points of `kind` in the rows that carry data.
pub fn series_points(kind: MetricKind, rows: &[MetricResult]) -> Vec<(i32, f64)> {
    rows.iter()
        .filter(|r| r.has_data)
        .filter_map(|r| kind.value_in(r).map(|v| (r.year, v)))
        .collect()
}

/// Trends of the headline metrics over a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub dependency: Option<LinearTrend>,
    pub concentration: Option<LinearTrend>,
    pub resilience: Option<LinearTrend>,
    pub dependency_break: Option<StructuralBreak>,
}
