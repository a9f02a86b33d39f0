use crate::codes::ProductCode;
use crate::enums::{FlowDirection, Period};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single row of the trade table.
///
/// The value is always read from the reporter's point of view: a row with
/// `flow == Export` means "`reporter` exported `value` to `partner`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub reporter: String,
    pub partner: String,
    pub flow: FlowDirection,
    pub product: ProductCode,
    pub year: i32,
    /// Trade value in thousands of USD. Never negative.
    pub value: Decimal,
}

/// The outcome of a single metric calculation.
///
/// `value` carries the scalar the metric defines, which is `0.0` whenever the
/// required scope is empty or has a zero denominator. `has_data` tells those
/// degenerate zeros apart from a value that was genuinely computed as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub value: f64,
    pub has_data: bool,
}

impl Metric {
    pub fn computed(value: f64) -> Self {
        Self {
            value,
            has_data: true,
        }
    }

    pub fn no_data() -> Self {
        Self {
            value: 0.0,
            has_data: false,
        }
    }

    /// Applies `f` to a computed value, leaving a "no data" result untouched.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        if self.has_data {
            Self::computed(f(self.value))
        } else {
            self
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::no_data()
    }
}

/// One row of the per-year metric time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub year: i32,
    pub period: Period,
    pub dependency_index: f64,
    pub concentration_index: f64,
    pub resilience_score: f64,
    pub source_diversity: f64,
    pub geographic_diversity: f64,
    pub critical_redundancy: f64,
    /// Number of subject-import rows behind the year's figures.
    pub import_rows: usize,
    pub has_data: bool,
}
