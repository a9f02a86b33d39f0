use crate::window::AnalysisWindow;
use configuration::ValidationSettings;
use core_types::FlowDirection;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use trade_table::TradeTable;

/// Thresholds of the year-over-year consistency check on total imports.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyRules {
    /// Absolute change, in percent, above which a year is flagged.
    pub max_yoy_change: f64,
    /// Years never flagged.
    pub exempt_years: Vec<i32>,
}

impl ConsistencyRules {
    pub fn from_settings(settings: &ValidationSettings) -> Self {
        Self {
            max_yoy_change: settings.max_yoy_change,
            exempt_years: settings.exempt_years.clone(),
        }
    }

    fn flags(&self, year: i32, change: f64) -> bool {
        change.abs() > self.max_yoy_change && !self.exempt_years.contains(&year)
    }
}

impl Default for ConsistencyRules {
    fn default() -> Self {
        Self::from_settings(&ValidationSettings::default())
    }
}

/// Completeness of a loaded table relative to the analysis window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total_records: usize,
    /// Every year present in the table, inside the window or not.
    pub years_present: Vec<i32>,
    /// Window years with no records at all.
    pub missing_years: Vec<i32>,
    pub flow_distribution: BTreeMap<FlowDirection, usize>,
    /// Subject-import rows per window year, zeros included.
    pub import_rows_per_year: BTreeMap<i32, usize>,
    /// Percent change of the subject's total imports against the previous
    /// year with imports. Years following a zero total are left out.
    pub yoy_change: BTreeMap<i32, f64>,
    /// Years whose change breaks the consistency threshold.
    pub suspicious_years: Vec<i32>,
}

impl CoverageReport {
    /// True when every window year has subject-import rows.
    pub fn is_complete(&self) -> bool {
        self.import_rows_per_year.values().all(|&rows| rows > 0)
    }
}

/// Year-over-year percent change of the subject's total imports, over the
/// years that record any.
pub fn yoy_changes(table: &TradeTable) -> BTreeMap<i32, f64> {
    let totals: Vec<(i32, f64)> = table
        .years()
        .into_iter()
        .filter(|&year| table.subject_import_count(year) > 0)
        .map(|year| (year, table.total_subject_imports(year).to_f64().unwrap_or(0.0)))
        .collect();

    totals
        .windows(2)
        .filter(|pair| pair[0].1 > 0.0)
        .map(|pair| {
            let (_, previous) = pair[0];
            let (year, current) = pair[1];
            (year, (current - previous) / previous * 100.0)
        })
        .collect()
}

pub fn coverage(table: &TradeTable, window: &AnalysisWindow, rules: &ConsistencyRules) -> CoverageReport {
    let present = table.years();
    let missing_years: Vec<i32> = window.years().filter(|y| !present.contains(y)).collect();
    let import_rows_per_year = window
        .years()
        .map(|year| (year, table.subject_import_count(year)))
        .collect();

    if !missing_years.is_empty() {
        tracing::warn!(?missing_years, "Analysis window has years without records.");
    }

    let yoy_change = yoy_changes(table);
    let suspicious_years: Vec<i32> = yoy_change
        .iter()
        .filter(|&(&year, &change)| rules.flags(year, change))
        .map(|(&year, _)| year)
        .collect();
    for year in &suspicious_years {
        tracing::warn!(
            year,
            change = yoy_change[year],
            threshold = rules.max_yoy_change,
            "Unusual year-over-year change in total imports."
        );
    }

    CoverageReport {
        total_records: table.len(),
        years_present: present.into_iter().collect(),
        missing_years,
        flow_distribution: table.flow_distribution(),
        import_rows_per_year,
        yoy_change,
        suspicious_years,
    }
}
