use aggregator::{
    AnalysisWindow, CoverageReport, MetricKind, PeriodComparisonReport, SensitivityReport,
    TrendReport,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use core_types::MetricResult;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const METRICS_SUMMARY_FILE: &str = "metrics_summary.csv";
pub const PARTNER_DIVERSIFICATION_FILE: &str = "partner_diversification.csv";
pub const SECTOR_ANALYSIS_FILE: &str = "sector_analysis.csv";
pub const REGION_BREAKDOWN_FILE: &str = "region_breakdown.csv";
pub const BASKET_EXCLUSION_FILE: &str = "basket_exclusion.csv";
pub const BASKET_SENSITIVITY_FILE: &str = "basket_sensitivity.csv";
pub const PERIOD_COMPARISON_FILE: &str = "period_comparison.json";

/// Writes the report files of a run into one directory.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Creates the output directory if it does not exist yet.
    pub fn create(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Writes `rows` as a CSV file with a header taken from the row fields.
    pub fn write_csv<T: Serialize>(&self, name: &str, rows: &[T]) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(name);
        let mut wtr = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        tracing::info!(path = %path.display(), rows = rows.len(), "Report written.");
        Ok(path)
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(name);
        let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, value)?;
        tracing::info!(path = %path.display(), "Report written.");
        Ok(path)
    }
}

/// The JSON document of an `analyze` run.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub subject: &'a str,
    pub primary_partner: &'a str,
    pub window: &'a AnalysisWindow,
    pub comparison: &'a PeriodComparisonReport,
    pub trends: &'a TrendReport,
    pub sensitivity: &'a SensitivityReport,
    pub coverage: &'a CoverageReport,
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn status(improved: bool) -> &'static str {
    if improved { "Improved" } else { "Not improved" }
}

/// Baseline vs. intervention table printed at the end of `analyze`.
pub fn comparison_table(report: &PeriodComparisonReport) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Metric".to_string(),
        format!("{} ({})", report.baseline_year, report.baseline_period),
        format!("{} ({})", report.intervention_year, report.intervention_period),
        "Change".to_string(),
        "Status".to_string(),
    ]);

    for (kind, cmp) in &report.metrics {
        table.add_row(vec![
            kind.to_string(),
            format!("{:.2}", cmp.baseline),
            format!("{:.2}", cmp.intervention),
            format!("{:+.2}", cmp.change),
            status(cmp.improved).to_string(),
        ]);
    }

    let diversification = &report.diversification;
    table.add_row(vec![
        MetricKind::Diversification.to_string(),
        String::new(),
        format!("{:.2}", diversification.score.value),
        String::new(),
        format!("{:?}", diversification.interpretation),
    ]);

    let balance = report.balance_improvement;
    table.add_row(vec![
        MetricKind::BalanceImprovement.to_string(),
        String::new(),
        format!("{:.2}", balance.value),
        String::new(),
        if balance.has_data {
            status(MetricKind::BalanceImprovement.polarity().improved(0.0, balance.value)).to_string()
        } else {
            "No data".to_string()
        },
    ]);

    table
}

/// One line per year of the time series.
pub fn series_table(rows: &[MetricResult]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Year", "Period", "Dependency", "HHI", "Resilience", "Import rows"]);
    for row in rows {
        table.add_row(vec![
            row.year.to_string(),
            row.period.to_string(),
            format!("{:.2}", row.dependency_index),
            format!("{:.0}", row.concentration_index),
            format!("{:.2}", row.resilience_score),
            row.import_rows.to_string(),
        ]);
    }
    table
}

pub fn coverage_table(report: &CoverageReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Year", "Subject import rows", "YoY change %", "Flag"]);
    for (year, rows) in &report.import_rows_per_year {
        let change = report
            .yoy_change
            .get(year)
            .map(|c| format!("{c:+.1}"))
            .unwrap_or_default();
        let flag = if report.suspicious_years.contains(year) { "Check" } else { "" };
        table.add_row(vec![year.to_string(), rows.to_string(), change, flag.to_string()]);
    }
    table
}

/// Slopes of the reduced-base dependency for each excluded basket.
pub fn sensitivity_table(report: &SensitivityReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Basket", "Slope before", "Slope after", "Acceleration", "Persists"]);
    let fmt = |v: Option<f64>| v.map(|v| format!("{v:+.3}")).unwrap_or_else(|| "n/a".to_string());
    for basket in &report.baskets {
        table.add_row(vec![
            basket.label.clone(),
            fmt(basket.trend.map(|t| t.before.slope)),
            fmt(basket.trend.map(|t| t.after.slope)),
            fmt(basket.acceleration),
            match basket.trend_persists {
                Some(true) => "Yes",
                Some(false) => "No",
                None => "n/a",
            }
            .to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        year: i32,
        share: f64,
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("derisk-output-{}", Uuid::new_v4()))
    }

    #[test]
    fn csv_rows_get_a_header() {
        let dir = scratch_dir();
        let writer = ReportWriter::create(&dir).unwrap();
        let path = writer
            .write_csv("rows.csv", &[Row { year: 2019, share: 12.5 }, Row { year: 2020, share: 10.0 }])
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "year,share\n2019,12.5\n2020,10.0\n");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn coverage_table_flags_suspicious_years() {
        let report = CoverageReport {
            total_records: 2,
            years_present: vec![2018, 2019],
            missing_years: Vec::new(),
            flow_distribution: Default::default(),
            import_rows_per_year: [(2018, 1), (2019, 1)].into_iter().collect(),
            yoy_change: [(2019, 120.0)].into_iter().collect(),
            suspicious_years: vec![2019],
        };
        let rendered = coverage_table(&report).to_string();
        assert!(rendered.contains("+120.0"));
        assert!(rendered.contains("Check"));
    }

    #[test]
    fn json_is_written_pretty() {
        let dir = scratch_dir();
        let writer = ReportWriter::create(&dir).unwrap();
        let path = writer.write_json("row.json", &Row { year: 2022, share: 1.5 }).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["year"], 2022);
        fs::remove_dir_all(dir).unwrap();
    }
}
