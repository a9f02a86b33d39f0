use aggregator::{Aggregator, SensitivityRow};
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{CliOverrides, Settings, init_tracing, load_settings};
use core_types::ProductCode;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use trade_table::{LoadOptions, LoadReport, TradeTable};

mod output;

use output::{ReportWriter, RunSummary};

/// The main entry point for the de-risking analysis.
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    settings.apply_overrides(&cli.overrides);
    settings.validate()?;

    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze => handle_analyze(&settings),
        Commands::Metrics(args) => handle_metrics(&settings, args),
        Commands::Coverage => handle_coverage(&settings),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Measures how a country's import dependency on one partner shifts over time.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to `derisk.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: CliOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write every report.
    Analyze,
    /// Print all seven metrics for a single year.
    Metrics(MetricsArgs),
    /// Report year coverage and trade-flow distribution of the data.
    Coverage,
}

#[derive(Parser)]
struct MetricsArgs {
    /// The year to compute the metrics for.
    #[arg(long)]
    year: i32,

    /// Reference year for the two-year metrics. Defaults to the baseline representative year.
    #[arg(long)]
    baseline: Option<i32>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load_table(settings: &Settings) -> anyhow::Result<(TradeTable, LoadReport)> {
    let path = &settings.analysis.data_path;
    let options = LoadOptions {
        strict: settings.analysis.strict_load,
    };
    let (table, report) = TradeTable::from_path(path, &settings.analysis.subject, &options)
        .with_context(|| format!("failed to load trade data from {}", path.display()))?;

    if report.rows_rejected > 0 {
        tracing::warn!(
            rejected = report.rows_rejected,
            reasons = ?report.rejections,
            "Some rows were rejected during loading."
        );
    }
    Ok((table, report))
}

/// Handles the orchestration of a full analysis run.
fn handle_analyze(settings: &Settings) -> anyhow::Result<()> {
    let (table, _) = load_table(settings)?;
    let aggregator = Aggregator::from_settings(settings)?;
    let window = *aggregator.window();

    tracing::info!(
        subject = table.subject(),
        partner = aggregator.engine().primary_partner(),
        baseline = %window.baseline_label(),
        intervention = %window.intervention_label(),
        "Starting analysis."
    );

    // Set up the progress bar
    let progress_bar = ProgressBar::new(window.years().count() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    let series = aggregator.time_series_with(&table, |row| {
        progress_bar.set_message(format!("{}", row.year));
        progress_bar.inc(1);
    });
    progress_bar.finish_with_message("Time series complete!");

    let partners = aggregator.partner_diversification(&table, &settings.partners.tracked);
    let sectors = aggregator.sector_analysis(
        &table,
        &settings.sector_analysis.sectors,
        &settings.sector_analysis.years,
    )?;
    let regions: Vec<_> = [window.baseline_representative, window.intervention_representative]
        .into_iter()
        .flat_map(|year| aggregator.region_breakdown(&table, year))
        .collect();
    let comparison = aggregator.compare_periods(&table);
    let trends = aggregator.trends(&series);
    let sensitivity = aggregator.sensitivity(&table, &settings.sensitivity)?;
    let coverage = aggregator.coverage(&table);
    let sensitivity_rows: Vec<SensitivityRow> =
        sensitivity.baskets.iter().map(SensitivityRow::from).collect();

    let writer = ReportWriter::create(&settings.analysis.output_dir)?;
    writer.write_csv(output::METRICS_SUMMARY_FILE, &series)?;
    writer.write_csv(output::PARTNER_DIVERSIFICATION_FILE, &partners)?;
    writer.write_csv(output::SECTOR_ANALYSIS_FILE, &sectors)?;
    writer.write_csv(output::REGION_BREAKDOWN_FILE, &regions)?;
    writer.write_csv(output::BASKET_EXCLUSION_FILE, &sensitivity.rows)?;
    writer.write_csv(output::BASKET_SENSITIVITY_FILE, &sensitivity_rows)?;
    writer.write_json(
        output::PERIOD_COMPARISON_FILE,
        &RunSummary {
            run_id: uuid::Uuid::new_v4(),
            generated_at: chrono::Utc::now(),
            subject: table.subject(),
            primary_partner: aggregator.engine().primary_partner(),
            window: &window,
            comparison: &comparison,
            trends: &trends,
            sensitivity: &sensitivity,
            coverage: &coverage,
        },
    )?;

    println!("{}", output::series_table(&series));
    println!("{}", output::comparison_table(&comparison));
    if let Some(trend) = trends.dependency {
        println!(
            "Dependency trend: {:+.4} points per year (R² {:.3}, {:?})",
            trend.slope, trend.r_squared, trend.direction
        );
    }
    println!("{}", output::sensitivity_table(&sensitivity));
    if !coverage.suspicious_years.is_empty() {
        println!("Years with unusual import swings: {:?}", coverage.suspicious_years);
    }
    println!("Reports written to {}", settings.analysis.output_dir.display());
    Ok(())
}

/// Prints every metric for one year against a reference year.
fn handle_metrics(settings: &Settings, args: MetricsArgs) -> anyhow::Result<()> {
    let (table, _) = load_table(settings)?;
    let aggregator = Aggregator::from_settings(settings)?;
    let engine = aggregator.engine();
    let primary = engine.primary_partner();
    let year = args.year;
    let baseline = args.baseline.unwrap_or(aggregator.window().baseline_representative);

    let mut rows: Vec<(String, core_types::Metric)> = vec![
        (format!("Dependency on {primary}"), engine.dependency_index(&table, year, primary)),
        ("Concentration (HHI)".to_string(), engine.concentration_index(&table, year)),
        (
            format!("Diversification vs. {baseline}"),
            engine.diversification_score(&table, baseline, year, None),
        ),
        (
            format!("Balance improvement vs. {baseline}"),
            engine.balance_improvement(&table, baseline, year, primary),
        ),
    ];

    let resilience = engine.resilience_score(&table, year, aggregator.weights());
    rows.push(("Resilience".to_string(), resilience.score));
    rows.push(("  Source diversity".to_string(), resilience.source_diversity));
    rows.push(("  Geographic diversity".to_string(), resilience.geographic_diversity));
    rows.push(("  Critical redundancy".to_string(), resilience.critical_redundancy));

    for sector in &settings.sector_analysis.sectors {
        let code = ProductCode::parse(&sector.code)?;
        rows.push((
            format!("Substitution vs. {baseline}: {} {}", code, sector.name),
            engine.substitution_proxy(&table, &code, baseline, year),
        ));
        rows.push((
            format!("Sector vulnerability: {} {}", code, sector.name),
            engine.sector_vulnerability(&table, year, std::slice::from_ref(&code), sector.criticality),
        ));
    }

    let mut out = Table::new();
    out.load_preset(comfy_table::presets::UTF8_FULL);
    out.set_header(vec!["Metric", "Value", "Data"]);
    for (name, metric) in rows {
        out.add_row(vec![
            name,
            format!("{:.4}", metric.value),
            if metric.has_data { "yes" } else { "no" }.to_string(),
        ]);
    }

    println!("{} imports in {year}: {} rows", table.subject(), table.subject_import_count(year));
    println!("{out}");
    Ok(())
}

/// Prints how completely the data covers the analysis window.
fn handle_coverage(settings: &Settings) -> anyhow::Result<()> {
    let (table, load) = load_table(settings)?;
    let aggregator = Aggregator::from_settings(settings)?;
    let report = aggregator.coverage(&table);

    println!(
        "Loaded {} of {} rows ({} rejected)",
        load.rows_loaded, load.rows_read, load.rows_rejected
    );
    for (reason, count) in &load.rejections {
        println!("  {reason}: {count}");
    }
    println!("Years present: {:?}", report.years_present);
    if report.missing_years.is_empty() {
        println!("No missing years in the analysis window.");
    } else {
        println!("Missing years: {:?}", report.missing_years);
    }
    for (flow, count) in &report.flow_distribution {
        println!("  {flow}: {count} rows");
    }
    if !report.suspicious_years.is_empty() {
        println!(
            "Years whose total imports moved by more than {}%: {:?}",
            aggregator.consistency_rules().max_yoy_change,
            report.suspicious_years
        );
    }
    println!("{}", output::coverage_table(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_overrides_parse_after_subcommand() {
        let cli = Cli::parse_from(["derisk", "metrics", "--year", "2022", "--subject", "VNM"]);
        assert_eq!(cli.overrides.subject.as_deref(), Some("VNM"));
        match cli.command {
            Commands::Metrics(args) => {
                assert_eq!(args.year, 2022);
                assert_eq!(args.baseline, None);
            }
            _ => panic!("expected the metrics subcommand"),
        }
    }
}
