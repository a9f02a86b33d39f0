//! # Derisk Aggregator
//!
//! Runs the metrics engine across the analysis window and assembles the
//! per-year series, the baseline vs. intervention comparison and the partner,
//! sector and region breakdowns a run reports.
//!
//! ## Public API
//!
//! - `Aggregator`: built from `Settings`, owns the engine, window and weights.
//! - `AnalysisWindow`: the two periods and their representative years.
//! - `MetricKind` / `Polarity`: the hardcoded improvement direction per metric.
//! - `compare_metric` / `compare_series`: period comparisons from raw values
//!   or from an already computed series.
//! - `linear_trend` / `structural_break`: descriptive trend fitting.
//! - `SensitivityReport`: the dependency index without excluded baskets.
//! - `CoverageReport` / `ConsistencyRules`: data completeness and the
//!   year-over-year check on total imports.

use configuration::{SectorDefinition, SensitivitySettings, Settings, TrackedPartner};
use core_types::{MetricResult, ProductCode, normalize_iso3};
use std::collections::BTreeMap;
use trade_metrics::{EngineParams, MetricsEngine, ReferenceData, RegionMap, ResilienceWeights};
use trade_table::TradeTable;

pub mod breakdown;
pub mod comparison;
pub mod coverage;
pub mod error;
pub mod exclusion;
pub mod polarity;
pub mod trend;
pub mod window;

pub use breakdown::{PartnerShareRow, RegionShareRow, SectorRow};
pub use comparison::{
    DiversificationOutcome, DiversificationSummary, PeriodComparison, PeriodComparisonReport,
    compare_metric, compare_series,
};
pub use coverage::{ConsistencyRules, CoverageReport};
pub use error::AggregatorError;
pub use exclusion::{ExclusionRow, ExclusionSummary, PeriodMeans, SensitivityReport, SensitivityRow};
pub use polarity::{MetricKind, Polarity};
pub use trend::{LinearTrend, StructuralBreak, TrendDirection, TrendReport, linear_trend, structural_break};
pub use window::AnalysisWindow;

/// Aggregates the metrics of one subject over an analysis window.
#[derive(Debug, Clone)]
pub struct Aggregator {
    engine: MetricsEngine,
    window: AnalysisWindow,
    weights: ResilienceWeights,
    rules: ConsistencyRules,
}

/// Label of the headline exclusion basket.
pub const HEADLINE_BASKET: &str = "excluded basket";
/// Label of the narrower basket run alongside it.
pub const ALTERNATIVE_BASKET: &str = "alternative basket";

fn parse_codes(codes: &[String]) -> Result<Vec<ProductCode>, AggregatorError> {
    Ok(codes
        .iter()
        .map(|c| ProductCode::parse(c))
        .collect::<Result<Vec<_>, _>>()?)
}

impl Aggregator {
    pub fn new(engine: MetricsEngine, window: AnalysisWindow, weights: ResilienceWeights) -> Self {
        Self {
            engine,
            window,
            weights,
            rules: ConsistencyRules::default(),
        }
    }

    pub fn with_consistency_rules(mut self, rules: ConsistencyRules) -> Self {
        self.rules = rules;
        self
    }

    /// Builds the engine, window and resilience weights from the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, AggregatorError> {
        let window = AnalysisWindow::from_settings(&settings.periods)?;

        let alternative_partners = settings
            .partners
            .alternatives
            .iter()
            .map(|p| normalize_iso3(p))
            .collect::<Result<Vec<_>, _>>()?;
        let region_map = RegionMap::world()
            .with_overrides(settings.regions.iter().map(|(code, region)| (code.clone(), *region)));
        let reference = ReferenceData {
            primary_partner: normalize_iso3(&settings.analysis.primary_partner)?,
            alternative_partners,
            region_map,
        };

        let r = &settings.resilience;
        let params = EngineParams {
            max_effective_suppliers: r.max_effective_suppliers,
            region_count: r.region_count,
            max_suppliers_per_product: r.max_suppliers_per_product,
            product_match: settings.analysis.product_match,
        };
        let engine = MetricsEngine::new(reference, params)?;
        let weights = ResilienceWeights::new(r.source_weight, r.geographic_weight, r.redundancy_weight);

        Ok(Self::new(engine, window, weights)
            .with_consistency_rules(ConsistencyRules::from_settings(&settings.validation)))
    }

    pub fn engine(&self) -> &MetricsEngine {
        &self.engine
    }

    pub fn window(&self) -> &AnalysisWindow {
        &self.window
    }

    pub fn weights(&self) -> &ResilienceWeights {
        &self.weights
    }

    pub fn consistency_rules(&self) -> &ConsistencyRules {
        &self.rules
    }

    /// The headline metrics of a single year, tagged with its period.
    ///
    /// A year carries data only when its dependency index was computed from
    /// a non-zero import total; rows with zero value do not count.
    pub fn year_result(&self, table: &TradeTable, year: i32) -> MetricResult {
        let snapshot = self.engine.year_snapshot(table, year, &self.weights);
        MetricResult {
            year,
            period: self.window.period_of(year),
            dependency_index: snapshot.dependency.value,
            concentration_index: snapshot.concentration.value,
            resilience_score: snapshot.resilience.score.value,
            source_diversity: snapshot.resilience.source_diversity.value,
            geographic_diversity: snapshot.resilience.geographic_diversity.value,
            critical_redundancy: snapshot.resilience.critical_redundancy.value,
            import_rows: snapshot.import_rows,
            has_data: snapshot.dependency.has_data && snapshot.import_rows > 0,
        }
    }

    /// One row per window year, in year order.
    pub fn time_series(&self, table: &TradeTable) -> Vec<MetricResult> {
        self.time_series_with(table, |_| {})
    }

    /// Like `time_series`, calling `on_year` after each year is computed.
    pub fn time_series_with<F>(&self, table: &TradeTable, mut on_year: F) -> Vec<MetricResult>
    where
        F: FnMut(&MetricResult),
    {
        let rows: Vec<MetricResult> = self
            .window
            .years()
            .map(|year| {
                let row = self.year_result(table, year);
                if !row.has_data {
                    tracing::debug!(year, "No subject imports recorded for year.");
                }
                on_year(&row);
                row
            })
            .collect();

        tracing::info!(
            years = rows.len(),
            years_with_data = rows.iter().filter(|r| r.has_data).count(),
            "Time series computed."
        );
        rows
    }

    /// Compares the two representative years.
    pub fn compare_periods(&self, table: &TradeTable) -> PeriodComparisonReport {
        let baseline_year = self.window.baseline_representative;
        let intervention_year = self.window.intervention_representative;
        let primary = self.engine.primary_partner();

        let mut metrics = BTreeMap::new();
        metrics.insert(
            MetricKind::Dependency,
            compare_metric(
                MetricKind::Dependency,
                self.engine.dependency_index(table, baseline_year, primary).value,
                self.engine.dependency_index(table, intervention_year, primary).value,
            ),
        );
        metrics.insert(
            MetricKind::Concentration,
            compare_metric(
                MetricKind::Concentration,
                self.engine.concentration_index(table, baseline_year).value,
                self.engine.concentration_index(table, intervention_year).value,
            ),
        );
        metrics.insert(
            MetricKind::Resilience,
            compare_metric(
                MetricKind::Resilience,
                self.engine.resilience_score(table, baseline_year, &self.weights).score.value,
                self.engine.resilience_score(table, intervention_year, &self.weights).score.value,
            ),
        );

        let score = self
            .engine
            .diversification_score(table, baseline_year, intervention_year, None);
        let diversification = DiversificationSummary {
            score,
            interpretation: DiversificationOutcome::from_score(score.value),
        };
        let balance_improvement =
            self.engine
                .balance_improvement(table, baseline_year, intervention_year, primary);

        let improved = metrics.values().filter(|c| c.improved).count();
        tracing::info!(
            baseline_year,
            intervention_year,
            improved,
            compared = metrics.len(),
            "Period comparison complete."
        );

        PeriodComparisonReport {
            baseline_period: self.window.baseline_label(),
            intervention_period: self.window.intervention_label(),
            baseline_year,
            intervention_year,
            metrics,
            diversification,
            balance_improvement,
        }
    }

    /// Import share of each tracked partner for every window year.
    pub fn partner_diversification(
        &self,
        table: &TradeTable,
        tracked: &[TrackedPartner],
    ) -> Vec<PartnerShareRow> {
        let mut rows = Vec::with_capacity(tracked.len() * self.window.years().count());
        for year in self.window.years() {
            let shares = table.partner_shares(year);
            for partner in tracked {
                let iso = partner.iso3.trim().to_ascii_uppercase();
                rows.push(PartnerShareRow {
                    year,
                    period: self.window.period_of(year),
                    import_share: shares.get(&iso),
                    partner_iso: iso,
                    partner_name: partner.name.clone(),
                });
            }
        }
        rows
    }

    /// Sector vulnerability of every sector in every requested year.
    pub fn sector_analysis(
        &self,
        table: &TradeTable,
        sectors: &[SectorDefinition],
        years: &[i32],
    ) -> Result<Vec<SectorRow>, AggregatorError> {
        let codes = sectors
            .iter()
            .map(|s| ProductCode::parse(&s.code))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(sectors.len() * years.len());
        for &year in years {
            for (sector, code) in sectors.iter().zip(&codes) {
                let vulnerability = self.engine.sector_vulnerability(
                    table,
                    year,
                    std::slice::from_ref(code),
                    sector.criticality,
                );
                rows.push(SectorRow {
                    year,
                    sector_code: code.to_string(),
                    sector_name: sector.name.clone(),
                    criticality: sector.criticality,
                    vulnerability: vulnerability.value,
                    has_data: vulnerability.has_data,
                });
            }
        }
        Ok(rows)
    }

    /// Regional split of the subject's imports in `year`, largest first.
    pub fn region_breakdown(&self, table: &TradeTable, year: i32) -> Vec<RegionShareRow> {
        let mut rows: Vec<RegionShareRow> = self
            .engine
            .region_shares(table, year)
            .into_iter()
            .map(|(region, import_share)| RegionShareRow {
                year,
                region,
                import_share,
            })
            .collect();
        rows.sort_by(|a, b| b.import_share.total_cmp(&a.import_share).then(a.region.cmp(&b.region)));
        rows
    }

    /// Trends of the headline metrics, with the dependency slope split at
    /// the start of the intervention period.
    pub fn trends(&self, rows: &[MetricResult]) -> TrendReport {
        let dependency = trend::series_points(MetricKind::Dependency, rows);
        TrendReport {
            dependency: linear_trend(&dependency),
            concentration: linear_trend(&trend::series_points(MetricKind::Concentration, rows)),
            resilience: linear_trend(&trend::series_points(MetricKind::Resilience, rows)),
            dependency_break: structural_break(&dependency, self.window.intervention_start),
        }
    }

    /// Dependency on the primary partner with and without `excluded`, for
    /// every window year.
    pub fn exclusion_series(&self, table: &TradeTable, excluded: &[ProductCode]) -> Vec<ExclusionRow> {
        let primary = self.engine.primary_partner();
        self.window
            .years()
            .map(|year| {
                let with = self.engine.dependency_index(table, year, primary);
                let without = self
                    .engine
                    .dependency_index_excluding(table, year, primary, excluded);
                ExclusionRow {
                    year,
                    period: self.window.period_of(year),
                    dependency_index: with.value,
                    dependency_excluding: without.value,
                    basket_effect: with.value - without.value,
                    has_data: with.has_data && without.has_data,
                }
            })
            .collect()
    }

    /// Runs both configured baskets. The yearly rows are those of the
    /// headline basket.
    pub fn sensitivity(
        &self,
        table: &TradeTable,
        settings: &SensitivitySettings,
    ) -> Result<SensitivityReport, AggregatorError> {
        let break_year = self.window.intervention_start;
        let headline = parse_codes(&settings.excluded_codes)?;
        let alternative = parse_codes(&settings.alternative_excluded_codes)?;

        let rows = self.exclusion_series(table, &headline);
        let alternative_rows = self.exclusion_series(table, &alternative);
        let baskets = vec![
            exclusion::summarize(HEADLINE_BASKET, &headline, &rows, break_year),
            exclusion::summarize(ALTERNATIVE_BASKET, &alternative, &alternative_rows, break_year),
        ];

        for basket in &baskets {
            tracing::info!(
                basket = %basket.label,
                acceleration = ?basket.acceleration,
                trend_persists = ?basket.trend_persists,
                "Exclusion sensitivity computed."
            );
        }
        Ok(SensitivityReport { rows, baskets })
    }

    pub fn coverage(&self, table: &TradeTable) -> CoverageReport {
        coverage::coverage(table, &self.window, &self.rules)
    }
}
