use crate::engine::MetricsEngine;
use core_types::{Metric, Region};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use trade_table::TradeTable;

/// Tolerance on the weight sum before a drift warning is logged.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights of the three resilience sub-scores.
///
/// By convention they sum to 1. This is not enforced; a different sum only
/// rescales the composite and is logged as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResilienceWeights {
    pub source_diversity: f64,
    pub geographic_diversity: f64,
    pub critical_redundancy: f64,
}

impl ResilienceWeights {
    pub fn new(source_diversity: f64, geographic_diversity: f64, critical_redundancy: f64) -> Self {
        Self {
            source_diversity,
            geographic_diversity,
            critical_redundancy,
        }
    }

    pub fn sum(&self) -> f64 {
        self.source_diversity + self.geographic_diversity + self.critical_redundancy
    }
}

impl Default for ResilienceWeights {
    fn default() -> Self {
        Self::new(0.4, 0.3, 0.3)
    }
}

/// The composite resilience score and the sub-scores it was built from.
/// Every sub-score lies in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResilienceBreakdown {
    pub source_diversity: Metric,
    pub geographic_diversity: Metric,
    pub critical_redundancy: Metric,
    pub score: Metric,
}

impl MetricsEngine {
    /// Supply-chain resilience score for `year`.
    pub fn resilience_score(
        &self,
        table: &TradeTable,
        year: i32,
        weights: &ResilienceWeights,
    ) -> ResilienceBreakdown {
        if (weights.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            tracing::warn!(sum = weights.sum(), "Resilience weights do not sum to 1.");
        }

        let source_diversity = self.source_diversity(table, year);
        let geographic_diversity = self.geographic_diversity(table, year);
        let critical_redundancy = self.critical_redundancy(table, year);

        let has_data =
            source_diversity.has_data || geographic_diversity.has_data || critical_redundancy.has_data;
        let score = if has_data {
            let value = weights.source_diversity * source_diversity.value
                + weights.geographic_diversity * geographic_diversity.value
                + weights.critical_redundancy * critical_redundancy.value;
            tracing::debug!(year, value, "Resilience score computed.");
            Metric::computed(value)
        } else {
            tracing::debug!(year, "No imports recorded; resilience score is 0.");
            Metric::no_data()
        };

        ResilienceBreakdown {
            source_diversity,
            geographic_diversity,
            critical_redundancy,
            score,
        }
    }

    /// Effective number of suppliers (inverse HHI on fractional shares),
    /// normalized against `max_effective_suppliers`.
    pub fn source_diversity(&self, table: &TradeTable, year: i32) -> Metric {
        let shares = table.partner_shares(year);
        let hhi: f64 = shares.values().map(|s| (s / 100.0).powi(2)).sum();
        if hhi <= 0.0 {
            return Metric::no_data();
        }

        let effective_suppliers = 1.0 / hhi;
        Metric::computed(clamp_score(
            effective_suppliers / self.params.max_effective_suppliers * 100.0,
        ))
    }

    /// Simpson diversity over regional import shares, normalized against the
    /// best value achievable with `region_count` equally weighted regions.
    pub fn geographic_diversity(&self, table: &TradeTable, year: i32) -> Metric {
        let shares = self.region_shares(table, year);
        if shares.is_empty() {
            return Metric::no_data();
        }

        let simpson = 1.0 - shares.values().map(|s| (s / 100.0).powi(2)).sum::<f64>();
        let max_simpson = 1.0 - 1.0 / self.params.region_count as f64;
        Metric::computed(clamp_score(simpson / max_simpson * 100.0))
    }

    /// Mean number of distinct suppliers per imported product, normalized
    /// against `max_suppliers_per_product`.
    pub fn critical_redundancy(&self, table: &TradeTable, year: i32) -> Metric {
        let suppliers = table.suppliers_per_product(year);
        if suppliers.is_empty() {
            return Metric::no_data();
        }

        let mean = suppliers.values().sum::<usize>() as f64 / suppliers.len() as f64;
        Metric::computed(clamp_score(
            mean / self.params.max_suppliers_per_product * 100.0,
        ))
    }

    /// Percentage of the subject's imports sourced from each region.
    ///
    /// Partners missing from the region map are pooled under
    /// `Region::Unknown`. Empty when the year has no imports.
    pub fn region_shares(&self, table: &TradeTable, year: i32) -> BTreeMap<Region, f64> {
        let mut totals: BTreeMap<Region, Decimal> = BTreeMap::new();
        for (partner, value) in table.partner_totals(year) {
            let region = self.reference.region_map.classify(&partner);
            *totals.entry(region).or_default() += value;
        }

        let total: Decimal = totals.values().copied().sum();
        if total.is_zero() {
            return BTreeMap::new();
        }

        totals
            .into_iter()
            .map(|(region, value)| {
                let share = (value / total * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0);
                (region, share)
            })
            .collect()
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
