use crate::error::MetricsError;
use crate::reference::ReferenceData;
use crate::resilience::{ResilienceBreakdown, ResilienceWeights};
use core_types::{Metric, ProductCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use trade_table::{ProductMatch, TradeTable};

/// Normalization bounds and matching rules shared by the calculators.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    /// Effective supplier count that earns a full source-diversity score.
    pub max_effective_suppliers: f64,
    /// Number of regions the geographic-diversity score is normalized against.
    pub region_count: usize,
    /// Mean suppliers per product that earns a full redundancy score.
    pub max_suppliers_per_product: f64,
    /// How product-code filters are applied by the product-level metrics.
    pub product_match: ProductMatch,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            max_effective_suppliers: 20.0,
            region_count: 7,
            max_suppliers_per_product: 10.0,
            product_match: ProductMatch::Exact,
        }
    }
}

/// A stateless calculator for de-risking metrics.
///
/// The engine holds only immutable reference data and parameters. Every
/// calculator is a pure function of the `TradeTable` it is handed, so calls
/// for different years are independent of one another.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    pub(crate) reference: ReferenceData,
    pub(crate) params: EngineParams,
}

impl MetricsEngine {
    /// Creates a new engine, validating the normalization bounds.
    pub fn new(reference: ReferenceData, params: EngineParams) -> Result<Self, MetricsError> {
        if params.max_effective_suppliers.is_nan() || params.max_effective_suppliers <= 0.0 {
            return Err(MetricsError::InvalidParameter(
                "max_effective_suppliers must be greater than 0".to_string(),
            ));
        }
        if params.region_count < 2 {
            return Err(MetricsError::InvalidParameter(
                "region_count must be at least 2".to_string(),
            ));
        }
        if params.max_suppliers_per_product.is_nan() || params.max_suppliers_per_product <= 0.0 {
            return Err(MetricsError::InvalidParameter(
                "max_suppliers_per_product must be greater than 0".to_string(),
            ));
        }
        if reference.primary_partner.trim().is_empty() {
            return Err(MetricsError::InvalidParameter(
                "primary_partner must not be empty".to_string(),
            ));
        }
        Ok(Self { reference, params })
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn primary_partner(&self) -> &str {
        &self.reference.primary_partner
    }

    /// Trade Dependency Index: `partner`'s percentage of the subject's
    /// imports in `year`.
    pub fn dependency_index(&self, table: &TradeTable, year: i32, partner: &str) -> Metric {
        let total = table.total_subject_imports(year);
        if total.is_zero() {
            tracing::debug!(year, partner, "No imports recorded; dependency index is 0.");
            return Metric::no_data();
        }

        let partner_value = table.imports_from(partner, year);
        let Some(value) = percentage(partner_value, total) else {
            tracing::warn!(year, partner, "Dependency index out of range; reporting no data.");
            return Metric::no_data();
        };
        tracing::debug!(year, partner, value, "Dependency index computed.");
        Metric::computed(value)
    }

    /// Dependency index over the import base with every `excluded` chapter
    /// removed (prefix match). Shows whether the dependency holds outside
    /// a basket of products.
    pub fn dependency_index_excluding(
        &self,
        table: &TradeTable,
        year: i32,
        partner: &str,
        excluded: &[ProductCode],
    ) -> Metric {
        let mut total = Decimal::ZERO;
        let mut partner_value = Decimal::ZERO;
        for record in table.subject_imports_excluding(year, excluded) {
            total += record.value;
            if record.reporter == partner {
                partner_value += record.value;
            }
        }

        if total.is_zero() {
            tracing::debug!(year, partner, "No imports outside the excluded basket.");
            return Metric::no_data();
        }
        let Some(value) = percentage(partner_value, total) else {
            tracing::warn!(year, partner, "Dependency index out of range; reporting no data.");
            return Metric::no_data();
        };
        tracing::debug!(year, partner, value, excluded = excluded.len(), "Basket-excluded dependency computed.");
        Metric::computed(value)
    }

    /// Herfindahl-Hirschman concentration of the subject's import sources,
    /// in `[0, 10000]`.
    pub fn concentration_index(&self, table: &TradeTable, year: i32) -> Metric {
        let shares = table.partner_shares(year);
        if shares.is_empty() {
            tracing::debug!(year, "No imports recorded; concentration index is 0.");
            return Metric::no_data();
        }

        let value: f64 = shares.values().map(|s| s * s).sum();
        tracing::debug!(year, value, "Concentration index computed.");
        Metric::computed(value)
    }

    /// Dependency, concentration and resilience for one year in one call.
    pub fn year_snapshot(
        &self,
        table: &TradeTable,
        year: i32,
        weights: &ResilienceWeights,
    ) -> YearSnapshot {
        YearSnapshot {
            year,
            dependency: self.dependency_index(table, year, self.primary_partner()),
            concentration: self.concentration_index(table, year),
            resilience: self.resilience_score(table, year, weights),
            import_rows: table.subject_import_count(year),
        }
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self {
            reference: ReferenceData::default(),
            params: EngineParams::default(),
        }
    }
}

/// The headline metrics of a single year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSnapshot {
    pub year: i32,
    pub dependency: Metric,
    pub concentration: Metric,
    pub resilience: ResilienceBreakdown,
    pub import_rows: usize,
}

/// `100 * part / whole` as a float, or `None` when `whole` is zero or the
/// quotient leaves the `Decimal` range.
pub(crate) fn percentage(part: Decimal, whole: Decimal) -> Option<f64> {
    part.checked_div(whole)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_f64()
}

/// `part / whole` as a float, or `None` when the division overflows.
pub(crate) fn ratio(part: Decimal, whole: Decimal) -> Option<f64> {
    part.checked_div(whole)?.to_f64()
}
