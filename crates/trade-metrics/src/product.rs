use crate::engine::{MetricsEngine, percentage, ratio};
use core_types::{Metric, ProductCode};
use rust_decimal::Decimal;
use trade_table::TradeTable;

impl MetricsEngine {
    /// Import-substitution proxy for one product code.
    ///
    /// `(baseline - current) / baseline`: 1 means imports vanished, negative
    /// values mean imports grew. Returns 0 when the baseline value is 0.
    pub fn substitution_proxy(
        &self,
        table: &TradeTable,
        product: &ProductCode,
        baseline_year: i32,
        current_year: i32,
    ) -> Metric {
        let matching = self.params.product_match;
        let baseline = table.product_imports(product, baseline_year, matching);
        if baseline.is_zero() {
            tracing::debug!(%product, baseline_year, "No baseline imports; substitution proxy is 0.");
            return Metric::no_data();
        }

        let current = table.product_imports(product, current_year, matching);
        let Some(value) = ratio(baseline - current, baseline) else {
            tracing::warn!(%product, baseline_year, current_year, "Substitution proxy out of range; reporting no data.");
            return Metric::no_data();
        };
        tracing::debug!(%product, baseline_year, current_year, value, "Substitution proxy computed.");
        Metric::computed(value)
    }

    /// Strategic sector vulnerability: the primary partner's percentage of
    /// imports within `products`, scaled by `criticality_weight`.
    ///
    /// The weight is an external severity judgement and is applied as given.
    pub fn sector_vulnerability(
        &self,
        table: &TradeTable,
        year: i32,
        products: &[ProductCode],
        criticality_weight: f64,
    ) -> Metric {
        let matching = self.params.product_match;
        let primary = self.primary_partner();

        let mut sector_total = Decimal::ZERO;
        let mut sector_primary = Decimal::ZERO;
        for record in table
            .subject_imports(Some(year))
            .filter(|r| products.iter().any(|p| matching.matches(&r.product, p)))
        {
            sector_total += record.value;
            if record.reporter == primary {
                sector_primary += record.value;
            }
        }

        if sector_total.is_zero() {
            tracing::debug!(year, "No sector imports; vulnerability index is 0.");
            return Metric::no_data();
        }

        let Some(share) = percentage(sector_primary, sector_total) else {
            tracing::warn!(year, "Sector vulnerability out of range; reporting no data.");
            return Metric::no_data();
        };
        let value = share * criticality_weight;
        tracing::debug!(year, value, "Sector vulnerability computed.");
        Metric::computed(value)
    }
}
