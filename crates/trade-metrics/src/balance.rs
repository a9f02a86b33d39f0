use crate::engine::{MetricsEngine, percentage};
use core_types::Metric;
use trade_table::TradeTable;

impl MetricsEngine {
    /// Trade-balance improvement with `partner`: the percentage reduction of
    /// the bilateral deficit from `baseline_year` to `current_year`.
    ///
    /// A deficit that flips into a surplus yields a value above 100. Returns
    /// 0 when the baseline deficit is 0, or when the change relative to a
    /// near-zero baseline is too large to represent.
    pub fn balance_improvement(
        &self,
        table: &TradeTable,
        baseline_year: i32,
        current_year: i32,
        partner: &str,
    ) -> Metric {
        let baseline = table.bilateral_deficit(baseline_year, partner);
        if baseline.is_zero() {
            tracing::debug!(partner, baseline_year, "Zero baseline deficit; balance improvement is 0.");
            return Metric::no_data();
        }

        let current = table.bilateral_deficit(current_year, partner);
        let Some(value) = baseline
            .checked_sub(current)
            .and_then(|change| percentage(change, baseline))
        else {
            tracing::warn!(partner, baseline_year, current_year, "Balance improvement out of range; reporting no data.");
            return Metric::no_data();
        };
        tracing::debug!(partner, baseline_year, current_year, value, "Balance improvement computed.");
        Metric::computed(value)
    }
}
