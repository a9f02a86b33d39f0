use crate::engine::MetricsEngine;
use core_types::Metric;
use trade_table::TradeTable;

/// Share movements smaller than this are treated as "unchanged".
const UNCHANGED_SHARE: f64 = 1e-12;

impl MetricsEngine {
    /// "Plus-one" diversification score between two years.
    ///
    /// The summed share gain of the alternative partners, divided by the
    /// absolute share change of the primary partner. A score above 1 means
    /// the alternatives absorbed more than the primary partner moved.
    ///
    /// `alternatives == None` uses the engine's reference set. Returns 0 when
    /// the primary partner's share did not move.
    pub fn diversification_score(
        &self,
        table: &TradeTable,
        baseline_year: i32,
        current_year: i32,
        alternatives: Option<&[String]>,
    ) -> Metric {
        let alternatives = alternatives.unwrap_or(&self.reference.alternative_partners);
        let baseline = table.partner_shares(baseline_year);
        let current = table.partner_shares(current_year);

        let primary = self.primary_partner();
        let primary_change = current.get(primary) - baseline.get(primary);
        if primary_change.abs() <= UNCHANGED_SHARE {
            tracing::debug!(
                baseline_year,
                current_year,
                "Primary partner share unchanged; diversification score is 0."
            );
            return Metric::no_data();
        }

        let alternatives_change: f64 = alternatives
            .iter()
            .map(|p| current.get(p) - baseline.get(p))
            .sum();

        let value = alternatives_change / primary_change.abs();
        tracing::debug!(baseline_year, current_year, value, "Diversification score computed.");
        Metric::computed(value)
    }
}
