use serde::Serialize;
use std::collections::BTreeMap;

/// Percentage share of the subject's imports held by each supplying partner.
///
/// Shares sum to ~100, or the map is empty when the year has no imports.
/// Keys are ISO3 codes, kept in sorted order so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PartnerShareMap(BTreeMap<String, f64>);

impl PartnerShareMap {
    pub fn new(shares: BTreeMap<String, f64>) -> Self {
        Self(shares)
    }

    /// The partner's share, `0.0` if it did not supply anything.
    pub fn get(&self, partner: &str) -> f64 {
        self.0.get(partner).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, partner: &str) -> bool {
        self.0.contains_key(partner)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }

    /// Partners ordered by descending share, ties broken by ISO3 code.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn into_inner(self) -> BTreeMap<String, f64> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_orders_by_share_then_code() {
        let shares = PartnerShareMap::new(BTreeMap::from([
            ("USA".to_string(), 20.0),
            ("CHN".to_string(), 60.0),
            ("ARE".to_string(), 20.0),
        ]));

        let ranked = shares.ranked();
        assert_eq!(ranked[0], ("CHN", 60.0));
        assert_eq!(ranked[1], ("ARE", 20.0));
        assert_eq!(ranked[2], ("USA", 20.0));
        assert_eq!(shares.get("JPN"), 0.0);
        assert_eq!(shares.total(), 100.0);
    }
}
