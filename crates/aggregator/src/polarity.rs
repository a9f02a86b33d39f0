use core_types::MetricResult;
use serde::Serialize;
use std::fmt;

/// Which direction of change counts as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
}

impl Polarity {
    /// Strict comparison: an unchanged value is never an improvement.
    pub fn improved(self, baseline: f64, intervention: f64) -> bool {
        match self {
            Polarity::LowerIsBetter => intervention < baseline,
            Polarity::HigherIsBetter => intervention > baseline,
        }
    }
}

/// The seven de-risking metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MetricKind {
    Dependency,
    Concentration,
    Resilience,
    SectorVulnerability,
    Diversification,
    Substitution,
    BalanceImprovement,
}

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::Dependency,
        MetricKind::Concentration,
        MetricKind::Resilience,
        MetricKind::SectorVulnerability,
        MetricKind::Diversification,
        MetricKind::Substitution,
        MetricKind::BalanceImprovement,
    ];

    pub fn polarity(self) -> Polarity {
        match self {
            MetricKind::Dependency => Polarity::LowerIsBetter,
            MetricKind::Concentration => Polarity::LowerIsBetter,
            MetricKind::SectorVulnerability => Polarity::LowerIsBetter,
            MetricKind::Resilience => Polarity::HigherIsBetter,
            MetricKind::Diversification => Polarity::HigherIsBetter,
            MetricKind::Substitution => Polarity::HigherIsBetter,
            MetricKind::BalanceImprovement => Polarity::HigherIsBetter,
        }
    }

    /// The value of this metric in a time-series row, for the metrics the
    /// series carries.
    pub fn value_in(self, row: &MetricResult) -> Option<f64> {
        match self {
            MetricKind::Dependency => Some(row.dependency_index),
            MetricKind::Concentration => Some(row.concentration_index),
            MetricKind::Resilience => Some(row.resilience_score),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Dependency => "Trade Dependency Index",
            MetricKind::Concentration => "Herfindahl-Hirschman Index",
            MetricKind::Resilience => "Supply Chain Resilience Score",
            MetricKind::SectorVulnerability => "Strategic Sector Vulnerability Index",
            MetricKind::Diversification => "Plus-One Diversification Score",
            MetricKind::Substitution => "Domestic Manufacturing Substitution Index",
            MetricKind::BalanceImprovement => "Trade Balance Improvement Index",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
