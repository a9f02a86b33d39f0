use crate::error::ConfigError;
use core_types::{ProductCode, ProductMatch, Region, normalize_iso3};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty or absent config file yields the
/// reference analysis (India vs. China, 2007-2019 vs. 2020-2024).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analysis: AnalysisSettings,
    pub periods: PeriodSettings,
    pub resilience: ResilienceSettings,
    pub partners: PartnerSettings,
    pub sector_analysis: SectorAnalysisSettings,
    pub sensitivity: SensitivitySettings,
    pub validation: ValidationSettings,
    /// ISO3 -> region entries added to, or replacing, the built-in table.
    pub regions: HashMap<String, Region>,
    pub logging: LoggingSettings,
}

/// What is analysed and where the data lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// The importing country under study.
    pub subject: String,
    /// The partner whose dependency is tracked.
    pub primary_partner: String,
    /// The consolidated trade extract.
    pub data_path: PathBuf,
    /// Directory the CSV/JSON outputs are written to.
    pub output_dir: PathBuf,
    /// Fail on the first malformed row instead of skipping it.
    pub strict_load: bool,
    /// How sector and product filters match product codes.
    pub product_match: ProductMatch,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            subject: "IND".to_string(),
            primary_partner: "CHN".to_string(),
            data_path: PathBuf::from("data/merged/consolidated_trade_data.csv"),
            output_dir: PathBuf::from("output/derisking_analysis"),
            strict_load: false,
            product_match: ProductMatch::Exact,
        }
    }
}

/// The baseline and intervention windows.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PeriodSettings {
    pub baseline_start: i32,
    /// The cutoff year: it and every earlier year are baseline years.
    pub baseline_end: i32,
    pub intervention_start: i32,
    pub intervention_end: i32,
    /// Year standing in for the baseline period in comparisons.
    pub baseline_representative: i32,
    /// Year standing in for the intervention period in comparisons.
    pub intervention_representative: i32,
}

impl Default for PeriodSettings {
    fn default() -> Self {
        Self {
            baseline_start: 2007,
            baseline_end: 2019,
            intervention_start: 2020,
            intervention_end: 2024,
            baseline_representative: 2015,
            intervention_representative: 2022,
        }
    }
}

/// Weights and normalization bounds of the resilience score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResilienceSettings {
    /// Weight of source diversity. The three weights should sum to 1.
    pub source_weight: f64,
    pub geographic_weight: f64,
    pub redundancy_weight: f64,
    pub max_effective_suppliers: f64,
    pub region_count: usize,
    pub max_suppliers_per_product: f64,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            source_weight: 0.4,
            geographic_weight: 0.3,
            redundancy_weight: 0.3,
            max_effective_suppliers: 20.0,
            region_count: 7,
            max_suppliers_per_product: 10.0,
        }
    }
}

/// A partner whose import share is reported year by year.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackedPartner {
    pub iso3: String,
    pub name: String,
}

impl TrackedPartner {
    fn new(iso3: &str, name: &str) -> Self {
        Self {
            iso3: iso3.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PartnerSettings {
    /// Alternative suppliers for the diversification score.
    pub alternatives: Vec<String>,
    pub tracked: Vec<TrackedPartner>,
}

impl Default for PartnerSettings {
    fn default() -> Self {
        Self {
            alternatives: ["USA", "JPN", "DEU", "SGP", "KOR", "ARE", "AUS", "GBR", "FRA", "ITA"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            tracked: vec![
                TrackedPartner::new("CHN", "China"),
                TrackedPartner::new("USA", "United States"),
                TrackedPartner::new("ARE", "UAE"),
                TrackedPartner::new("SAU", "Saudi Arabia"),
                TrackedPartner::new("IRQ", "Iraq"),
                TrackedPartner::new("CHE", "Switzerland"),
                TrackedPartner::new("KOR", "South Korea"),
                TrackedPartner::new("JPN", "Japan"),
                TrackedPartner::new("DEU", "Germany"),
                TrackedPartner::new("SGP", "Singapore"),
            ],
        }
    }
}

/// A strategic sector: an HS code and its externally judged criticality.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectorDefinition {
    pub code: String,
    pub name: String,
    pub criticality: f64,
}

impl SectorDefinition {
    fn new(code: &str, name: &str, criticality: f64) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            criticality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SectorAnalysisSettings {
    /// Years the sector vulnerability is reported for.
    pub years: Vec<i32>,
    pub sectors: Vec<SectorDefinition>,
}

impl Default for SectorAnalysisSettings {
    fn default() -> Self {
        Self {
            years: vec![2019, 2024],
            sectors: vec![
                SectorDefinition::new("84", "Machinery & Mechanical Appliances", 5.0),
                SectorDefinition::new("85", "Electrical Machinery & Equipment", 5.0),
                SectorDefinition::new("29", "Organic Chemicals", 4.0),
                SectorDefinition::new("30", "Pharmaceutical Products", 5.0),
                SectorDefinition::new("39", "Plastics", 3.0),
                SectorDefinition::new("72", "Iron & Steel", 4.0),
                SectorDefinition::new("90", "Optical & Medical Instruments", 4.0),
            ],
        }
    }
}

/// HS chapters dropped from the import base to check whether the dependency
/// trend survives without them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensitivitySettings {
    /// The headline exclusion basket: pandemic-sensitive chapters by default.
    pub excluded_codes: Vec<String>,
    /// A narrower basket run alongside it. By default the same chapters
    /// with organic chemicals (29) kept in.
    pub alternative_excluded_codes: Vec<String>,
}

const PANDEMIC_SENSITIVE: [&str; 12] =
    ["22", "28", "29", "30", "34", "38", "39", "40", "62", "63", "65", "90"];

impl Default for SensitivitySettings {
    fn default() -> Self {
        Self {
            excluded_codes: PANDEMIC_SENSITIVE.iter().map(|c| c.to_string()).collect(),
            alternative_excluded_codes: PANDEMIC_SENSITIVE
                .iter()
                .filter(|&&c| c != "29")
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// Year-over-year consistency check on the subject's total imports.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Absolute year-over-year change, in percent, above which a year is flagged.
    pub max_yoy_change: f64,
    /// Years with a known shock that are never flagged.
    pub exempt_years: Vec<i32>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_yoy_change: 50.0,
            exempt_years: vec![2020],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file here.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "derisk.log".to_string(),
        }
    }
}

impl Settings {
    /// Checks cross-field consistency and the shape of every configured code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        for (field, code) in [
            ("analysis.subject", &self.analysis.subject),
            ("analysis.primary_partner", &self.analysis.primary_partner),
        ] {
            if normalize_iso3(code).is_err() {
                return invalid(format!("{field} '{code}' is not a three-letter ISO3 code"));
            }
        }

        let p = &self.periods;
        if p.baseline_start > p.baseline_end {
            return invalid("periods.baseline_start must not be after baseline_end".to_string());
        }
        if p.intervention_start <= p.baseline_end {
            return invalid("periods.intervention_start must be after baseline_end".to_string());
        }
        if p.intervention_start > p.intervention_end {
            return invalid("periods.intervention_start must not be after intervention_end".to_string());
        }
        if !(p.baseline_start..=p.baseline_end).contains(&p.baseline_representative) {
            return invalid("periods.baseline_representative must lie in the baseline period".to_string());
        }
        if !(p.intervention_start..=p.intervention_end).contains(&p.intervention_representative) {
            return invalid(
                "periods.intervention_representative must lie in the intervention period".to_string(),
            );
        }

        let r = &self.resilience;
        for (field, weight) in [
            ("source_weight", r.source_weight),
            ("geographic_weight", r.geographic_weight),
            ("redundancy_weight", r.redundancy_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return invalid(format!("resilience.{field} must be a non-negative number"));
            }
        }

        for sector in &self.sector_analysis.sectors {
            if ProductCode::parse(&sector.code).is_err() {
                return invalid(format!("sector '{}' has an invalid code '{}'", sector.name, sector.code));
            }
            if !sector.criticality.is_finite() || sector.criticality < 0.0 {
                return invalid(format!("sector '{}' has a negative criticality", sector.name));
            }
        }

        let s = &self.sensitivity;
        for code in s.excluded_codes.iter().chain(&s.alternative_excluded_codes) {
            if ProductCode::parse(code).is_err() {
                return invalid(format!("sensitivity code '{code}' is not a valid product code"));
            }
        }

        let v = &self.validation;
        if !v.max_yoy_change.is_finite() || v.max_yoy_change <= 0.0 {
            return invalid("validation.max_yoy_change must be a positive number".to_string());
        }

        for code in self.partners.alternatives.iter().chain(self.regions.keys()) {
            if normalize_iso3(code).is_err() {
                return invalid(format!("'{code}' is not a three-letter ISO3 code"));
            }
        }
        for partner in &self.partners.tracked {
            if normalize_iso3(&partner.iso3).is_err() {
                return invalid(format!("tracked partner '{}' has an invalid code", partner.name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.periods.baseline_end, 2019);
        assert_eq!(settings.partners.alternatives.len(), 10);
        assert_eq!(settings.sector_analysis.sectors.len(), 7);
        assert_eq!(settings.sensitivity.excluded_codes.len(), 12);
        assert_eq!(settings.sensitivity.alternative_excluded_codes.len(), 11);
        assert!(!settings.sensitivity.alternative_excluded_codes.contains(&"29".to_string()));
        assert_eq!(settings.validation.exempt_years, vec![2020]);
    }

    #[test]
    fn invalid_sensitivity_codes_are_rejected() {
        let mut settings = Settings::default();
        settings.sensitivity.excluded_codes.push("2 9".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn non_positive_yoy_threshold_is_rejected() {
        let mut settings = Settings::default();
        settings.validation.max_yoy_change = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn overlapping_periods_are_rejected() {
        let mut settings = Settings::default();
        settings.periods.intervention_start = 2019;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn representative_year_outside_period_is_rejected() {
        let mut settings = Settings::default();
        settings.periods.intervention_representative = 2015;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn negative_weights_are_rejected() {
        let mut settings = Settings::default();
        settings.resilience.geographic_weight = -0.1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn invalid_codes_are_rejected() {
        let mut settings = Settings::default();
        settings.analysis.subject = "INDIA".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.sector_analysis.sectors[0].code = " ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
            [analysis]
            subject = "VNM"

            [periods]
            baseline_end = 2017
            intervention_start = 2018

            [regions]
            XKX = "Europe"

            [sensitivity]
            excluded_codes = ["30", "90"]

            [validation]
            exempt_years = [2009, 2020]

            [[sector_analysis.sectors]]
            code = "8541"
            name = "Semiconductors"
            criticality = 5.0
        "#;
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.analysis.subject, "VNM");
        assert_eq!(settings.analysis.primary_partner, "CHN");
        assert_eq!(settings.periods.baseline_end, 2017);
        assert_eq!(settings.periods.intervention_end, 2024);
        assert_eq!(settings.regions.get("xkx").or(settings.regions.get("XKX")), Some(&Region::Europe));
        assert_eq!(settings.sector_analysis.sectors.len(), 1);
        assert_eq!(settings.sector_analysis.years, vec![2019, 2024]);
        assert_eq!(settings.sensitivity.excluded_codes, vec!["30", "90"]);
        assert_eq!(settings.sensitivity.alternative_excluded_codes.len(), 11);
        assert_eq!(settings.validation.exempt_years, vec![2009, 2020]);
        assert_eq!(settings.validation.max_yoy_change, 50.0);
        assert!(settings.validate().is_ok());
    }
}
