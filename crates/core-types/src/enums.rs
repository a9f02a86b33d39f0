use serde::{Deserialize, Serialize};
use std::fmt;

/// The direction of a trade flow, always relative to the reporting country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlowDirection {
    Export,
    Import,
    ReExport,
    ReImport,
    Other,
}

impl FlowDirection {
    /// Parses a flow label as it appears in trade extracts.
    ///
    /// Unrecognised labels map to `Other` so that the row is kept but never
    /// matched by the import/export views.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "export" | "exports" | "grossexp" => FlowDirection::Export,
            "import" | "imports" | "grossimp" => FlowDirection::Import,
            "reexport" | "reexports" => FlowDirection::ReExport,
            "reimport" | "reimports" => FlowDirection::ReImport,
            _ => FlowDirection::Other,
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowDirection::Export => "Export",
            FlowDirection::Import => "Import",
            FlowDirection::ReExport => "Re-Export",
            FlowDirection::ReImport => "Re-Import",
            FlowDirection::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Macro-regions used by the geographic-diversity sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "South Asia", alias = "south_asia")]
    SouthAsia,
    #[serde(rename = "East Asia & Pacific", alias = "east_asia_pacific")]
    EastAsiaPacific,
    #[serde(rename = "Europe", alias = "europe")]
    Europe,
    #[serde(rename = "Americas", alias = "americas")]
    Americas,
    #[serde(rename = "MENA", alias = "mena")]
    Mena,
    #[serde(rename = "Sub-Saharan Africa", alias = "sub_saharan_africa")]
    SubSaharanAfrica,
    #[serde(rename = "Russia & Central Asia", alias = "russia_central_asia")]
    RussiaCentralAsia,
    #[serde(rename = "Antarctic", alias = "antarctic")]
    Antarctic,
    /// Bucket for partners absent from the region table.
    #[serde(rename = "Unknown", alias = "unknown")]
    Unknown,
}

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::SouthAsia => "South Asia",
            Region::EastAsiaPacific => "East Asia & Pacific",
            Region::Europe => "Europe",
            Region::Americas => "Americas",
            Region::Mena => "MENA",
            Region::SubSaharanAfrica => "Sub-Saharan Africa",
            Region::RussiaCentralAsia => "Russia & Central Asia",
            Region::Antarctic => "Antarctic",
            Region::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of the policy cutoff a year falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    Baseline,
    Intervention,
}

impl Period {
    /// Years up to and including `cutoff` are baseline years.
    pub fn for_year(year: i32, cutoff: i32) -> Self {
        if year <= cutoff {
            Period::Baseline
        } else {
            Period::Intervention
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Baseline => f.write_str("Baseline"),
            Period::Intervention => f.write_str("Intervention"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_labels_parse_loosely() {
        assert_eq!(FlowDirection::from_label(" Export "), FlowDirection::Export);
        assert_eq!(FlowDirection::from_label("Gross Exp."), FlowDirection::Export);
        assert_eq!(FlowDirection::from_label("IMPORT"), FlowDirection::Import);
        assert_eq!(FlowDirection::from_label("Re-Export"), FlowDirection::ReExport);
        assert_eq!(FlowDirection::from_label("Re-Import"), FlowDirection::ReImport);
        assert_eq!(FlowDirection::from_label("Transit"), FlowDirection::Other);
    }

    #[test]
    fn cutoff_year_belongs_to_baseline() {
        assert_eq!(Period::for_year(2019, 2019), Period::Baseline);
        assert_eq!(Period::for_year(2020, 2019), Period::Intervention);
        assert_eq!(Period::for_year(2007, 2019), Period::Baseline);
    }
}
