use core_types::Region;
use std::collections::HashMap;

/// Default primary dependency partner.
pub const DEFAULT_PRIMARY_PARTNER: &str = "CHN";

/// Default "plus one" set: advanced and regional suppliers whose share gains
/// count as diversification away from the primary partner.
pub const DEFAULT_ALTERNATIVE_PARTNERS: [&str; 10] = [
    "USA", "JPN", "DEU", "SGP", "KOR", "ARE", "AUS", "GBR", "FRA", "ITA",
];

/// An immutable ISO3 -> macro-region lookup.
///
/// Codes absent from the table classify as `Region::Unknown`; they are never
/// dropped from a regional aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMap {
    regions: HashMap<String, Region>,
}

impl RegionMap {
    pub fn new(regions: HashMap<String, Region>) -> Self {
        Self { regions }
    }

    /// The built-in world table.
    pub fn world() -> Self {
        let groups: [(&[&str], Region); 8] = [
            (SOUTH_ASIA, Region::SouthAsia),
            (EAST_ASIA_PACIFIC, Region::EastAsiaPacific),
            (EUROPE, Region::Europe),
            (AMERICAS, Region::Americas),
            (MENA, Region::Mena),
            (SUB_SAHARAN_AFRICA, Region::SubSaharanAfrica),
            (RUSSIA_CENTRAL_ASIA, Region::RussiaCentralAsia),
            (ANTARCTIC, Region::Antarctic),
        ];

        let regions = groups
            .iter()
            .flat_map(|(codes, region)| codes.iter().map(move |code| (code.to_string(), *region)))
            .collect();
        Self { regions }
    }

    /// Returns a copy of the map with `overrides` applied on top.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, Region)>,
    {
        for (code, region) in overrides {
            self.regions.insert(code.to_ascii_uppercase(), region);
        }
        self
    }

    pub fn classify(&self, iso3: &str) -> Region {
        self.regions.get(iso3).copied().unwrap_or(Region::Unknown)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Constant reference data the engine is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    /// The partner whose dependency is being tracked.
    pub primary_partner: String,
    /// Default alternative suppliers for the diversification score.
    pub alternative_partners: Vec<String>,
    pub region_map: RegionMap,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            primary_partner: DEFAULT_PRIMARY_PARTNER.to_string(),
            alternative_partners: DEFAULT_ALTERNATIVE_PARTNERS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            region_map: RegionMap::world(),
        }
    }
}

// --- World region table ---

const SOUTH_ASIA: &[&str] = &["AFG", "BGD", "BTN", "IND", "MDV", "NPL", "PAK", "LKA"];

const EAST_ASIA_PACIFIC: &[&str] = &[
    "ASM", "AUS", "BRN", "KHM", "CHN", "CXR", "CCK", "COK", "FJI", "PYF", "GUM", "HKG",
    "IDN", "JPN", "KIR", "PRK", "KOR", "LAO", "MAC", "MYS", "MHL", "FSM", "MNG", "MMR",
    "NRU", "NCL", "NZL", "NIU", "NFK", "MNP", "PLW", "PNG", "PHL", "PCN", "WSM", "SGP",
    "SLB", "TWN", "THA", "TLS", "TKL", "TON", "TUV", "VUT", "VNM", "WLF",
];

const EUROPE: &[&str] = &[
    "ALB", "AND", "AUT", "BEL", "BIH", "BGR", "HRV", "CYP", "CZE", "DNK", "EST", "FRO",
    "FIN", "FRA", "DEU", "GIB", "GRC", "GGY", "VAT", "HUN", "ISL", "IRL", "IMN", "ITA",
    "JEY", "LVA", "LIE", "LTU", "LUX", "MLT", "MDA", "MCO", "MNE", "NLD", "MKD", "NOR",
    "POL", "PRT", "ROU", "SMR", "SRB", "SVK", "SVN", "ESP", "SJM", "SWE", "CHE", "UKR",
    "GBR", "ALA",
];

// UMI (US Minor Outlying Islands) is grouped with the Americas.
const AMERICAS: &[&str] = &[
    "AIA", "ATG", "ARG", "ABW", "BHS", "BRB", "BLZ", "BMU", "BOL", "BES", "BRA", "VGB",
    "CAN", "CYM", "CHL", "COL", "CRI", "CUB", "CUW", "DMA", "DOM", "ECU", "SLV", "FLK",
    "GUF", "GRL", "GRD", "GLP", "GTM", "GUY", "HTI", "HND", "JAM", "MTQ", "MEX", "MSR",
    "NIC", "PAN", "PRY", "PER", "PRI", "BLM", "KNA", "LCA", "MAF", "SPM", "VCT", "SXM",
    "SUR", "TTO", "TCA", "USA", "URY", "VEN", "VIR", "UMI",
];

const MENA: &[&str] = &[
    "DZA", "BHR", "EGY", "IRN", "IRQ", "ISR", "JOR", "KWT", "LBN", "LBY", "MAR", "OMN",
    "PSE", "QAT", "SAU", "SYR", "TUN", "TUR", "ARE", "YEM",
];

const SUB_SAHARAN_AFRICA: &[&str] = &[
    "AGO", "BEN", "BWA", "BFA", "BDI", "CPV", "CMR", "CAF", "TCD", "COM", "COG", "COD",
    "CIV", "DJI", "GNQ", "ERI", "SWZ", "ETH", "GAB", "GMB", "GHA", "GIN", "GNB", "KEN",
    "LSO", "LBR", "MDG", "MWI", "MLI", "MRT", "MUS", "MYT", "MOZ", "NAM", "NER", "NGA",
    "REU", "RWA", "SHN", "STP", "SEN", "SYC", "SLE", "SOM", "ZAF", "SSD", "SDN", "TZA",
    "TGO", "UGA", "ZMB", "ZWE",
];

const RUSSIA_CENTRAL_ASIA: &[&str] = &[
    "ARM", "AZE", "BLR", "GEO", "KAZ", "KGZ", "RUS", "TJK", "TKM", "UZB",
];

const ANTARCTIC: &[&str] = &["ATA", "BVT", "HMD", "ATF", "SGS"];
