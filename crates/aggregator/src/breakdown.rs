use core_types::{Period, Region};
use serde::Serialize;

/// A tracked partner's share of the subject's imports in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerShareRow {
    pub year: i32,
    pub period: Period,
    pub partner_iso: String,
    pub partner_name: String,
    /// Percentage of the year's imports; 0 when the partner is absent.
    pub import_share: f64,
}

/// Vulnerability of one strategic sector in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorRow {
    pub year: i32,
    pub sector_code: String,
    pub sector_name: String,
    pub criticality: f64,
    pub vulnerability: f64,
    pub has_data: bool,
}

/// A region's share of the subject's imports in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionShareRow {
    pub year: i32,
    pub region: Region,
    pub import_share: f64,
}
