use crate::error::TableError;
use crate::loader::{self, LoadOptions, LoadReport};
use crate::shares::PartnerShareMap;
use core_types::{FlowDirection, ProductCode, ProductMatch, TradeRecord, normalize_iso3};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

/// The immutable trade-record set for one analysis run.
///
/// Records are held sorted by year so that every per-year view scans only
/// its own slice. All views are pure projections over that slice.
///
/// Values are non-negative and each year's total fits a `Decimal`, so any
/// per-year sum, and the difference of two such sums, is exact.
#[derive(Debug, Clone)]
pub struct TradeTable {
    subject: String,
    records: Vec<TradeRecord>,
}

impl TradeTable {
    /// Builds a table for `subject` (the importing country under study).
    ///
    /// Fails on a negative value, or when a year's values cannot be summed
    /// without overflowing.
    pub fn new(subject: &str, mut records: Vec<TradeRecord>) -> Result<Self, TableError> {
        let subject = normalize_iso3(subject)?;
        records.sort_by_key(|r| r.year);
        check_year_totals(&records)?;
        Ok(Self { subject, records })
    }

    /// Loads and validates a CSV extract from disk.
    pub fn from_path(
        path: impl AsRef<Path>,
        subject: &str,
        options: &LoadOptions,
    ) -> Result<(Self, LoadReport), TableError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file, subject, options)
    }

    /// Loads and validates a CSV extract from any reader.
    pub fn from_reader<R: Read>(
        reader: R,
        subject: &str,
        options: &LoadOptions,
    ) -> Result<(Self, LoadReport), TableError> {
        let (records, report) = loader::read_records(reader, options)?;
        Ok((Self::new(subject, records)?, report))
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Distinct years present in the table, ascending.
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    /// Row count per flow direction.
    pub fn flow_distribution(&self) -> BTreeMap<FlowDirection, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.flow).or_insert(0) += 1;
        }
        counts
    }

    fn year_slice(&self, year: i32) -> &[TradeRecord] {
        let start = self.records.partition_point(|r| r.year < year);
        let end = self.records.partition_point(|r| r.year <= year);
        &self.records[start..end]
    }

    fn scope(&self, year: Option<i32>) -> &[TradeRecord] {
        match year {
            Some(y) => self.year_slice(y),
            None => &self.records,
        }
    }

    /// Rows recording the subject's imports: the subject is the partner of
    /// an exporting reporter.
    pub fn subject_imports(&self, year: Option<i32>) -> impl Iterator<Item = &TradeRecord> + '_ {
        self.scope(year)
            .iter()
            .filter(move |r| r.partner == self.subject && r.flow == FlowDirection::Export)
    }

    /// Rows recording the subject's own exports to `partner` in `year`.
    pub fn subject_exports_to<'a>(
        &'a self,
        partner: &'a str,
        year: i32,
    ) -> impl Iterator<Item = &'a TradeRecord> + 'a {
        self.year_slice(year).iter().filter(move |r| {
            r.reporter == self.subject && r.partner == partner && r.flow == FlowDirection::Export
        })
    }

    /// The subject's imports in `year` outside every `excluded` code. Codes
    /// match by prefix, so a chapter excludes all of its headings.
    pub fn subject_imports_excluding<'a>(
        &'a self,
        year: i32,
        excluded: &'a [ProductCode],
    ) -> impl Iterator<Item = &'a TradeRecord> + 'a {
        self.subject_imports(Some(year)).filter(move |r| {
            !excluded
                .iter()
                .any(|code| ProductMatch::Prefix.matches(&r.product, code))
        })
    }

    pub fn subject_import_count(&self, year: i32) -> usize {
        self.subject_imports(Some(year)).count()
    }

    pub fn total_subject_imports(&self, year: i32) -> Decimal {
        self.subject_imports(Some(year)).map(|r| r.value).sum()
    }

    /// The subject's imports from `partner` in `year`.
    pub fn imports_from(&self, partner: &str, year: i32) -> Decimal {
        self.subject_imports(Some(year))
            .filter(|r| r.reporter == partner)
            .map(|r| r.value)
            .sum()
    }

    /// The subject's exports to `partner` in `year`.
    pub fn exports_to(&self, partner: &str, year: i32) -> Decimal {
        self.subject_exports_to(partner, year).map(|r| r.value).sum()
    }

    /// Imports minus exports with `partner`; positive means a deficit.
    pub fn bilateral_deficit(&self, year: i32, partner: &str) -> Decimal {
        self.imports_from(partner, year) - self.exports_to(partner, year)
    }

    /// Total import value per supplying partner.
    pub fn partner_totals(&self, year: i32) -> BTreeMap<String, Decimal> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for record in self.subject_imports(Some(year)) {
            *totals.entry(record.reporter.clone()).or_default() += record.value;
        }
        totals
    }

    /// Percentage share of the year's imports per supplying partner.
    ///
    /// Returns an empty map when the year's total is zero.
    pub fn partner_shares(&self, year: i32) -> PartnerShareMap {
        let totals = self.partner_totals(year);
        let total: Decimal = totals.values().copied().sum();
        if total.is_zero() {
            return PartnerShareMap::default();
        }

        let shares = totals
            .into_iter()
            .map(|(partner, value)| {
                let share = (value / total * Decimal::ONE_HUNDRED)
                    .to_f64()
                    .unwrap_or(0.0);
                (partner, share)
            })
            .collect();
        PartnerShareMap::new(shares)
    }

    /// The subject's imports of `code` in `year`.
    pub fn product_imports(&self, code: &ProductCode, year: i32, matching: ProductMatch) -> Decimal {
        self.subject_imports(Some(year))
            .filter(|r| matching.matches(&r.product, code))
            .map(|r| r.value)
            .sum()
    }

    /// Number of distinct suppliers per imported product code.
    pub fn suppliers_per_product(&self, year: i32) -> BTreeMap<ProductCode, usize> {
        let mut suppliers: BTreeMap<&ProductCode, HashSet<&str>> = BTreeMap::new();
        for record in self.subject_imports(Some(year)) {
            suppliers
                .entry(&record.product)
                .or_default()
                .insert(record.reporter.as_str());
        }
        suppliers
            .into_iter()
            .map(|(code, set)| (code.clone(), set.len()))
            .collect()
    }
}

/// Walks the year-sorted records once, summing each year with checked adds.
fn check_year_totals(records: &[TradeRecord]) -> Result<(), TableError> {
    let mut current: Option<(i32, Decimal)> = None;
    for record in records {
        if record.value.is_sign_negative() && !record.value.is_zero() {
            return Err(TableError::NegativeValue { year: record.year });
        }
        let running = match current {
            Some((year, total)) if year == record.year => total,
            _ => Decimal::ZERO,
        };
        let total = running
            .checked_add(record.value)
            .ok_or(TableError::ValueOverflow { year: record.year })?;
        current = Some((record.year, total));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(reporter: &str, partner: &str, flow: FlowDirection, product: &str, year: i32, value: Decimal) -> TradeRecord {
        TradeRecord {
            reporter: reporter.to_string(),
            partner: partner.to_string(),
            flow,
            product: ProductCode::parse(product).unwrap(),
            year,
            value,
        }
    }

    fn sample() -> TradeTable {
        let records = vec![
            record("CHN", "IND", FlowDirection::Export, "84", 2019, dec!(70)),
            record("USA", "IND", FlowDirection::Export, "84", 2019, dec!(20)),
            record("USA", "IND", FlowDirection::Export, "8471", 2019, dec!(5)),
            record("DEU", "IND", FlowDirection::Export, "85", 2019, dec!(5)),
            // The subject's own exports and a mirror import row.
            record("IND", "CHN", FlowDirection::Export, "85", 2019, dec!(15)),
            record("CHN", "IND", FlowDirection::Import, "85", 2019, dec!(999)),
            record("CHN", "IND", FlowDirection::Export, "84", 2020, dec!(40)),
        ];
        TradeTable::new("ind", records).unwrap()
    }

    #[test]
    fn subject_imports_apply_reporter_inversion() {
        let table = sample();
        assert_eq!(table.subject(), "IND");
        assert_eq!(table.subject_import_count(2019), 4);
        assert_eq!(table.total_subject_imports(2019), dec!(100));
        assert_eq!(table.subject_imports(None).count(), 5);
        assert_eq!(table.imports_from("CHN", 2019), dec!(70));
    }

    #[test]
    fn partner_shares_sum_to_hundred() {
        let shares = sample().partner_shares(2019);
        assert_eq!(shares.get("CHN"), 70.0);
        assert_eq!(shares.get("USA"), 25.0);
        assert!((shares.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn partner_shares_empty_for_missing_year() {
        assert!(sample().partner_shares(2005).is_empty());
    }

    #[test]
    fn product_imports_exact_and_prefix() {
        let table = sample();
        let machinery = ProductCode::parse("84").unwrap();
        assert_eq!(table.product_imports(&machinery, 2019, ProductMatch::Exact), dec!(90));
        assert_eq!(table.product_imports(&machinery, 2019, ProductMatch::Prefix), dec!(95));
    }

    #[test]
    fn excluded_chapters_drop_their_headings() {
        let table = sample();
        let machinery = [ProductCode::parse("84").unwrap()];
        let kept: Vec<_> = table
            .subject_imports_excluding(2019, &machinery)
            .map(|r| r.reporter.as_str())
            .collect();
        assert_eq!(kept, vec!["DEU"]);
        assert_eq!(table.subject_imports_excluding(2019, &[]).count(), 4);
    }

    #[test]
    fn deficit_nets_subject_exports() {
        assert_eq!(sample().bilateral_deficit(2019, "CHN"), dec!(55));
    }

    #[test]
    fn suppliers_are_counted_per_product() {
        let suppliers = sample().suppliers_per_product(2019);
        assert_eq!(suppliers[&ProductCode::parse("84").unwrap()], 2);
        assert_eq!(suppliers[&ProductCode::parse("85").unwrap()], 1);
    }

    #[test]
    fn year_total_overflow_is_rejected() {
        let huge = Decimal::from_scientific("5e28").unwrap();
        let records = vec![
            record("CHN", "IND", FlowDirection::Export, "84", 2019, huge),
            record("USA", "IND", FlowDirection::Export, "84", 2019, huge),
        ];
        match TradeTable::new("IND", records) {
            Err(TableError::ValueOverflow { year }) => assert_eq!(year, 2019),
            other => panic!("expected an overflow error, got {other:?}"),
        }
    }

    #[test]
    fn large_values_in_separate_years_are_accepted() {
        let huge = Decimal::from_scientific("5e28").unwrap();
        let records = vec![
            record("CHN", "IND", FlowDirection::Export, "84", 2019, huge),
            record("CHN", "IND", FlowDirection::Export, "84", 2020, huge),
        ];
        let table = TradeTable::new("IND", records).unwrap();
        assert_eq!(table.total_subject_imports(2020), huge);
    }

    #[test]
    fn negative_values_are_rejected() {
        let records = vec![record("CHN", "IND", FlowDirection::Export, "84", 2019, dec!(-1))];
        assert!(matches!(
            TradeTable::new("IND", records),
            Err(TableError::NegativeValue { year: 2019 })
        ));
    }

    #[test]
    fn years_and_flows_are_reported() {
        let table = sample();
        assert_eq!(table.years().into_iter().collect::<Vec<_>>(), vec![2019, 2020]);
        assert_eq!(table.flow_distribution()[&FlowDirection::Import], 1);
    }
}
