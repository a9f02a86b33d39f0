//! Ingestion boundary tests: header handling, row rejection and the
//! product-code padding rule, all driven through `TradeTable::from_reader`.

use rust_decimal_macros::dec;
use trade_table::{LoadOptions, ProductMatch, TableError, TradeTable};

const EPS: f64 = 1e-9;

const EXTRACT: &str = "\
 ReporterISO3 ,PartnerISO3, TradeFlowName ,ProductCode,Year, TradeValue in 1000 USD ,ReporterName
CHN,IND,Export,84,2019,700,China
USA,IND,Export,84,2019,200,United States
DEU,IND,Export,1,2019,100,Germany
IND,CHN,Export,85,2019,150,India
CHN,IND,Import,85,2019,999,China
";

fn load(csv: &str, strict: bool) -> Result<(TradeTable, trade_table::LoadReport), TableError> {
    TradeTable::from_reader(csv.as_bytes(), "IND", &LoadOptions { strict })
}

#[test]
fn headers_are_trimmed_and_extra_columns_ignored() {
    let (table, report) = load(EXTRACT, false).unwrap();
    assert_eq!(report.rows_read, 5);
    assert_eq!(report.rows_loaded, 5);
    assert_eq!(report.rows_rejected, 0);
    assert_eq!(table.len(), 5);
    assert_eq!(table.total_subject_imports(2019), dec!(1000));
}

#[test]
fn unpadded_codes_are_normalized_at_ingestion() {
    let (table, _) = load(EXTRACT, false).unwrap();
    let live_animals = "01".parse().unwrap();
    assert_eq!(table.product_imports(&live_animals, 2019, ProductMatch::Exact), dec!(100));
}

#[test]
fn shares_follow_loaded_values() {
    let (table, _) = load(EXTRACT, false).unwrap();
    let shares = table.partner_shares(2019);
    assert!((shares.get("CHN") - 70.0).abs() < EPS);
    assert!((shares.total() - 100.0).abs() < EPS);
}

#[test]
fn float_rendered_codes_and_years_are_read_as_integers() {
    let csv = "\
ReporterISO3,PartnerISO3,TradeFlowName,ProductCode,Year,TradeValue in 1000 USD
CHN,IND,Export,84.00,2019.00,10
USA,IND,Export,1.000,2019.0,5
";
    let (table, report) = load(csv, false).unwrap();
    assert_eq!(report.rows_rejected, 0);
    let machinery = "84".parse().unwrap();
    let live_animals = "01".parse().unwrap();
    assert_eq!(table.product_imports(&machinery, 2019, ProductMatch::Exact), dec!(10));
    assert_eq!(table.product_imports(&live_animals, 2019, ProductMatch::Exact), dec!(5));
}

#[test]
fn missing_required_column_is_fatal() {
    let csv = "ReporterISO3,PartnerISO3,TradeFlowName,ProductCode,Year\nCHN,IND,Export,84,2019\n";
    match load(csv, false) {
        Err(TableError::MissingColumn(name)) => assert_eq!(name, "TradeValue in 1000 USD"),
        other => panic!("expected a missing column error, got {other:?}"),
    }
}

#[test]
fn column_aliases_are_accepted() {
    let csv = "ReporterISO3,PartnerISO3,TradeFlow,ProductCode,Year,TradeValueThousandUSD\nCHN,IND,Export,84,2019,10\n";
    let (table, report) = load(csv, false).unwrap();
    assert_eq!(report.rows_loaded, 1);
    assert_eq!(table.imports_from("CHN", 2019), dec!(10));
}

#[test]
fn bad_rows_are_skipped_and_counted() {
    let csv = "\
ReporterISO3,PartnerISO3,TradeFlowName,ProductCode,Year,TradeValue in 1000 USD
CHN,IND,Export,84,2019,10
,IND,Export,84,2019,10
USA,IND,Export,84,20x9,10
USA,IND,Export,84,2019,abc
USA,IND,Export,84,2019,-5
US,IND,Export,84,2019,5
JPN,IND,Export,84,2019,1.5e2
";
    let (table, report) = load(csv, false).unwrap();
    assert_eq!(report.rows_read, 7);
    assert_eq!(report.rows_loaded, 2);
    assert_eq!(report.rows_rejected, 5);
    assert_eq!(report.rejections["missing reporter"], 1);
    assert_eq!(report.rejections["invalid year"], 1);
    assert_eq!(report.rejections["invalid trade value"], 1);
    assert_eq!(report.rejections["negative trade value"], 1);
    assert_eq!(report.rejections["invalid reporter code"], 1);
    assert_eq!(table.imports_from("JPN", 2019), dec!(150));
}

#[test]
fn strict_mode_fails_on_first_bad_row() {
    let csv = "\
ReporterISO3,PartnerISO3,TradeFlowName,ProductCode,Year,TradeValue in 1000 USD
CHN,IND,Export,84,2019,10
CHN,IND,Export,,2019,10
";
    match load(csv, true) {
        Err(TableError::InvalidRow { line, reason }) => {
            assert_eq!(line, 3);
            assert_eq!(reason, "missing product code");
        }
        other => panic!("expected an invalid row error, got {other:?}"),
    }
}

#[test]
fn empty_extract_yields_empty_views() {
    let csv = "ReporterISO3,PartnerISO3,TradeFlowName,ProductCode,Year,TradeValue in 1000 USD\n";
    let (table, report) = load(csv, false).unwrap();
    assert!(table.is_empty());
    assert_eq!(report.rows_read, 0);
    assert!(table.partner_shares(2019).is_empty());
    assert_eq!(table.subject_import_count(2019), 0);
}

#[test]
fn year_totals_beyond_decimal_range_fail_the_load() {
    let csv = "\
ReporterISO3,PartnerISO3,TradeFlowName,ProductCode,Year,TradeValue in 1000 USD
CHN,IND,Export,84,2019,5e28
USA,IND,Export,84,2019,5e28
";
    match load(csv, false) {
        Err(TableError::ValueOverflow { year }) => assert_eq!(year, 2019),
        other => panic!("expected an overflow error, got {other:?}"),
    }
}
