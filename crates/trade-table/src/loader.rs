use crate::error::TableError;
use core_types::{FlowDirection, ProductCode, TradeRecord, normalize_iso3, strip_zero_fraction};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;

/// Canonical header names, with the aliases accepted for each.
const REPORTER: (&str, &[&str]) = ("ReporterISO3", &[]);
const PARTNER: (&str, &[&str]) = ("PartnerISO3", &[]);
const FLOW: (&str, &[&str]) = ("TradeFlowName", &["TradeFlow", "TradeFlowDirection"]);
const PRODUCT: (&str, &[&str]) = ("ProductCode", &[]);
const YEAR: (&str, &[&str]) = ("Year", &[]);
const VALUE: (&str, &[&str]) = ("TradeValue in 1000 USD", &["TradeValueThousandUSD"]);

const REQUIRED: [(&str, &[&str]); 6] = [REPORTER, PARTNER, FLOW, PRODUCT, YEAR, VALUE];

/// Number of rejected rows logged individually before only the summary is kept.
const LOGGED_REJECTIONS: usize = 5;

/// Options controlling how strictly the extract is ingested.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Fail on the first rejected row instead of skipping it.
    pub strict: bool,
}

/// Summary of an ingestion pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub rows_rejected: usize,
    /// Rejected-row counts keyed by reason.
    pub rejections: BTreeMap<String, usize>,
}

/// A CSV row before validation. Every field is optional so that absence can
/// be reported per row instead of aborting the whole file.
#[derive(Debug, Deserialize)]
struct RawTradeRow {
    #[serde(rename = "ReporterISO3")]
    reporter: Option<String>,
    #[serde(rename = "PartnerISO3")]
    partner: Option<String>,
    #[serde(rename = "TradeFlowName", alias = "TradeFlow", alias = "TradeFlowDirection")]
    flow: Option<String>,
    #[serde(rename = "ProductCode")]
    product: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "TradeValue in 1000 USD", alias = "TradeValueThousandUSD")]
    value: Option<String>,
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str, String> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing {name}")),
    }
}

fn parse_year(raw: &str) -> Result<i32, String> {
    strip_zero_fraction(raw)
        .parse::<i32>()
        .map_err(|_| "invalid year".to_string())
}

fn parse_value(raw: &str) -> Result<Decimal, String> {
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| "invalid trade value".to_string())?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err("negative trade value".to_string());
    }
    Ok(value)
}

impl RawTradeRow {
    /// Validates the raw cells into a typed record.
    fn into_record(self) -> Result<TradeRecord, String> {
        let reporter = normalize_iso3(required(&self.reporter, "reporter")?)
            .map_err(|_| "invalid reporter code".to_string())?;
        let partner = normalize_iso3(required(&self.partner, "partner")?)
            .map_err(|_| "invalid partner code".to_string())?;
        let flow = FlowDirection::from_label(required(&self.flow, "trade flow")?);
        let product = ProductCode::parse(required(&self.product, "product code")?)
            .map_err(|_| "invalid product code".to_string())?;
        let year = parse_year(required(&self.year, "year")?)?;
        let value = parse_value(required(&self.value, "trade value")?)?;

        Ok(TradeRecord {
            reporter,
            partner,
            flow,
            product,
            year,
            value,
        })
    }
}

/// Verifies that every required column (or one of its aliases) is present.
fn check_headers(headers: &StringRecord) -> Result<(), TableError> {
    for (name, aliases) in REQUIRED {
        let present = headers
            .iter()
            .any(|h| h == name || aliases.contains(&h));
        if !present {
            return Err(TableError::MissingColumn(name));
        }
    }
    Ok(())
}

/// Reads and validates every row of a CSV extract.
///
/// Header whitespace is trimmed before matching. Rows with absent or
/// malformed required cells are rejected: skipped and counted, or fatal when
/// `options.strict` is set.
pub(crate) fn read_records<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<(Vec<TradeRecord>, LoadReport), TableError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    check_headers(&headers)?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for (index, row) in rdr.deserialize::<RawTradeRow>().enumerate() {
        report.rows_read += 1;
        // Line 1 is the header.
        let line = index as u64 + 2;

        let outcome = match row {
            Ok(raw) => raw.into_record(),
            Err(e) if options.strict => return Err(TableError::Csv(e)),
            Err(_) => Err("malformed row".to_string()),
        };

        match outcome {
            Ok(record) => {
                records.push(record);
                report.rows_loaded += 1;
            }
            Err(reason) => {
                if options.strict {
                    return Err(TableError::InvalidRow { line, reason });
                }
                if report.rows_rejected < LOGGED_REJECTIONS {
                    tracing::warn!(line, %reason, "Rejected trade row.");
                }
                report.rows_rejected += 1;
                *report.rejections.entry(reason).or_insert(0) += 1;
            }
        }
    }

    tracing::info!(
        rows_read = report.rows_read,
        rows_loaded = report.rows_loaded,
        rows_rejected = report.rows_rejected,
        "Loaded trade records."
    );

    Ok((records, report))
}
