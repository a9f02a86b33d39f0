use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized HS product code.
///
/// Extracts carry codes both as zero-padded strings (`"01"`) and as bare
/// integers (`1`, sometimes `1.0`). Every code is normalized once, at
/// ingestion, so that sector filters can rely on exact or prefix matches:
///
/// * surrounding whitespace and a zero fraction (`.0`, `.00`, `.`) are removed;
/// * purely numeric codes are left-padded with `0` to the next even width,
///   minimum two digits (`"1"` -> `"01"`, `"101"` -> `"0101"`);
/// * anything else (e.g. `TOTAL`) is upper-cased and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductCode(String);

impl ProductCode {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = strip_zero_fraction(raw.trim());

        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput(
                "product_code".to_string(),
                format!("'{raw}' is empty"),
            ));
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            let mut width = trimmed.len().max(2);
            width += width % 2;
            return Ok(Self(format!("{trimmed:0>width$}")));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidInput(
                "product_code".to_string(),
                format!("'{raw}' contains whitespace"),
            ));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `self` rolls up into `prefix` (e.g. `8471` under `84`).
    pub fn starts_with(&self, prefix: &ProductCode) -> bool {
        self.0.starts_with(prefix.as_str())
    }
}

/// Drops the all-zero fraction a float rendering leaves on an integer
/// (`"84.00"` -> `"84"`). Anything else is returned unchanged.
pub fn strip_zero_fraction(raw: &str) -> &str {
    match raw.split_once('.') {
        Some((whole, fraction)) if !whole.is_empty() && fraction.bytes().all(|b| b == b'0') => whole,
        _ => raw,
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductCode> for String {
    fn from(code: ProductCode) -> Self {
        code.0
    }
}

/// How a product-code filter is compared against a record's code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductMatch {
    /// The record's code must equal the filter.
    #[default]
    Exact,
    /// The record's code must start with the filter (HS roll-ups).
    Prefix,
}

impl ProductMatch {
    pub fn matches(self, code: &ProductCode, filter: &ProductCode) -> bool {
        match self {
            ProductMatch::Exact => code == filter,
            ProductMatch::Prefix => code.starts_with(filter),
        }
    }
}

/// Validates and upper-cases an ISO 3166-1 alpha-3 country code.
pub fn normalize_iso3(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::InvalidInput(
            "iso3".to_string(),
            format!("'{raw}' is not a three-letter code"),
        ));
    }
    Ok(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> String {
        ProductCode::parse(raw).unwrap().as_str().to_string()
    }

    #[test]
    fn numeric_codes_are_padded_to_even_width() {
        assert_eq!(code("1"), "01");
        assert_eq!(code("84"), "84");
        assert_eq!(code(" 7 "), "07");
        assert_eq!(code("101"), "0101");
        assert_eq!(code("8471"), "8471");
        assert_eq!(code("10121"), "010121");
    }

    #[test]
    fn float_artefacts_are_stripped() {
        assert_eq!(code("84.0"), "84");
        assert_eq!(code("1.0"), "01");
    }

    #[test]
    fn any_zero_fraction_is_stripped() {
        assert_eq!(code("84.00"), "84");
        assert_eq!(code("1.000"), "01");
        assert_eq!(code("8471."), "8471");
        assert_eq!(code(" 101.0000 "), "0101");
    }

    #[test]
    fn non_zero_fractions_are_kept() {
        assert_eq!(strip_zero_fraction("84.5"), "84.5");
        assert_eq!(strip_zero_fraction(".0"), ".0");
    }

    #[test]
    fn non_numeric_codes_are_uppercased() {
        assert_eq!(code("total"), "TOTAL");
    }

    #[test]
    fn empty_codes_are_rejected() {
        assert!(ProductCode::parse("   ").is_err());
        assert!(ProductCode::parse("8 4").is_err());
    }

    #[test]
    fn prefix_rollup() {
        let machinery = ProductCode::parse("84").unwrap();
        assert!(ProductCode::parse("8471").unwrap().starts_with(&machinery));
        assert!(!ProductCode::parse("8501").unwrap().starts_with(&machinery));
    }

    #[test]
    fn iso3_codes_are_validated() {
        assert_eq!(normalize_iso3(" chn").unwrap(), "CHN");
        assert!(normalize_iso3("CN").is_err());
        assert!(normalize_iso3("C1N").is_err());
    }
}
