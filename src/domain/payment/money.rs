//! Currency codes and minor-unit amounts.
//!
//! The processor transmits amounts as integers in the currency's smallest
//! denomination. Converting to a decimal major-unit value requires the
//! ISO 4217 minor-unit exponent of the currency: 2 for most currencies,
//! 0 for zero-decimal currencies such as `jpy`, and 3 for `kwd` and friends.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

const ZERO_DECIMAL: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

const THREE_DECIMAL: &[&str] = &["bhd", "jod", "kwd", "omr", "tnd"];

const TWO_DECIMAL: &[&str] = &[
    "aed", "afn", "all", "amd", "ang", "aoa", "ars", "aud", "awg", "azn", "bam", "bbd", "bdt",
    "bgn", "bmd", "bnd", "bob", "brl", "bsd", "bwp", "byn", "bzd", "cad", "cdf", "chf", "cny",
    "cop", "crc", "cve", "czk", "dkk", "dop", "dzd", "egp", "etb", "eur", "fjd", "fkp", "gbp",
    "gel", "gip", "gmd", "gtq", "gyd", "hkd", "hnl", "htg", "huf", "idr", "ils", "inr", "jmd",
    "kes", "kgs", "khr", "kyd", "kzt", "lak", "lbp", "lkr", "lrd", "lsl", "mad", "mdl", "mkd",
    "mmk", "mnt", "mop", "mur", "mvr", "mwk", "mxn", "myr", "mzn", "nad", "ngn", "nio", "nok",
    "npr", "nzd", "pab", "pen", "pgk", "php", "pkr", "pln", "qar", "ron", "rsd", "rub", "sar",
    "sbd", "scr", "sek", "sgd", "shp", "sle", "sos", "srd", "szl", "thb", "tjs", "top", "try",
    "ttd", "twd", "tzs", "uah", "usd", "uyu", "uzs", "wst", "xcd", "yer", "zar", "zmw",
];

/// Supported currency codes mapped to their minor-unit exponent.
static MINOR_UNIT_EXPONENTS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for code in ZERO_DECIMAL {
        map.insert(*code, 0);
    }
    for code in TWO_DECIMAL {
        map.insert(*code, 2);
    }
    for code in THREE_DECIMAL {
        map.insert(*code, 3);
    }
    map
});

/// A supported ISO 4217 currency code, normalized to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parses a currency code, accepting any letter case.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the code is empty or not supported.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let normalized = code.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if !MINOR_UNIT_EXPONENTS.contains_key(normalized.as_str()) {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("unsupported currency code '{}'", code.trim()),
            ));
        }
        Ok(Self(normalized))
    }

    /// Returns the lower-case code as sent to and received from the processor.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Number of decimal places between the minor and major unit.
    pub fn minor_unit_exponent(&self) -> u32 {
        MINOR_UNIT_EXPONENTS
            .get(self.0.as_str())
            .copied()
            .unwrap_or(2)
    }

    /// Converts a minor-unit integer into a decimal major-unit amount.
    pub fn to_major_units(&self, minor: i64) -> Decimal {
        Decimal::new(minor, self.minor_unit_exponent())
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive amount in a currency's minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Creates a positive minor-unit amount.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::not_positive_integer("amount", value));
        }
        Ok(Self(value))
    }

    /// Validates an untyped JSON value as a positive integer.
    ///
    /// Floats (including `25.0`), strings, booleans and null are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        match value {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Self::new(v),
                None => Err(ValidationError::not_positive_integer("amount", n)),
            },
            serde_json::Value::Null => Err(ValidationError::empty_field("amount")),
            other => Err(ValidationError::not_positive_integer("amount", other)),
        }
    }

    /// Returns the raw integer value.
    pub fn value(&self) -> i64 {
        self.0
    }
}
