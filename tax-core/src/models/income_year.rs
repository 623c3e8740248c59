use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static INCOME_YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{4}$").expect("income year pattern is a valid regex")
});

/// Returned when a string is not a `YYYY-YYYY` income year.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid income year '{0}': expected format YYYY-YYYY (e.g. 2020-2021)")]
pub struct ParseIncomeYearError(pub String);

/// Identifier of a bracket table, e.g. `2020-2021`.
///
/// Lexical ordering of the identifier is chronological ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IncomeYear(String);

impl IncomeYear {
    pub fn parse(s: &str) -> Result<Self, ParseIncomeYearError> {
        let trimmed = s.trim();
        if INCOME_YEAR_PATTERN.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ParseIncomeYearError(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncomeYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IncomeYear {
    type Err = ParseIncomeYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IncomeYear {
    type Error = ParseIncomeYearError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IncomeYear> for String {
    fn from(year: IncomeYear) -> Self {
        year.0
    }
}
