use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Why an income entry was refused.
#[derive(Debug, Error)]
pub enum IncomeInputError {
    #[error("income is required")]
    Empty,

    #[error(transparent)]
    NotANumber(#[from] ParseDecimalError),

    #[error("income cannot be negative: {0}")]
    Negative(Decimal),
}

/// Trims whitespace, a leading `$` and comma thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a taxable income entry: a non-negative amount, commas allowed.
pub fn parse_income(s: &str) -> Result<Decimal, IncomeInputError> {
    if s.trim().is_empty() {
        return Err(IncomeInputError::Empty);
    }
    let income = parse_decimal(s)?;
    if income < Decimal::ZERO {
        return Err(IncomeInputError::Negative(income));
    }
    // "-0" parses with the sign bit set; clear it so the income echoes as 0, not -0.
    Ok(income.abs())
}

/// `y`, `yes`, `Y`... anything starting with y.
pub fn is_affirmative(s: &str) -> bool {
    s.trim().to_lowercase().starts_with('y')
}
