use async_trait::async_trait;
use thiserror::Error;

use crate::calculations::BracketError;
use crate::models::{IncomeYear, TaxBracket, TaxBracketRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid tax brackets: {0}")]
    InvalidBrackets(#[from] BracketError),
}

/// Persistent source of bracket tables, keyed by income year.
///
/// Implementations return brackets in ascending income order and store the
/// unbounded top bracket however they like, as long as it reads back as
/// [`UpperBound::Unbounded`](crate::models::UpperBound::Unbounded).
#[async_trait]
pub trait TaxRateRepository: Send + Sync {
    // Reads
    /// The year's brackets ordered by position. [`RepositoryError::NotFound`]
    /// when the year has no rows.
    async fn get_tax_brackets(
        &self,
        year: &IncomeYear,
    ) -> Result<Vec<TaxBracket>, RepositoryError>;

    /// Every income year with at least one bracket, ascending, no duplicates.
    async fn list_income_years(&self) -> Result<Vec<IncomeYear>, RepositoryError>;

    async fn is_year_supported(&self, year: &IncomeYear) -> Result<bool, RepositoryError>;

    /// Stored rows ordered by year then position, optionally for one year only.
    async fn list_bracket_records(
        &self,
        year: Option<&IncomeYear>,
    ) -> Result<Vec<TaxBracketRecord>, RepositoryError>;

    // Writes
    /// Validates `brackets` and atomically replaces the year's table with
    /// them, numbering positions from 1. Returns the number of rows written.
    async fn replace_tax_year(
        &self,
        year: &IncomeYear,
        brackets: &[TaxBracket],
    ) -> Result<usize, RepositoryError>;

    /// Removes the year's table. `false` when there was nothing to remove.
    async fn delete_tax_year(&self, year: &IncomeYear) -> Result<bool, RepositoryError>;

    /// Overwrites a single stored bracket in place.
    async fn update_tax_bracket(
        &self,
        id: i64,
        bracket: &TaxBracket,
    ) -> Result<TaxBracketRecord, RepositoryError>;

    // Health
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::validate_brackets;

    #[test]
    fn bracket_error_converts_into_invalid_brackets() {
        let err: RepositoryError = validate_brackets(&[]).unwrap_err().into();

        assert_eq!(err, RepositoryError::InvalidBrackets(BracketError::Empty));
    }

    #[test]
    fn display_messages_carry_detail() {
        assert_eq!(
            RepositoryError::Database("disk I/O error".to_string()).to_string(),
            "Database error: disk I/O error"
        );

        let err = RepositoryError::InvalidBrackets(BracketError::RateOutOfRange {
            index: 0,
            description: "Flat".to_string(),
            rate: dec!(2),
        });
        assert!(err.to_string().starts_with("Invalid tax brackets: bracket 0"));
    }
}
