use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{
    BracketError, IncomeYear, ParseIncomeYearError, RepositoryError, TaxBracket,
    TaxRateRepository, UpperBound, validate_brackets,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error(transparent)]
    InvalidIncomeYear(#[from] ParseIncomeYearError),

    #[error("Invalid brackets for {year}: {source}")]
    InvalidBrackets {
        year: IncomeYear,
        #[source]
        source: BracketError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a bracket CSV file.
///
/// - `income_year`: `YYYY-YYYY`, e.g. `2024-2025`
/// - `min_income`: lower bound of the bracket
/// - `max_income`: upper bound; empty (or `999999999.99`) for the top bracket
/// - `rate`: marginal rate as a fraction, e.g. `0.325`
/// - `description`: label shown in breakdowns
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRow {
    pub income_year: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
    pub description: String,
}

impl BracketRow {
    fn to_bracket(&self) -> TaxBracket {
        let upper_bound = match self.max_income {
            Some(max) => UpperBound::from_sentinel(max),
            None => UpperBound::Unbounded,
        };
        TaxBracket::new(self.min_income, upper_bound, self.rate, self.description.trim())
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket tables stored as CSV.
///
/// Works against any [`TaxRateRepository`], so the same file can be loaded
/// into whichever backend the caller opened.
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse rows from a CSV reader (a file, or a byte slice in tests).
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRow>, TaxBracketLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRow = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group `records` by income year and replace each year's table.
    ///
    /// Years are written in the order they first appear; rows keep their CSV
    /// order within a year. Every year is parsed and validated before any is
    /// written, and each year is replaced atomically, so loading the same
    /// file twice gives the same result.
    ///
    /// Returns the number of brackets written.
    pub async fn load<R: TaxRateRepository + ?Sized>(
        repo: &R,
        records: &[BracketRow],
    ) -> Result<usize, TaxBracketLoaderError> {
        let tables = Self::group_by_year(records)?;

        for (year, brackets) in &tables {
            validate_brackets(brackets).map_err(|source| TaxBracketLoaderError::InvalidBrackets {
                year: year.clone(),
                source,
            })?;
        }

        let mut inserted = 0;
        for (year, brackets) in &tables {
            inserted += repo.replace_tax_year(year, brackets).await?;
            debug!(%year, brackets = brackets.len(), "loaded income year");
        }

        info!(years = tables.len(), inserted, "loaded tax brackets");
        Ok(inserted)
    }

    fn group_by_year(
        records: &[BracketRow],
    ) -> Result<Vec<(IncomeYear, Vec<TaxBracket>)>, TaxBracketLoaderError> {
        let mut tables: Vec<(IncomeYear, Vec<TaxBracket>)> = Vec::new();

        for record in records {
            let year = IncomeYear::parse(&record.income_year)?;
            match tables.iter_mut().find(|(existing, _)| *existing == year) {
                Some((_, brackets)) => brackets.push(record.to_bracket()),
                None => tables.push((year, vec![record.to_bracket()])),
            }
        }

        Ok(tables)
    }
}
