//! In-memory [`TaxRateRepository`] for unit tests in this crate.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use super::repository::{RepositoryError, TaxRateRepository};
use crate::calculations::validate_brackets;
use crate::models::{IncomeYear, TaxBracket, TaxBracketRecord, UpperBound};

pub(crate) fn year(s: &str) -> IncomeYear {
    IncomeYear::parse(s).unwrap()
}

/// 2020-2021 resident rates with contiguous bounds.
pub(crate) fn resident_brackets() -> Vec<TaxBracket> {
    vec![
        TaxBracket::new(dec!(0), UpperBound::Bounded(dec!(18200)), dec!(0), "Tax-free threshold"),
        TaxBracket::new(dec!(18200), UpperBound::Bounded(dec!(45000)), dec!(0.19), "19% tax rate"),
        TaxBracket::new(dec!(45000), UpperBound::Bounded(dec!(120000)), dec!(0.325), "32.5% tax rate"),
        TaxBracket::new(dec!(120000), UpperBound::Bounded(dec!(180000)), dec!(0.37), "37% tax rate"),
        TaxBracket::new(dec!(180000), UpperBound::Unbounded, dec!(0.45), "45% tax rate"),
    ]
}

#[derive(Default)]
pub(crate) struct MemoryRepository {
    years: Mutex<BTreeMap<IncomeYear, Vec<TaxBracket>>>,
    /// When set, every call fails with this error.
    failure: Option<RepositoryError>,
}

impl MemoryRepository {
    pub(crate) fn with_year(year: IncomeYear, brackets: Vec<TaxBracket>) -> Self {
        let repo = Self::default();
        repo.years.lock().unwrap().insert(year, brackets);
        repo
    }

    pub(crate) fn failing(error: RepositoryError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RepositoryError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn record(year: &IncomeYear, order: usize, bracket: &TaxBracket) -> TaxBracketRecord {
        let stamp = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        TaxBracketRecord {
            id: order as i64,
            income_year: year.clone(),
            bracket_order: order as i32,
            bracket: bracket.clone(),
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

#[async_trait]
impl TaxRateRepository for MemoryRepository {
    async fn get_tax_brackets(
        &self,
        year: &IncomeYear,
    ) -> Result<Vec<TaxBracket>, RepositoryError> {
        self.check()?;
        self.years
            .lock()
            .unwrap()
            .get(year)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_income_years(&self) -> Result<Vec<IncomeYear>, RepositoryError> {
        self.check()?;
        Ok(self.years.lock().unwrap().keys().cloned().collect())
    }

    async fn is_year_supported(&self, year: &IncomeYear) -> Result<bool, RepositoryError> {
        self.check()?;
        Ok(self.years.lock().unwrap().contains_key(year))
    }

    async fn list_bracket_records(
        &self,
        year: Option<&IncomeYear>,
    ) -> Result<Vec<TaxBracketRecord>, RepositoryError> {
        self.check()?;
        let years = self.years.lock().unwrap();
        Ok(years
            .iter()
            .filter(|(y, _)| year.is_none_or(|wanted| wanted == *y))
            .flat_map(|(y, brackets)| {
                brackets
                    .iter()
                    .enumerate()
                    .map(move |(i, b)| Self::record(y, i + 1, b))
            })
            .collect())
    }

    async fn replace_tax_year(
        &self,
        year: &IncomeYear,
        brackets: &[TaxBracket],
    ) -> Result<usize, RepositoryError> {
        self.check()?;
        validate_brackets(brackets)?;
        self.years
            .lock()
            .unwrap()
            .insert(year.clone(), brackets.to_vec());
        Ok(brackets.len())
    }

    async fn delete_tax_year(&self, year: &IncomeYear) -> Result<bool, RepositoryError> {
        self.check()?;
        Ok(self.years.lock().unwrap().remove(year).is_some())
    }

    async fn update_tax_bracket(
        &self,
        _id: i64,
        _bracket: &TaxBracket,
    ) -> Result<TaxBracketRecord, RepositoryError> {
        self.check()?;
        Err(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check()
    }
}
