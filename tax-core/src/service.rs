//! Year-aware calculation on top of a [`TaxRateRepository`].

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::ProgressiveTax;
use crate::db::{RepositoryError, TaxRateRepository};
use crate::models::{CalculationResult, IncomeYear, TaxAssessment, TaxBracket};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculatorError {
    #[error("Tax year {year} is not supported. Supported years: {}", SupportedYears(.supported))]
    UnsupportedYear {
        year: IncomeYear,
        supported: Vec<IncomeYear>,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

struct SupportedYears<'a>(&'a [IncomeYear]);

impl fmt::Display for SupportedYears<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        for (i, year) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{year}")?;
        }
        Ok(())
    }
}

/// Looks up a year's bracket table and runs the progressive engine over it.
#[derive(Clone, Copy)]
pub struct TaxCalculator<'r> {
    repo: &'r dyn TaxRateRepository,
}

impl<'r> TaxCalculator<'r> {
    pub fn new(repo: &'r dyn TaxRateRepository) -> Self {
        Self { repo }
    }

    pub async fn supported_years(&self) -> Result<Vec<IncomeYear>, CalculatorError> {
        Ok(self.repo.list_income_years().await?)
    }

    pub async fn is_year_supported(&self, year: &IncomeYear) -> Result<bool, CalculatorError> {
        Ok(self.repo.is_year_supported(year).await?)
    }

    /// Total tax for `income` in `year`, rounded up to a whole dollar.
    pub async fn calculate_tax(
        &self,
        year: &IncomeYear,
        income: Decimal,
    ) -> Result<Decimal, CalculatorError> {
        let brackets = self.brackets(year).await?;
        Ok(ProgressiveTax::new(&brackets).compute_tax(income))
    }

    pub async fn tax_breakdown(
        &self,
        year: &IncomeYear,
        income: Decimal,
    ) -> Result<CalculationResult, CalculatorError> {
        let brackets = self.brackets(year).await?;
        Ok(ProgressiveTax::new(&brackets).compute_breakdown(income))
    }

    /// Breakdown plus the derived after-tax income and effective rate.
    pub async fn assess(
        &self,
        year: &IncomeYear,
        income: Decimal,
    ) -> Result<TaxAssessment, CalculatorError> {
        let result = self.tax_breakdown(year, income).await?;
        debug!(%year, %income, tax = %result.total_tax, "assessed income");
        Ok(TaxAssessment::new(year.clone(), income, result))
    }

    async fn brackets(&self, year: &IncomeYear) -> Result<Vec<TaxBracket>, CalculatorError> {
        match self.repo.get_tax_brackets(year).await {
            Ok(brackets) => Ok(brackets),
            Err(RepositoryError::NotFound) => Err(CalculatorError::UnsupportedYear {
                year: year.clone(),
                supported: self.repo.list_income_years().await?,
            }),
            Err(err) => Err(err.into()),
        }
    }
}
