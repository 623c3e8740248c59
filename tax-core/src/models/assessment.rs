use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BracketContribution, CalculationResult, IncomeYear};

/// A tax calculation packaged for presentation: the rounded tax, what is
/// left after tax, the effective rate and the per-bracket breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAssessment {
    pub income: Decimal,
    pub income_year: IncomeYear,
    pub tax: Decimal,
    pub after_tax_income: Decimal,
    /// `tax / income`, or zero when income is not positive.
    pub effective_rate: Decimal,
    pub breakdown: Vec<BracketContribution>,
}

impl TaxAssessment {
    pub fn new(income_year: IncomeYear, income: Decimal, result: CalculationResult) -> Self {
        let tax = result.total_tax;
        let effective_rate = if income > Decimal::ZERO {
            tax / income
        } else {
            Decimal::ZERO
        };

        Self {
            income,
            income_year,
            tax,
            after_tax_income: income - tax,
            effective_rate,
            breakdown: result.breakdown,
        }
    }
}
