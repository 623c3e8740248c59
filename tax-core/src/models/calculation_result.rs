use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The share of a calculation attributed to a single bracket.
///
/// Amounts are unrounded; only [`CalculationResult::total_tax`] is rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketContribution {
    pub description: String,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Whole currency units, rounded up once from the summed contributions.
    pub total_tax: Decimal,
    /// Contributions in ascending bracket order. Only brackets with a
    /// positive taxable amount appear.
    pub breakdown: Vec<BracketContribution>,
}

impl CalculationResult {
    /// Sum of the unrounded per-bracket tax amounts.
    ///
    /// `total_tax - raw_total()` is always in `[0, 1)`.
    pub fn raw_total(&self) -> Decimal {
        self.breakdown.iter().map(|c| c.tax_amount).sum()
    }
}
