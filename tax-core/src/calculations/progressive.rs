//! Progressive (marginal) income tax over an ordered bracket table.
//!
//! # Algorithm
//!
//! For every bracket whose lower bound the income strictly exceeds, the
//! income slice `min(upper, income) - lower` is taxed at the bracket's rate.
//! The slices are summed unrounded and the total is rounded up once to a
//! whole currency unit.
//!
//! | Condition                     | Effect                                   |
//! |-------------------------------|------------------------------------------|
//! | `income <= lower_bound`       | bracket skipped, absent from breakdown   |
//! | `income > upper_bound`        | slice clamped to `upper - lower`         |
//! | `income == upper_bound`       | slice is the full bracket (inclusive)    |
//! | `income <= 0`                 | every bracket skipped, tax is zero       |
//!
//! Per-bracket amounts in the breakdown are not rounded, so they may sum to
//! up to one unit less than `total_tax`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::ProgressiveTax;
//! use tax_core::{TaxBracket, UpperBound};
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0), UpperBound::Bounded(dec!(18200)), dec!(0), "Tax-free threshold"),
//!     TaxBracket::new(dec!(18200), UpperBound::Bounded(dec!(45000)), dec!(0.19), "19% tax rate"),
//!     TaxBracket::new(dec!(45000), UpperBound::Bounded(dec!(120000)), dec!(0.325), "32.5% tax rate"),
//!     TaxBracket::new(dec!(120000), UpperBound::Bounded(dec!(180000)), dec!(0.37), "37% tax rate"),
//!     TaxBracket::new(dec!(180000), UpperBound::Unbounded, dec!(0.45), "45% tax rate"),
//! ];
//!
//! let engine = ProgressiveTax::new(&brackets);
//! assert_eq!(engine.compute_tax(dec!(96200)), dec!(21732));
//!
//! let result = engine.compute_breakdown(dec!(96200));
//! assert_eq!(result.total_tax, dec!(21732));
//! assert_eq!(result.breakdown.len(), 3);
//! ```

use rust_decimal::Decimal;
use tracing::trace;

use crate::calculations::common::round_up_whole;
use crate::models::{BracketContribution, CalculationResult, TaxBracket};

/// Tax engine over a borrowed, ascending bracket table.
///
/// Brackets are expected sorted by `lower_bound` with the last one
/// unbounded. The engine does not check this; see
/// [`validate_brackets`](crate::calculations::validate_brackets).
#[derive(Debug, Clone, Copy)]
pub struct ProgressiveTax<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> ProgressiveTax<'a> {
    pub fn new(brackets: &'a [TaxBracket]) -> Self {
        Self { brackets }
    }

    /// Tax owed on `income`, rounded up to a whole currency unit.
    pub fn compute_tax(&self, income: Decimal) -> Decimal {
        let raw: Decimal = self.contributions(income).map(|c| c.tax_amount).sum();
        round_up_whole(raw)
    }

    /// Tax owed on `income` together with each bracket's unrounded share.
    pub fn compute_breakdown(&self, income: Decimal) -> CalculationResult {
        let breakdown: Vec<BracketContribution> = self.contributions(income).collect();
        let raw: Decimal = breakdown.iter().map(|c| c.tax_amount).sum();

        CalculationResult {
            total_tax: round_up_whole(raw),
            breakdown,
        }
    }

    /// Yields a contribution for every bracket the income reaches, in
    /// table order.
    fn contributions(&self, income: Decimal) -> impl Iterator<Item = BracketContribution> {
        let brackets = self.brackets;

        brackets
            .iter()
            .filter(move |bracket| income > bracket.lower_bound)
            .filter_map(move |bracket| {
                let taxable_amount = Self::taxable_in_bracket(bracket, income);
                if taxable_amount <= Decimal::ZERO {
                    return None;
                }

                let tax_amount = taxable_amount * bracket.rate;
                trace!(
                    bracket = %bracket.description,
                    %taxable_amount,
                    %tax_amount,
                    "bracket contribution"
                );

                Some(BracketContribution {
                    description: bracket.description.clone(),
                    taxable_amount,
                    tax_amount,
                    rate: bracket.rate,
                })
            })
    }

    /// Portion of `income` that falls inside `bracket`.
    fn taxable_in_bracket(bracket: &TaxBracket, income: Decimal) -> Decimal {
        bracket.upper_bound.clamp(income) - bracket.lower_bound
    }
}

/// Tax owed on `income` under `brackets`, rounded up to a whole unit.
///
/// Shorthand for [`ProgressiveTax::compute_tax`].
pub fn compute_tax(brackets: &[TaxBracket], income: Decimal) -> Decimal {
    ProgressiveTax::new(brackets).compute_tax(income)
}

/// Tax owed on `income` under `brackets` with its per-bracket breakdown.
///
/// Shorthand for [`ProgressiveTax::compute_breakdown`].
pub fn compute_breakdown(brackets: &[TaxBracket], income: Decimal) -> CalculationResult {
    ProgressiveTax::new(brackets).compute_breakdown(income)
}
