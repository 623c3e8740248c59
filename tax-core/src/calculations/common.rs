//! Rounding helpers shared by the engine and its callers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value up to the next whole currency unit.
///
/// This is the ceiling used for the final tax figure: any fractional amount,
/// however small, adds a whole unit. Values that are already whole are left
/// unchanged.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_up_whole;
///
/// assert_eq!(round_up_whole(dec!(0.38)), dec!(1));
/// assert_eq!(round_up_whole(dec!(100.1)), dec!(101));
/// assert_eq!(round_up_whole(dec!(21732.00)), dec!(21732));
/// ```
pub fn round_up_whole(value: Decimal) -> Decimal {
    value.ceil()
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Used for displaying unrounded breakdown amounts as cents; it never feeds
/// back into a tax total.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(16639.675)), dec!(16639.68));
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
