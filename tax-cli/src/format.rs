//! Human-readable money and rate strings.

use rust_decimal::{Decimal, RoundingStrategy};
use tax_core::BracketContribution;
use tax_core::UpperBound;
use tax_core::calculations::common::round_half_up;

/// `$1,234.56`: two decimals, half-up, comma-grouped thousands.
pub fn format_currency(amount: Decimal) -> String {
    let mut cents = round_half_up(amount);
    let negative = cents < Decimal::ZERO;
    cents = cents.abs();
    cents.rescale(2);

    let text = cents.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!(
        "{}${}.{}",
        if negative { "-" } else { "" },
        group_thousands(whole),
        fraction
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Marginal rate as a percentage: `0%` for a nil rate, otherwise one
/// decimal place (`19.0%`, `32.5%`).
pub fn format_rate(rate: Decimal) -> String {
    if rate.is_zero() {
        return "0%".to_string();
    }
    let mut percent =
        (rate * Decimal::ONE_HUNDRED).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    percent.rescale(1);
    format!("{percent}%")
}

pub fn format_upper_bound(upper: &UpperBound) -> String {
    match upper.value() {
        Some(value) => format_currency(value),
        None => "and over".to_string(),
    }
}

/// `19% tax rate: $26,800.00 × 19.0% = $5,092.00`
pub fn breakdown_line(contribution: &BracketContribution) -> String {
    format!(
        "{}: {} × {} = {}",
        contribution.description,
        format_currency(contribution.taxable_amount),
        format_rate(contribution.rate),
        format_currency(contribution.tax_amount)
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(999)), "$999.00");
        assert_eq!(format_currency(dec!(1000)), "$1,000.00");
        assert_eq!(format_currency(dec!(21732)), "$21,732.00");
        assert_eq!(format_currency(dec!(1234567.8)), "$1,234,567.80");
    }

    #[test]
    fn currency_rounds_half_up_to_cents() {
        assert_eq!(format_currency(dec!(16640.005)), "$16,640.01");
        assert_eq!(format_currency(dec!(5091.814)), "$5,091.81");
        assert_eq!(format_currency(dec!(24374.675)), "$24,374.68");
    }

    #[test]
    fn currency_negative_amounts() {
        assert_eq!(format_currency(dec!(-1500.5)), "-$1,500.50");
    }

    #[test]
    fn rate_formats() {
        assert_eq!(format_rate(dec!(0)), "0%");
        assert_eq!(format_rate(dec!(0.19)), "19.0%");
        assert_eq!(format_rate(dec!(0.325)), "32.5%");
        assert_eq!(format_rate(dec!(0.30)), "30.0%");
        assert_eq!(format_rate(dec!(0.45)), "45.0%");
    }

    #[test]
    fn upper_bound_formats() {
        assert_eq!(format_upper_bound(&UpperBound::Bounded(dec!(45000))), "$45,000.00");
        assert_eq!(format_upper_bound(&UpperBound::Unbounded), "and over");
    }

    #[test]
    fn breakdown_line_matches_console_layout() {
        let contribution = BracketContribution {
            description: "32.5% tax rate".to_string(),
            taxable_amount: dec!(51200),
            tax_amount: dec!(16640),
            rate: dec!(0.325),
        };

        assert_eq!(
            breakdown_line(&contribution),
            "32.5% tax rate: $51,200.00 × 32.5% = $16,640.00"
        );
    }
}
