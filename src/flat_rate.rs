//! Flat-rate loan arithmetic.
//!
//! Total interest is computed once as `principal * rate * years`, added to the
//! principal and split evenly into fixed monthly payments.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::money::{Money, Percent, round_whole};

/// Calculates the fixed monthly payment of a flat-rate loan, rounded to whole currency units.
///
/// A non-positive loan amount degrades to `loan_amount / months` instead of failing, and a
/// zero-year term yields 0. A negative rate is treated as 0%.
///
/// # Arguments
///
/// * `loan_amount` - The principal borrowed.
/// * `annual_rate_percent` - The flat annual rate as a percentage (e.g., 2.48 for 2.48%).
/// * `term_years` - The loan term in whole years.
pub fn monthly_payment(loan_amount: Money, annual_rate_percent: Percent, term_years: u32) -> Money {
    if term_years == 0 {
        return Decimal::ZERO;
    }
    let months = Decimal::from(term_years) * dec!(12);
    if loan_amount <= Decimal::ZERO {
        return loan_amount / months;
    }

    let annual_rate = annual_rate_percent.max(Decimal::ZERO) / dec!(100);
    let total_interest = loan_amount * annual_rate * Decimal::from(term_years);
    round_whole((loan_amount + total_interest) / months)
}

/// Calculates the total finance charge (interest over the whole term), unrounded.
///
/// Returns 0 for a non-positive loan, a negative rate or a zero-year term.
pub fn total_finance_charge(
    loan_amount: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> Money {
    if loan_amount <= Decimal::ZERO || annual_rate_percent < Decimal::ZERO || term_years == 0 {
        return Decimal::ZERO;
    }
    loan_amount * (annual_rate_percent / dec!(100)) * Decimal::from(term_years)
}

/// Loan-to-price ratio as a percentage, 0 when the price is 0.
pub fn loan_percentage(loan_amount: Money, price: Money) -> Percent {
    if price.is_zero() {
        return Decimal::ZERO;
    }
    loan_amount / price * dec!(100)
}

/// The whole-unit loan that finances `target_percent` of `price`, or 0 unless both are positive.
pub fn loan_for_target_percent(price: Money, target_percent: Percent) -> Money {
    if price > Decimal::ZERO && target_percent > Decimal::ZERO {
        round_whole(price * (target_percent / dec!(100)))
    } else {
        Decimal::ZERO
    }
}
