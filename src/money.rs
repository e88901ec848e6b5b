//! Decimal aliases and the rounding rules shared by every calculator.

use rust_decimal::{Decimal, RoundingStrategy};

/// A currency amount. Never negative once a configuration has been validated.
pub type Money = Decimal;

/// A percentage expressed as a whole number (e.g., 2.48 for 2.48%).
pub type Percent = Decimal;

/// Rounds to cents, half away from zero.
///
/// Every schedule step is rounded with this as soon as it is computed; totals are
/// never rounded once at the end.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest whole currency unit, half away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1.005), dec!(1.01))]
    #[case(dec!(-1.005), dec!(-1.01))]
    #[case(dec!(119.999999), dec!(120.00))]
    #[case(dec!(2.344), dec!(2.34))]
    fn test_round2_half_away_from_zero(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round2(input), expected);
    }

    #[rstest]
    #[case(dec!(1064.5), dec!(1065))]
    #[case(dec!(1064.49), dec!(1064))]
    #[case(dec!(-0.5), dec!(-1))]
    fn test_round_whole(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_whole(input), expected);
    }
}
