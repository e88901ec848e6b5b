//! Rule of 78 (sum-of-the-digits) amortization schedules.
//!
//! A fixed total finance charge is spread over the months in proportion to the number of
//! months remaining: with `n` months, month `m` carries `(n - m + 1) / (n(n+1)/2)` of the
//! charge. Interest is therefore front-loaded compared to an even split.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ScheduleError, ScheduleInconsistency, ScheduleWarning};
use crate::money::{Money, round2};

/// Longest term a schedule is built for: 100 years of monthly payments.
pub const MAX_TERM_MONTHS: u32 = 1200;

/// One month of a Rule of 78 schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based month number.
    pub month: u32,
    /// Balance owed before this month's payment.
    pub start_balance: Money,
    /// This month's share of the finance charge.
    pub interest: Money,
    pub principal: Money,
    /// Balance carried into the next month; exactly `0.00` after the final month.
    pub end_balance: Money,
}

/// A complete month-by-month schedule together with the inputs it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub number_of_months: u32,
    /// `n(n+1)/2`, the denominator of every monthly interest share.
    pub sum_of_digits: u64,
    /// The finance charge actually allocated, rounded to cents (negative input is clamped
    /// to 0).
    pub total_finance_charge: Money,
    pub rows: Vec<ScheduleRow>,
    pub warnings: Vec<ScheduleWarning>,
}

impl Schedule {
    /// Sum of the interest column.
    pub fn total_interest(&self) -> Money {
        self.rows.iter().map(|row| row.interest).sum()
    }

    /// Sum of the principal column.
    pub fn total_principal(&self) -> Money {
        self.rows.iter().map(|row| row.principal).sum()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// Checks the structural invariants a built schedule always satisfies: one row per
    /// month numbered from 1, the expected sum of digits and a continuous balance chain.
    ///
    /// Schedules can be deserialized from host data, so consumers check this before
    /// trusting the rows.
    pub fn check_consistency(&self) -> Result<(), ScheduleInconsistency> {
        if self.number_of_months == 0 {
            return Err(ScheduleInconsistency::NoMonths);
        }
        if self.number_of_months > MAX_TERM_MONTHS {
            return Err(ScheduleInconsistency::TermTooLong {
                number_of_months: self.number_of_months,
            });
        }
        if self.rows.len() != self.number_of_months as usize {
            return Err(ScheduleInconsistency::RowCount {
                rows: self.rows.len(),
                number_of_months: self.number_of_months,
            });
        }
        if self.sum_of_digits != sum_of_digits(self.number_of_months) {
            return Err(ScheduleInconsistency::SumOfDigits {
                sum_of_digits: self.sum_of_digits,
                number_of_months: self.number_of_months,
            });
        }
        for (index, row) in self.rows.iter().enumerate() {
            if row.month as usize != index + 1 {
                return Err(ScheduleInconsistency::MonthLabel {
                    position: index + 1,
                    month: row.month,
                });
            }
        }
        for pair in self.rows.windows(2) {
            if pair[0].end_balance != pair[1].start_balance {
                return Err(ScheduleInconsistency::BrokenChain {
                    month: pair[0].month,
                });
            }
        }
        Ok(())
    }
}

/// `n(n+1)/2`, computed without overflowing for any `u32` term.
pub fn sum_of_digits(number_of_months: u32) -> u64 {
    let n = u64::from(number_of_months);
    if n % 2 == 0 { (n / 2) * (n + 1) } else { n * ((n + 1) / 2) }
}

fn record(warnings: &mut Vec<ScheduleWarning>, warning: ScheduleWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}

/// Builds the Rule of 78 schedule for a flat-rate loan.
///
/// Every figure is rounded to cents as soon as it is computed, so the interest column can
/// drift from the finance charge by a few cents; drift beyond `max(0.01, n * 0.005)` is
/// reported as a warning rather than an error.
///
/// The final month pays off the remaining balance whenever the standard payment covers it.
/// Its interest column always shows the rule-based share `1 / sum_of_digits` of the charge.
///
/// # Arguments
///
/// * `loan_amount` - The principal borrowed.
/// * `number_of_months` - The term in months.
/// * `total_finance_charge` - Interest due over the full term.
/// * `monthly_payment` - The fixed payment made every month.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidInput` for a non-positive loan, payment or term,
/// `ScheduleError::TermTooLong` beyond [`MAX_TERM_MONTHS`], `ScheduleError::AmountTooLarge`
/// when the totals do not fit a `Decimal`, and `ScheduleError::BalanceDivergence` if the
/// running balance falls below -1.00.
pub fn build_schedule(
    loan_amount: Money,
    number_of_months: u32,
    total_finance_charge: Money,
    monthly_payment: Money,
) -> Result<Schedule, ScheduleError> {
    if loan_amount <= Decimal::ZERO || monthly_payment <= Decimal::ZERO || number_of_months == 0 {
        return Err(ScheduleError::InvalidInput {
            loan_amount,
            monthly_payment,
            number_of_months,
        });
    }
    if number_of_months > MAX_TERM_MONTHS {
        return Err(ScheduleError::TermTooLong {
            number_of_months,
            max_months: MAX_TERM_MONTHS,
        });
    }

    let mut warnings = Vec::new();
    let mut finance_charge = total_finance_charge;
    if finance_charge < Decimal::ZERO {
        record(
            &mut warnings,
            ScheduleWarning::NegativeFinanceCharge { finance_charge },
        );
        finance_charge = Decimal::ZERO;
    }

    let months = Decimal::from(number_of_months);
    let digits = sum_of_digits(number_of_months);
    let digits_dec = Decimal::from(digits);
    let too_large = || ScheduleError::AmountTooLarge {
        loan_amount,
        monthly_payment,
    };
    let scheduled_total = monthly_payment.checked_mul(months).ok_or_else(too_large)?;
    let total_due = loan_amount.checked_add(finance_charge).ok_or_else(too_large)?;
    // Every interest share and the payoff rebate multiply the charge by at most the digits.
    finance_charge.checked_mul(digits_dec).ok_or_else(too_large)?;
    if scheduled_total < total_due - Decimal::ONE {
        record(
            &mut warnings,
            ScheduleWarning::PaymentsBelowTotalDue {
                scheduled_total,
                total_due,
            },
        );
    }

    let mut balance = loan_amount;
    let mut accumulated_interest = Decimal::ZERO;
    let mut rows = Vec::with_capacity(number_of_months as usize);

    for month in 1..=number_of_months {
        let start_balance = round2(balance);
        let is_last_month = month == number_of_months;

        // The last month's share is 1 / sum_of_digits, the rule-based figure, even when
        // the payment plug leaves a different amount of interest.
        let remaining = Decimal::from(number_of_months - month + 1);
        let mut interest = if finance_charge > Decimal::ZERO {
            round2(finance_charge * remaining / digits_dec)
        } else {
            Decimal::ZERO
        };

        let principal = if is_last_month {
            if monthly_payment < start_balance - dec!(0.005) {
                let adjusted = round2(monthly_payment - interest).max(Decimal::ZERO);
                record(
                    &mut warnings,
                    ScheduleWarning::FinalPaymentInsufficient {
                        payment: monthly_payment,
                        remaining_balance: start_balance,
                        principal: adjusted,
                    },
                );
                adjusted
            } else {
                start_balance
            }
        } else {
            if interest > monthly_payment {
                record(
                    &mut warnings,
                    ScheduleWarning::PrincipalClamped {
                        month,
                        interest,
                        payment: monthly_payment,
                    },
                );
                interest = monthly_payment;
            }
            round2(monthly_payment - interest)
        };

        let mut end_balance = round2(start_balance - principal);
        if is_last_month && end_balance.abs() < dec!(0.01) {
            end_balance = dec!(0.00);
        }

        rows.push(ScheduleRow {
            month,
            start_balance,
            interest,
            principal,
            end_balance,
        });
        accumulated_interest += interest;
        balance = end_balance;

        if balance < dec!(-1) {
            return Err(ScheduleError::BalanceDivergence { month, balance });
        }
    }

    let accumulated = round2(accumulated_interest);
    let tolerance = dec!(0.01).max(months * dec!(0.005));
    if finance_charge > Decimal::ZERO && (accumulated - finance_charge).abs() > tolerance {
        record(
            &mut warnings,
            ScheduleWarning::ToleranceExceeded {
                accumulated,
                finance_charge,
                tolerance,
            },
        );
    }

    debug!(
        months = number_of_months,
        sum_of_digits = digits,
        warnings = warnings.len(),
        "built rule of 78 schedule"
    );

    Ok(Schedule {
        loan_amount,
        monthly_payment,
        number_of_months,
        sum_of_digits: digits,
        total_finance_charge: round2(finance_charge),
        rows,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn twelve_month_schedule() -> Schedule {
        build_schedule(dec!(12000), 12, dec!(780), dec!(1065)).unwrap()
    }

    #[rstest]
    #[case(1, 1)]
    #[case(3, 6)]
    #[case(12, 78)]
    #[case(84, 3570)]
    fn test_sum_of_digits(#[case] months: u32, #[case] expected: u64) {
        assert_eq!(sum_of_digits(months), expected);
    }

    #[test]
    fn test_sum_of_digits_does_not_overflow() {
        let n = u64::from(u32::MAX);
        assert_eq!(sum_of_digits(u32::MAX), n * ((n + 1) / 2));
    }

    #[test]
    fn test_build_schedule_first_month() {
        let schedule = twelve_month_schedule();
        let first = &schedule.rows[0];

        assert_eq!(schedule.sum_of_digits, 78);
        assert_eq!(first.month, 1);
        assert_eq!(first.start_balance, dec!(12000.00));
        assert_eq!(first.interest, dec!(120.00));
        assert_eq!(first.principal, dec!(945.00));
        assert_eq!(first.end_balance, dec!(11055.00));
        assert!(schedule.warnings.is_empty(), "{:?}", schedule.warnings);
    }

    #[test]
    fn test_build_schedule_last_month_clears_balance() {
        let schedule = twelve_month_schedule();
        let last = schedule.rows.last().unwrap();

        assert_eq!(last.month, 12);
        assert_eq!(last.start_balance, dec!(1055.00));
        assert_eq!(last.interest, dec!(10.00));
        assert_eq!(last.principal, dec!(1055.00));
        assert_eq!(last.end_balance.to_string(), "0.00");
        assert_eq!(schedule.total_principal(), dec!(12000));
        assert_eq!(schedule.total_interest(), dec!(780));
        assert!(schedule.check_consistency().is_ok());
    }

    #[test]
    fn test_build_schedule_clamps_principal_when_interest_exceeds_payment() {
        let schedule = build_schedule(dec!(1000), 3, dec!(60), dec!(10)).unwrap();
        let first = &schedule.rows[0];

        assert_eq!(first.interest, dec!(10.00));
        assert_eq!(first.principal, dec!(0.00));
        assert!(schedule.warnings.iter().any(|w| matches!(
            w,
            ScheduleWarning::PrincipalClamped { month: 1, .. }
        )));
        assert!(schedule.warnings.iter().any(|w| matches!(
            w,
            ScheduleWarning::FinalPaymentInsufficient { .. }
        )));
        assert!(schedule.warnings.iter().any(|w| matches!(
            w,
            ScheduleWarning::ToleranceExceeded { .. }
        )));
    }

    #[rstest]
    #[case(dec!(-5), 12, dec!(1065))]
    #[case(dec!(0), 12, dec!(1065))]
    #[case(dec!(12000), 0, dec!(1065))]
    #[case(dec!(12000), 12, dec!(0))]
    fn test_build_schedule_rejects_invalid_input(
        #[case] loan: Decimal,
        #[case] months: u32,
        #[case] payment: Decimal,
    ) {
        let result = build_schedule(loan, months, dec!(780), payment);
        assert!(matches!(result, Err(ScheduleError::InvalidInput { .. })));
    }

    #[test]
    fn test_build_schedule_negative_finance_charge_is_clamped() {
        let schedule = build_schedule(dec!(1200), 12, dec!(-50), dec!(100)).unwrap();

        assert_eq!(schedule.total_finance_charge, Decimal::ZERO);
        assert_eq!(
            schedule.warnings,
            vec![ScheduleWarning::NegativeFinanceCharge {
                finance_charge: dec!(-50)
            }]
        );
        assert!(schedule.rows.iter().all(|row| row.interest.is_zero()));
        assert_eq!(schedule.rows.last().unwrap().end_balance, Decimal::ZERO);
    }

    #[test]
    fn test_build_schedule_aborts_on_negative_balance() {
        // Each payment retires far more than the balance.
        let result = build_schedule(dec!(100), 3, dec!(0), dec!(500));
        assert_eq!(
            result,
            Err(ScheduleError::BalanceDivergence {
                month: 1,
                balance: dec!(-400.00)
            })
        );
    }

    #[test]
    fn test_build_schedule_warns_when_payments_fall_short() {
        let schedule = build_schedule(dec!(1200), 12, dec!(0), dec!(90)).unwrap();

        assert!(matches!(
            schedule.warnings[0],
            ScheduleWarning::PaymentsBelowTotalDue { .. }
        ));
        assert_eq!(schedule.warning_messages().len(), schedule.warnings.len());
    }

    #[test]
    fn test_check_consistency_detects_broken_chain() {
        let mut schedule = twelve_month_schedule();
        schedule.rows[4].start_balance += dec!(1);
        assert_eq!(
            schedule.check_consistency(),
            Err(ScheduleInconsistency::BrokenChain { month: 4 })
        );

        let mut truncated = twelve_month_schedule();
        truncated.rows.pop();
        assert_eq!(
            truncated.check_consistency(),
            Err(ScheduleInconsistency::RowCount {
                rows: 11,
                number_of_months: 12
            })
        );

        let mut relabelled = twelve_month_schedule();
        relabelled.rows[2].month = 7;
        assert_eq!(
            relabelled.check_consistency(),
            Err(ScheduleInconsistency::MonthLabel {
                position: 3,
                month: 7
            })
        );
    }

    #[test]
    fn test_build_schedule_stores_charge_in_cents() {
        let schedule = build_schedule(dec!(10001), 24, dec!(666.66666), dec!(444)).unwrap();

        assert_eq!(schedule.total_finance_charge, dec!(666.67));
        // 24 of 300 digits.
        assert_eq!(schedule.rows[0].interest, dec!(53.33));
    }

    #[test]
    fn test_build_schedule_rejects_term_beyond_limit() {
        assert_eq!(
            build_schedule(dec!(12000), MAX_TERM_MONTHS + 1, dec!(780), dec!(1065)),
            Err(ScheduleError::TermTooLong {
                number_of_months: 1201,
                max_months: 1200
            })
        );
        assert_eq!(
            build_schedule(dec!(12000), u32::MAX, dec!(780), dec!(1065)),
            Err(ScheduleError::TermTooLong {
                number_of_months: u32::MAX,
                max_months: 1200
            })
        );
        assert!(build_schedule(dec!(120000), MAX_TERM_MONTHS, dec!(0), dec!(100)).is_ok());
    }

    #[test]
    fn test_build_schedule_rejects_amounts_that_overflow() {
        let result = build_schedule(Decimal::MAX, 12, dec!(780), Decimal::MAX);
        assert!(matches!(result, Err(ScheduleError::AmountTooLarge { .. })));

        let result = build_schedule(dec!(12000), 12, Decimal::MAX / dec!(10), dec!(1065));
        assert!(matches!(result, Err(ScheduleError::AmountTooLarge { .. })));
    }
}
