//! Early payoff of a Rule of 78 loan.
//!
//! Paying off after `k` of `n` months settles the remaining scheduled payments minus the
//! unearned interest rebate, which is the finance charge share of the remaining months'
//! digits: `(r(r+1)/2) / (n(n+1)/2)` with `r = n - k`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PayoffError, ScheduleError};
use crate::money::{Money, Percent, round_percent, round2};
use crate::rule78::{Schedule, sum_of_digits};

/// Aligned per-month series for charting a schedule with its payoff point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffChartSeries {
    /// Month numbers 1..=n.
    pub labels: Vec<u32>,
    /// Principal column, one entry per month.
    pub principal: Vec<Money>,
    pub interest: Vec<Money>,
    /// Start-of-month balances.
    pub balance: Vec<Money>,
    pub payoff_point: u32,
}

impl PayoffChartSeries {
    fn from_schedule(schedule: &Schedule, payoff_point: u32) -> Self {
        Self {
            labels: schedule.rows.iter().map(|row| row.month).collect(),
            principal: schedule.rows.iter().map(|row| row.principal).collect(),
            interest: schedule.rows.iter().map(|row| row.interest).collect(),
            balance: schedule.rows.iter().map(|row| row.start_balance).collect(),
            payoff_point,
        }
    }
}

/// Result of paying a loan off after `total_paid_months` scheduled payments.
///
/// Money figures are rounded to cents and percentages to one decimal place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffReport {
    /// Number of scheduled payments made before the payoff.
    pub total_paid_months: u32,
    pub total_paid_principal: Money,
    pub total_paid_interest: Money,
    /// Principal plus interest over the paid months.
    pub total_paid: Money,
    /// Lump sum that settles the loan.
    pub payoff_amount: Money,
    /// Unearned interest refunded by the Rule of 78.
    pub interest_rebate: Money,
    /// Unpaid principal settled by the lump sum.
    pub remaining_principal_in_payoff: Money,
    /// Interest still contained in the lump sum, never negative.
    pub remaining_interest_in_payoff: Money,
    /// Paid interest as a share of the finance charge.
    pub interest_paid_percentage: Percent,
    pub interest_remaining_percentage: Percent,
    /// What the remaining regular payments would add up to.
    pub remaining_total_if_continued: Money,
    pub remaining_principal_if_continued: Money,
    pub remaining_interest_if_continued: Money,
    pub interest_savings: Money,
    /// Remaining regular payments minus the lump sum.
    pub total_savings: Money,
    pub chart: PayoffChartSeries,
}

fn share_of_finance_charge(amount: Money, finance_charge: Money) -> Percent {
    if finance_charge.is_zero() {
        return Decimal::ZERO;
    }
    round_percent(amount / finance_charge * dec!(100))
}

/// Computes the early payoff figures for settling `schedule` after `payoff_month` payments.
///
/// # Errors
///
/// Returns `PayoffError::InconsistentSchedule` if the schedule is structurally inconsistent,
/// `PayoffError::MonthBelowOne` for month 0 and `PayoffError::MonthNotBeforeTerm` when the
/// month is not strictly before the end of the term.
pub fn compute_payoff(
    schedule: &Schedule,
    payoff_month: u32,
) -> Result<PayoffReport, PayoffError> {
    schedule.check_consistency()?;

    let total_months = schedule.number_of_months;
    if payoff_month < 1 {
        return Err(PayoffError::MonthBelowOne);
    }
    if payoff_month >= total_months {
        return Err(PayoffError::MonthNotBeforeTerm {
            payoff_month,
            number_of_months: total_months,
        });
    }

    let paid_rows = &schedule.rows[..payoff_month as usize];
    let paid_principal: Money = paid_rows.iter().map(|row| row.principal).sum();
    let paid_interest: Money = paid_rows.iter().map(|row| row.interest).sum();
    let total_paid = paid_principal + paid_interest;

    let remaining_months = total_months - payoff_month;
    let total_digits = schedule.sum_of_digits;
    let remaining_digits = sum_of_digits(remaining_months);
    let finance_charge = schedule.total_finance_charge;

    let interest_rebate = match finance_charge.checked_mul(Decimal::from(remaining_digits)) {
        Some(weighted) => weighted / Decimal::from(total_digits),
        None => finance_charge * (Decimal::from(remaining_digits) / Decimal::from(total_digits)),
    };

    let remaining_payments = Decimal::from(remaining_months) * schedule.monthly_payment;
    let payoff_amount = remaining_payments - interest_rebate;
    let remaining_principal = schedule.loan_amount - paid_principal;
    let remaining_interest_in_payoff = (payoff_amount - remaining_principal).max(Decimal::ZERO);

    let remaining_interest_if_continued = finance_charge - paid_interest;

    debug!(
        payoff_month,
        remaining_months,
        %payoff_amount,
        %interest_rebate,
        "computed early payoff"
    );

    Ok(PayoffReport {
        total_paid_months: payoff_month,
        total_paid_principal: round2(paid_principal),
        total_paid_interest: round2(paid_interest),
        total_paid: round2(total_paid),
        payoff_amount: round2(payoff_amount),
        interest_rebate: round2(interest_rebate),
        remaining_principal_in_payoff: round2(remaining_principal),
        remaining_interest_in_payoff: round2(remaining_interest_in_payoff),
        interest_paid_percentage: share_of_finance_charge(paid_interest, finance_charge),
        interest_remaining_percentage: share_of_finance_charge(
            remaining_interest_if_continued,
            finance_charge,
        ),
        remaining_total_if_continued: round2(remaining_payments),
        remaining_principal_if_continued: round2(remaining_principal),
        remaining_interest_if_continued: round2(remaining_interest_if_continued),
        interest_savings: round2(remaining_interest_if_continued - remaining_interest_in_payoff),
        total_savings: round2(remaining_payments - payoff_amount),
        chart: PayoffChartSeries::from_schedule(schedule, payoff_month),
    })
}

/// Like [`compute_payoff`], but accepts the outcome of a schedule build directly so a
/// failed build surfaces as `PayoffError::FailedSchedule`.
pub fn compute_payoff_for(
    schedule: &Result<Schedule, ScheduleError>,
    payoff_month: u32,
) -> Result<PayoffReport, PayoffError> {
    match schedule {
        Ok(schedule) => compute_payoff(schedule, payoff_month),
        Err(err) => Err(PayoffError::FailedSchedule(err.clone())),
    }
}
