use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal problems while building a Rule of 78 schedule. No partial schedule is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error(
        "Invalid inputs: loan amount ({loan_amount}), monthly payment ({monthly_payment}) and term ({number_of_months} months) must be positive"
    )]
    InvalidInput {
        loan_amount: Decimal,
        monthly_payment: Decimal,
        number_of_months: u32,
    },

    #[error(
        "Invalid inputs: term of {number_of_months} months exceeds the {max_months}-month limit"
    )]
    TermTooLong {
        number_of_months: u32,
        max_months: u32,
    },

    #[error(
        "Invalid inputs: loan amount ({loan_amount}) and monthly payment ({monthly_payment}) are too large to schedule"
    )]
    AmountTooLarge {
        loan_amount: Decimal,
        monthly_payment: Decimal,
    },

    #[error("Calculation resulted in a significant negative balance ({balance}) at month {month}")]
    BalanceDivergence { month: u32, balance: Decimal },
}

/// Structural defects of a schedule that was not produced by `build_schedule` as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleInconsistency {
    #[error("schedule has no months")]
    NoMonths,

    #[error("schedule term of {number_of_months} months exceeds the supported limit")]
    TermTooLong { number_of_months: u32 },

    #[error("schedule has {rows} rows for a {number_of_months}-month term")]
    RowCount { rows: usize, number_of_months: u32 },

    #[error("sum of digits {sum_of_digits} does not match a {number_of_months}-month term")]
    SumOfDigits {
        sum_of_digits: u64,
        number_of_months: u32,
    },

    #[error("row {position} is labelled month {month}")]
    MonthLabel { position: usize, month: u32 },

    #[error("balance chain breaks after month {month}")]
    BrokenChain { month: u32 },
}

/// Recoverable conditions recorded on a successful schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ScheduleWarning {
    #[error("Total finance charge is negative ({finance_charge}); proceeding with zero interest")]
    NegativeFinanceCharge { finance_charge: Decimal },

    #[error(
        "Total payments ({scheduled_total}) are less than loan plus total interest ({total_due}); schedule might not amortize"
    )]
    PaymentsBelowTotalDue {
        scheduled_total: Decimal,
        total_due: Decimal,
    },

    #[error(
        "Month {month}: interest ({interest}) exceeds payment ({payment}); principal clamped to 0"
    )]
    PrincipalClamped {
        month: u32,
        interest: Decimal,
        payment: Decimal,
    },

    #[error(
        "Final payment ({payment}) is less than the remaining balance ({remaining_balance}); final principal adjusted to {principal}"
    )]
    FinalPaymentInsufficient {
        payment: Decimal,
        remaining_balance: Decimal,
        principal: Decimal,
    },

    #[error(
        "Sum of monthly interest ({accumulated}) differs from the total finance charge ({finance_charge}) by more than {tolerance}"
    )]
    ToleranceExceeded {
        accumulated: Decimal,
        finance_charge: Decimal,
        tolerance: Decimal,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoffError {
    #[error("Payoff requires a valid schedule: {0}")]
    InconsistentSchedule(#[from] ScheduleInconsistency),

    #[error("Payoff requires a valid schedule: {0}")]
    FailedSchedule(#[source] ScheduleError),

    #[error("Payoff month must be at least 1")]
    MonthBelowOne,

    #[error("Payoff month ({payoff_month}) must be less than total term ({number_of_months})")]
    MonthNotBeforeTerm {
        payoff_month: u32,
        number_of_months: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid input: {field} must not be negative (got {value})")]
    NegativeAmount { field: String, value: Decimal },

    #[error("Invalid input: loan term must be at least one year")]
    ZeroTerm,

    #[error("Invalid input: loan term of {years} years exceeds the {max_years}-year limit")]
    TermTooLong { years: u32, max_years: u32 },

    #[error("Combined schedule requires both items to be selected")]
    CombinedRequiresBoth,

    #[error("Combined schedule requires a positive total loan")]
    CombinedWithoutLoan,

    #[error("{0} is not part of the current selection")]
    ItemInactive(String),

    #[error("Configuration {0} has not been saved")]
    SnapshotMissing(String),
}

/// Umbrella error for the host-facing entry points that chain several calculators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Payoff(#[from] PayoffError),
}
