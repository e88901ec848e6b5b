//! `rule78_financing` is a Rust library for analysing flat-rate installment loans.
//!
//! It is built for comparing purchase configurations (two financed items, or both financed
//! as one loan) and provides:
//! - **Flat-rate payments**: total interest is `principal * rate * years`, added to the
//!   principal and split into equal monthly payments.
//! - **Rule of 78 schedules**: the finance charge is allocated month by month in proportion
//!   to the sum of the remaining months' digits.
//! - **Early payoff**: the lump sum, the unearned interest rebate and the savings compared
//!   to continuing the regular payments.
//! - **Configuration comparison**: field-by-field deltas between two saved configurations.
//!
//! ## Usage
//!
//! Add `rule78_financing` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! rule78_financing = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then build a schedule and ask for the payoff after six months:
//!
//! ```rust
//! use rule78_financing::{build_schedule, compute_payoff};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let schedule = match build_schedule(dec!(12000), 12, dec!(780), dec!(1065)) {
//!         Ok(schedule) => schedule,
//!         Err(e) => {
//!             eprintln!("Error building schedule: {}", e);
//!             return;
//!         }
//!     };
//!
//!     println!("Month 1 interest: {:.2}", schedule.rows[0].interest);
//!
//!     match compute_payoff(&schedule, 6) {
//!         Ok(report) => {
//!             println!("Payoff amount:   {:.2}", report.payoff_amount);
//!             println!("Interest rebate: {:.2}", report.interest_rebate);
//!             println!("Total savings:   {:.2}", report.total_savings);
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating payoff: {}", e);
//!         }
//!     }
//! }
//! ```
//!
//! Hosts that keep a schedule on screen call [`rebuild`] after any relevant input change.

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod error;
pub mod flat_rate;
pub mod money;
pub mod payoff;
pub mod rebuild;
pub mod rule78;
pub mod snapshot;

pub use aggregate::{AggregateResult, CombinedTotals, ItemTotals, aggregate};
pub use compare::{
    ConfigDiff, FIELDS, FieldDelta, FieldSpec, NOT_APPLICABLE, Section, absolute_delta, compare,
    format_delta, format_percent_delta, percent_delta,
};
pub use config::{
    Item, ItemSelection, LoanConfig, MAX_TERM_YEARS, PurchaseConfig, SharedTerms,
};
pub use error::{
    ConfigError, EngineError, PayoffError, ScheduleError, ScheduleInconsistency, ScheduleWarning,
};
pub use flat_rate::{
    loan_for_target_percent, loan_percentage, monthly_payment, total_finance_charge,
};
pub use money::{Money, Percent, round_whole, round2};
pub use payoff::{PayoffChartSeries, PayoffReport, compute_payoff, compute_payoff_for};
pub use rebuild::{Analysis, ScheduleInputs, ScheduleTarget, rebuild};
pub use rule78::{MAX_TERM_MONTHS, Schedule, ScheduleRow, build_schedule, sum_of_digits};
pub use snapshot::{ConfigSnapshot, SnapshotSlot, Workbench};
