//! Rebuilding schedules and payoff reports from the current configuration.
//!
//! Builders are pure and idempotent. A host that displays a schedule calls [`rebuild`]
//! again whenever the loan amount, rate, term or selection change, and replaces what it
//! shows with the new result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::aggregate;
use crate::config::{Item, PurchaseConfig};
use crate::error::{ConfigError, EngineError, ScheduleError};
use crate::flat_rate::total_finance_charge;
use crate::money::Money;
use crate::payoff::{PayoffReport, compute_payoff};
use crate::rule78::{Schedule, build_schedule};

/// Which loan a schedule is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleTarget {
    Item(Item),
    /// Both loans financed as one: total loan, total monthly payment.
    Combined,
}

/// The four figures a Rule of 78 schedule is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInputs {
    pub loan_amount: Money,
    pub number_of_months: u32,
    /// Unrounded flat-rate charge; the schedule stores it in cents.
    pub total_finance_charge: Money,
    pub monthly_payment: Money,
}

impl ScheduleInputs {
    /// Derives schedule inputs for `target` from a configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, when an item target is not active, or when
    /// a combined schedule is requested without both items selected or without any loan.
    pub fn for_target(
        config: &PurchaseConfig,
        target: ScheduleTarget,
    ) -> Result<Self, ConfigError> {
        let totals = aggregate(config)?;
        let terms = &config.terms;

        let (loan_amount, monthly_payment) = match target {
            ScheduleTarget::Item(item) => {
                let item_totals = totals.item(item);
                if !item_totals.active {
                    return Err(ConfigError::ItemInactive(item.to_string()));
                }
                (item_totals.loan_amount, item_totals.monthly_payment)
            }
            ScheduleTarget::Combined => {
                if !(config.first.active && config.second.active) {
                    return Err(ConfigError::CombinedRequiresBoth);
                }
                if totals.combined.loan_amount <= Decimal::ZERO {
                    return Err(ConfigError::CombinedWithoutLoan);
                }
                (totals.combined.loan_amount, totals.combined.monthly_payment)
            }
        };

        Ok(Self {
            loan_amount,
            number_of_months: terms.months(),
            total_finance_charge: total_finance_charge(
                loan_amount,
                terms.annual_interest_rate_percent,
                terms.term_years,
            ),
            monthly_payment,
        })
    }

    pub fn build(&self) -> Result<Schedule, ScheduleError> {
        build_schedule(
            self.loan_amount,
            self.number_of_months,
            self.total_finance_charge,
            self.monthly_payment,
        )
    }
}

/// A schedule and, when a payoff month was requested, its payoff report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub target: ScheduleTarget,
    pub inputs: ScheduleInputs,
    pub schedule: Schedule,
    pub payoff: Option<PayoffReport>,
}

/// Rebuilds the schedule for `target` from scratch, plus the payoff report for
/// `payoff_month` if one is given.
///
/// Nothing is reused from an earlier call, so the result always reflects `config`.
/// Whether to keep showing a previous analysis when this fails is up to the caller.
pub fn rebuild(
    config: &PurchaseConfig,
    target: ScheduleTarget,
    payoff_month: Option<u32>,
) -> Result<Analysis, EngineError> {
    let inputs = ScheduleInputs::for_target(config, target)?;
    let schedule = inputs.build()?;
    let payoff = payoff_month
        .map(|month| compute_payoff(&schedule, month))
        .transpose()?;

    debug!(?target, months = inputs.number_of_months, "rebuilt analysis");

    Ok(Analysis {
        target,
        inputs,
        schedule,
        payoff,
    })
}
