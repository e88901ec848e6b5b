//! Purchase configuration: two financed items sharing one rate and term.

use std::fmt;

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flat_rate::loan_for_target_percent;
use crate::money::{Money, Percent};

/// One financed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanConfig {
    pub price: Money,
    pub loan_amount: Money,
    pub trade_in: Money,
    /// Loan-to-price target used by [`PurchaseConfig::apply_target_percent`].
    pub target_percent: Percent,
    /// Whether the item takes part in combined totals.
    pub active: bool,
}

/// Rate and term shared by every item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedTerms {
    /// Flat annual rate as a percentage (e.g., 2.48 for 2.48%).
    pub annual_interest_rate_percent: Percent,
    pub term_years: u32,
}

/// Longest accepted term, matching the 1200-month schedule limit.
pub const MAX_TERM_YEARS: u32 = 100;

impl SharedTerms {
    pub fn months(&self) -> u32 {
        self.term_years.saturating_mul(12)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    First,
    Second,
}

impl Item {
    pub const ALL: [Item; 2] = [Item::First, Item::Second];
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::First => write!(f, "Item 1"),
            Item::Second => write!(f, "Item 2"),
        }
    }
}

/// Which items are being purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemSelection {
    #[serde(rename = "car1")]
    First,
    #[serde(rename = "car2")]
    Second,
    #[serde(rename = "both")]
    Both,
}

impl ItemSelection {
    pub fn includes(self, item: Item) -> bool {
        matches!(
            (self, item),
            (ItemSelection::Both, _)
                | (ItemSelection::First, Item::First)
                | (ItemSelection::Second, Item::Second)
        )
    }
}

/// A full purchase configuration as edited by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseConfig {
    pub terms: SharedTerms,
    /// Flat discount taken off the combined price.
    pub discount: Money,
    pub first: LoanConfig,
    pub second: LoanConfig,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            terms: SharedTerms {
                annual_interest_rate_percent: dec!(2.48),
                term_years: 7,
            },
            discount: Decimal::ZERO,
            first: LoanConfig {
                price: dec!(208988),
                loan_amount: dec!(100000),
                trade_in: dec!(90000),
                target_percent: dec!(60),
                active: true,
            },
            second: LoanConfig {
                price: dec!(165988),
                loan_amount: dec!(80000),
                trade_in: dec!(65000),
                target_percent: dec!(60),
                active: true,
            },
        }
    }
}

impl PurchaseConfig {
    pub fn item(&self, item: Item) -> &LoanConfig {
        match item {
            Item::First => &self.first,
            Item::Second => &self.second,
        }
    }

    pub fn item_mut(&mut self, item: Item) -> &mut LoanConfig {
        match item {
            Item::First => &mut self.first,
            Item::Second => &mut self.second,
        }
    }

    /// Returns the configuration with each item's `active` flag set from `selection`.
    pub fn with_selection(mut self, selection: ItemSelection) -> Self {
        for item in Item::ALL {
            self.item_mut(item).active = selection.includes(item);
        }
        self
    }

    /// The selection the active flags describe, or `None` when no item is active.
    pub fn selection(&self) -> Option<ItemSelection> {
        match (self.first.active, self.second.active) {
            (true, true) => Some(ItemSelection::Both),
            (true, false) => Some(ItemSelection::First),
            (false, true) => Some(ItemSelection::Second),
            (false, false) => None,
        }
    }

    /// Sets an item's loan to its target percentage of the price.
    pub fn apply_target_percent(&mut self, item: Item) {
        let loan = self.item_mut(item);
        loan.loan_amount = loan_for_target_percent(loan.price, loan.target_percent);
    }

    /// Rejects negative amounts and a zero-year or over-long term. Inputs are never coerced
    /// here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terms.term_years == 0 {
            return Err(ConfigError::ZeroTerm);
        }
        if self.terms.term_years > MAX_TERM_YEARS {
            return Err(ConfigError::TermTooLong {
                years: self.terms.term_years,
                max_years: MAX_TERM_YEARS,
            });
        }
        check_non_negative(
            "annual interest rate",
            self.terms.annual_interest_rate_percent,
        )?;
        check_non_negative("discount", self.discount)?;
        for item in Item::ALL {
            let loan = self.item(item);
            check_non_negative(&format!("{item} price"), loan.price)?;
            check_non_negative(&format!("{item} loan amount"), loan.loan_amount)?;
            check_non_negative(&format!("{item} trade-in"), loan.trade_in)?;
            check_non_negative(&format!("{item} target percent"), loan.target_percent)?;
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("failed to parse purchase configuration")?;
        config
            .validate()
            .context("purchase configuration is invalid")?;
        Ok(config)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize purchase configuration")
    }
}

fn check_non_negative(field: &str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::NegativeAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ItemSelection::First, true, false)]
    #[case(ItemSelection::Second, false, true)]
    #[case(ItemSelection::Both, true, true)]
    fn test_with_selection_sets_active_flags(
        #[case] selection: ItemSelection,
        #[case] first: bool,
        #[case] second: bool,
    ) {
        let config = PurchaseConfig::default().with_selection(selection);
        assert_eq!(config.first.active, first);
        assert_eq!(config.second.active, second);
        assert_eq!(config.selection(), Some(selection));
    }

    #[test]
    fn test_selection_none_when_nothing_active() {
        let mut config = PurchaseConfig::default();
        config.first.active = false;
        config.second.active = false;
        assert_eq!(config.selection(), None);
    }

    #[test]
    fn test_apply_target_percent() {
        let mut config = PurchaseConfig::default();
        config.apply_target_percent(Item::Second);
        // 165988 * 60% = 99592.8
        assert_eq!(config.second.loan_amount, dec!(99593));
        assert_eq!(config.first.loan_amount, dec!(100000));
    }

    #[test]
    fn test_validate_rejects_negative_trade_in() {
        let mut config = PurchaseConfig::default();
        config.second.trade_in = dec!(-1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeAmount {
                field: "Item 2 trade-in".to_string(),
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_term() {
        let mut config = PurchaseConfig::default();
        config.terms.term_years = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTerm));
    }

    #[rstest]
    #[case(101)]
    #[case(u32::MAX)]
    fn test_validate_rejects_term_beyond_limit(#[case] years: u32) {
        let mut config = PurchaseConfig::default();
        config.terms.term_years = years;
        assert_eq!(
            config.validate(),
            Err(ConfigError::TermTooLong {
                years,
                max_years: 100
            })
        );

        config.terms.term_years = MAX_TERM_YEARS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_selection() {
        let config = PurchaseConfig::default().with_selection(ItemSelection::Second);
        let json = config.to_json().unwrap();
        assert_eq!(PurchaseConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_negative_values() {
        let mut config = PurchaseConfig::default();
        config.discount = dec!(-10);
        let json = serde_json::to_string(&config).unwrap();

        let err = PurchaseConfig::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_selection_serialized_names() {
        assert_eq!(
            serde_json::to_string(&ItemSelection::Both).unwrap(),
            "\"both\""
        );
        assert_eq!(
            serde_json::from_str::<ItemSelection>("\"car1\"").unwrap(),
            ItemSelection::First
        );
    }
}
