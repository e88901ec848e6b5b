//! Per-item and combined totals derived from a purchase configuration.

use serde::{Deserialize, Serialize};

use crate::config::{Item, PurchaseConfig};
use crate::error::ConfigError;
use crate::flat_rate::{loan_percentage, monthly_payment};
use crate::money::{Money, Percent};

/// Figures for a single item, computed whether or not the item is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTotals {
    pub price: Money,
    pub loan_amount: Money,
    pub trade_in: Money,
    /// Price not covered by the loan.
    pub balance: Money,
    /// Balance left after the trade-in.
    pub cash_required: Money,
    /// Flat-rate payment in whole units.
    pub monthly_payment: Money,
    /// Loan as a percentage of the price.
    pub loan_percent: Percent,
    pub active: bool,
}

/// Totals over the active items only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedTotals {
    /// Sum of active prices before the discount.
    pub gross_price: Money,
    pub discount: Money,
    /// `gross_price - discount`.
    pub price: Money,
    /// Sum of active loans, financed as one.
    pub loan_amount: Money,
    pub trade_in: Money,
    /// Sum of the active items' payments.
    pub monthly_payment: Money,
    /// `price - loan_amount`, so the discount reduces the balance and the cash required.
    pub balance: Money,
    /// `balance - trade_in`.
    pub cash_required: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub first: ItemTotals,
    pub second: ItemTotals,
    pub combined: CombinedTotals,
}

impl AggregateResult {
    pub fn item(&self, item: Item) -> &ItemTotals {
        match item {
            Item::First => &self.first,
            Item::Second => &self.second,
        }
    }
}

fn item_totals(config: &PurchaseConfig, item: Item) -> ItemTotals {
    let loan = config.item(item);
    let terms = &config.terms;
    let balance = loan.price - loan.loan_amount;

    ItemTotals {
        price: loan.price,
        loan_amount: loan.loan_amount,
        trade_in: loan.trade_in,
        balance,
        cash_required: balance - loan.trade_in,
        monthly_payment: monthly_payment(
            loan.loan_amount,
            terms.annual_interest_rate_percent,
            terms.term_years,
        ),
        loan_percent: loan_percentage(loan.loan_amount, loan.price),
        active: loan.active,
    }
}

fn sum_active(active: &[&ItemTotals], field: fn(&ItemTotals) -> Money) -> Money {
    active.iter().map(|totals| field(totals)).sum()
}

/// Derives item and combined totals.
///
/// The discount is taken once off the combined price; item prices are never discounted.
///
/// # Errors
///
/// Returns a `ConfigError` if the configuration holds negative amounts or a zero-year term.
pub fn aggregate(config: &PurchaseConfig) -> Result<AggregateResult, ConfigError> {
    config.validate()?;

    let first = item_totals(config, Item::First);
    let second = item_totals(config, Item::Second);

    let active: Vec<&ItemTotals> = [&first, &second]
        .into_iter()
        .filter(|totals| totals.active)
        .collect();

    let gross_price = sum_active(&active, |t| t.price);
    let price = gross_price - config.discount;
    let loan_amount = sum_active(&active, |t| t.loan_amount);
    let trade_in = sum_active(&active, |t| t.trade_in);
    let balance = price - loan_amount;

    let combined = CombinedTotals {
        gross_price,
        discount: config.discount,
        price,
        loan_amount,
        trade_in,
        monthly_payment: sum_active(&active, |t| t.monthly_payment),
        balance,
        cash_required: balance - trade_in,
    };

    Ok(AggregateResult {
        first,
        second,
        combined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItemSelection;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_aggregate_default_configuration() {
        let result = aggregate(&PurchaseConfig::default()).unwrap();

        assert_eq!(result.first.balance, dec!(108988));
        assert_eq!(result.first.cash_required, dec!(18988));
        assert_eq!(result.first.monthly_payment, dec!(1397));
        // 80000 * 1.1736 / 84 = 1117.71...
        assert_eq!(result.second.monthly_payment, dec!(1118));

        let combined = &result.combined;
        assert_eq!(combined.price, dec!(374976));
        assert_eq!(combined.loan_amount, dec!(180000));
        assert_eq!(combined.trade_in, dec!(155000));
        assert_eq!(combined.monthly_payment, dec!(2515));
        assert_eq!(combined.balance, dec!(194976));
        assert_eq!(combined.cash_required, dec!(39976));
    }

    #[test]
    fn test_aggregate_discount_only_touches_combined_price() {
        let mut config = PurchaseConfig::default();
        config.discount = dec!(5000);
        let result = aggregate(&config).unwrap();

        assert_eq!(result.first.price, dec!(208988));
        assert_eq!(result.combined.gross_price, dec!(374976));
        assert_eq!(result.combined.price, dec!(369976));
        assert_eq!(result.combined.cash_required, dec!(34976));
    }

    #[test]
    fn test_aggregate_honours_selection() {
        let config = PurchaseConfig::default().with_selection(ItemSelection::Second);
        let result = aggregate(&config).unwrap();

        assert!(!result.first.active);
        // Inactive items still get their own figures.
        assert_eq!(result.first.monthly_payment, dec!(1397));
        assert_eq!(result.combined.price, dec!(165988));
        assert_eq!(result.combined.loan_amount, dec!(80000));
        assert_eq!(result.combined.monthly_payment, dec!(1118));
    }

    #[test]
    fn test_aggregate_loan_percent_with_zero_price() {
        let mut config = PurchaseConfig::default();
        config.first.price = dec!(0);
        let result = aggregate(&config).unwrap();
        assert_eq!(result.first.loan_percent, dec!(0));
    }

    #[test]
    fn test_aggregate_rejects_negative_amounts() {
        let mut config = PurchaseConfig::default();
        config.first.price = dec!(-1);
        assert!(matches!(
            aggregate(&config),
            Err(ConfigError::NegativeAmount { .. })
        ));
    }
}
