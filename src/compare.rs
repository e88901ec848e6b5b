//! Field-by-field comparison of two saved configurations.
//!
//! The compared fields and their meaning live in [`FIELDS`]. Whether an increase is good
//! or bad for the buyer is carried as the `inverse_color` flag; turning that into a colour
//! is left to the presentation layer.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::config::Item;
use crate::money::{round_percent, round_whole, round2};
use crate::snapshot::ConfigSnapshot;

/// Rendered in place of a delta that could not be computed.
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    LoanParameters,
    Item(Item),
    Totals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemField {
    Price,
    Loan,
    TradeIn,
    TargetPercent,
    MonthlyPayment,
    CashRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TotalField {
    Price,
    Loan,
    TradeIn,
    MonthlyPayment,
    CashRequired,
}

/// Where a compared value is read from in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldSource {
    InterestRate,
    TermYears,
    Discount,
    Item(Item, ItemField),
    Total(TotalField),
}

impl FieldSource {
    pub fn section(self) -> Section {
        match self {
            FieldSource::InterestRate | FieldSource::TermYears | FieldSource::Discount => {
                Section::LoanParameters
            }
            FieldSource::Item(item, _) => Section::Item(item),
            FieldSource::Total(_) => Section::Totals,
        }
    }

    fn value(self, snapshot: &ConfigSnapshot) -> Decimal {
        let config = snapshot.config();
        let totals = snapshot.totals();
        match self {
            FieldSource::InterestRate => config.terms.annual_interest_rate_percent,
            FieldSource::TermYears => Decimal::from(config.terms.term_years),
            FieldSource::Discount => config.discount,
            FieldSource::Item(item, field) => {
                let loan = config.item(item);
                let derived = totals.item(item);
                match field {
                    ItemField::Price => loan.price,
                    ItemField::Loan => loan.loan_amount,
                    ItemField::TradeIn => loan.trade_in,
                    ItemField::TargetPercent => loan.target_percent,
                    ItemField::MonthlyPayment => derived.monthly_payment,
                    ItemField::CashRequired => derived.cash_required,
                }
            }
            FieldSource::Total(field) => {
                let combined = &totals.combined;
                match field {
                    TotalField::Price => combined.price,
                    TotalField::Loan => combined.loan_amount,
                    TotalField::TradeIn => combined.trade_in,
                    TotalField::MonthlyPayment => combined.monthly_payment,
                    TotalField::CashRequired => combined.cash_required,
                }
            }
        }
    }
}

/// One row of the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub source: FieldSource,
    /// An increase is adverse (a cost), so presentation flips its good/bad colouring.
    pub inverse_color: bool,
    /// Formatted as whole currency units rather than a two-decimal number.
    pub currency: bool,
}

const fn field(
    key: &'static str,
    label: &'static str,
    source: FieldSource,
    inverse_color: bool,
    currency: bool,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        source,
        inverse_color,
        currency,
    }
}

pub const FIELDS: &[FieldSpec] = &[
    field("interest_rate", "Interest Rate (%)", FieldSource::InterestRate, true, false),
    field("term_years", "Loan Term (Years)", FieldSource::TermYears, false, false),
    field("discount", "Discount Amount ($)", FieldSource::Discount, false, true),
    field(
        "price_1",
        "Item 1 Price ($)",
        FieldSource::Item(Item::First, ItemField::Price),
        true,
        true,
    ),
    field("loan_1", "Item 1 Loan ($)", FieldSource::Item(Item::First, ItemField::Loan), true, true),
    field(
        "trade_in_1",
        "Item 1 Trade-in ($)",
        FieldSource::Item(Item::First, ItemField::TradeIn),
        false,
        true,
    ),
    field(
        "target_percent_1",
        "Item 1 Target Loan (%)",
        FieldSource::Item(Item::First, ItemField::TargetPercent),
        false,
        false,
    ),
    field(
        "monthly_1",
        "Item 1 Monthly Payment ($)",
        FieldSource::Item(Item::First, ItemField::MonthlyPayment),
        true,
        true,
    ),
    field(
        "cash_1",
        "Item 1 Cash Required ($)",
        FieldSource::Item(Item::First, ItemField::CashRequired),
        true,
        true,
    ),
    field(
        "price_2",
        "Item 2 Price ($)",
        FieldSource::Item(Item::Second, ItemField::Price),
        true,
        true,
    ),
    field(
        "loan_2",
        "Item 2 Loan ($)",
        FieldSource::Item(Item::Second, ItemField::Loan),
        true,
        true,
    ),
    field(
        "trade_in_2",
        "Item 2 Trade-in ($)",
        FieldSource::Item(Item::Second, ItemField::TradeIn),
        false,
        true,
    ),
    field(
        "target_percent_2",
        "Item 2 Target Loan (%)",
        FieldSource::Item(Item::Second, ItemField::TargetPercent),
        false,
        false,
    ),
    field(
        "monthly_2",
        "Item 2 Monthly Payment ($)",
        FieldSource::Item(Item::Second, ItemField::MonthlyPayment),
        true,
        true,
    ),
    field(
        "cash_2",
        "Item 2 Cash Required ($)",
        FieldSource::Item(Item::Second, ItemField::CashRequired),
        true,
        true,
    ),
    field("total_price", "Total Price ($)", FieldSource::Total(TotalField::Price), true, true),
    field("total_loan", "Total Loan ($)", FieldSource::Total(TotalField::Loan), true, true),
    field(
        "total_trade_in",
        "Total Trade-in ($)",
        FieldSource::Total(TotalField::TradeIn),
        false,
        true,
    ),
    field(
        "total_monthly",
        "Total Monthly Payment ($)",
        FieldSource::Total(TotalField::MonthlyPayment),
        true,
        true,
    ),
    field(
        "total_cash",
        "Total Cash Required ($)",
        FieldSource::Total(TotalField::CashRequired),
        true,
        true,
    ),
];

/// `b - a`, or `None` if it overflows.
pub fn absolute_delta(a: Decimal, b: Decimal) -> Option<Decimal> {
    b.checked_sub(a)
}

/// Relative change from `a` to `b` in percent.
///
/// A zero baseline yields 0 when `b` is also zero and a flat 100 otherwise. `None` means
/// the change overflowed.
pub fn percent_delta(a: Decimal, b: Decimal) -> Option<Decimal> {
    if a.is_zero() {
        return Some(if b.is_zero() { Decimal::ZERO } else { dec!(100) });
    }
    b.checked_sub(a)?.checked_div(a)?.checked_mul(dec!(100))
}

fn sign(value: Decimal) -> &'static str {
    if value.is_sign_negative() && !value.is_zero() { "-" } else { "+" }
}

/// `+1234` for currency (whole units), `+0.25` otherwise, `N/A` when missing.
pub fn format_delta(delta: Option<Decimal>, currency: bool) -> String {
    match delta {
        None => NOT_APPLICABLE.to_string(),
        Some(d) if currency => format!("{}{}", sign(d), round_whole(d.abs())),
        Some(d) => format!("{}{:.2}", sign(d), round2(d.abs())),
    }
}

/// `+12.5%`, or `N/A` when missing.
pub fn format_percent_delta(delta: Option<Decimal>) -> String {
    match delta {
        None => NOT_APPLICABLE.to_string(),
        Some(d) => format!("{}{:.1}%", sign(d), round_percent(d.abs())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDelta {
    pub spec: FieldSpec,
    pub value_a: Decimal,
    pub value_b: Decimal,
    pub absolute_delta: Option<Decimal>,
    pub percent_delta: Option<Decimal>,
}

impl FieldDelta {
    pub fn formatted_delta(&self) -> String {
        format_delta(self.absolute_delta, self.spec.currency)
    }

    pub fn formatted_percent_delta(&self) -> String {
        format_percent_delta(self.percent_delta)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDiff {
    pub fields: Vec<FieldDelta>,
}

impl ConfigDiff {
    pub fn get(&self, key: &str) -> Option<&FieldDelta> {
        self.fields.iter().find(|delta| delta.spec.key == key)
    }

    pub fn section(&self, section: Section) -> impl Iterator<Item = &FieldDelta> {
        self.fields
            .iter()
            .filter(move |delta| delta.spec.source.section() == section)
    }
}

/// Compares snapshot `a` against `b` over [`FIELDS`].
///
/// An item's fields are only compared when the item is active in both snapshots.
pub fn compare(a: &ConfigSnapshot, b: &ConfigSnapshot) -> ConfigDiff {
    let fields = FIELDS
        .iter()
        .filter(|spec| match spec.source.section() {
            Section::Item(item) => {
                a.config().item(item).active && b.config().item(item).active
            }
            Section::LoanParameters | Section::Totals => true,
        })
        .map(|spec| {
            let value_a = spec.source.value(a);
            let value_b = spec.source.value(b);
            FieldDelta {
                spec: *spec,
                value_a,
                value_b,
                absolute_delta: absolute_delta(value_a, value_b),
                percent_delta: percent_delta(value_a, value_b),
            }
        })
        .collect();

    ConfigDiff { fields }
}
