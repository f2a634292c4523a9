use super::line::{CartLine, ProductId};
use super::money::Money;
use crate::error::CartError;
use rust_decimal::Decimal;
use serde::Serialize;

/// Derived cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of all line quantities.
    pub total_items: u64,
    /// Sum of `unit_price * quantity`, rounded to currency precision.
    pub total_amount: Decimal,
}

/// Computes totals over a line list.
///
/// Pure: the sum is accumulated unrounded and rounded once at the end. Fails with
/// `Validation` if the amount leaves the currency range.
pub fn totals(lines: &[CartLine]) -> Result<Totals, CartError> {
    let total_items = lines.iter().map(|line| u64::from(line.quantity)).sum();
    let amount = lines
        .iter()
        .try_fold(Money::ZERO, |sum, line| sum.checked_add(line.line_total()?))?;
    Ok(Totals {
        total_items,
        total_amount: amount.rounded(),
    })
}

/// Read-only view of a cart handed to UI consumers.
///
/// Totals are always computed from `lines` at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
    #[serde(flatten)]
    totals: Totals,
}

impl CartSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, CartError> {
        let totals = totals(&lines)?;
        Ok(Self { lines, totals })
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn total_items(&self) -> u64 {
        self.totals.total_items
    }

    pub fn total_amount(&self) -> Decimal {
        self.totals.total_amount
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Quantity of a product in the cart, zero when absent.
    pub fn item_quantity(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.line(product_id).is_some()
    }
}
