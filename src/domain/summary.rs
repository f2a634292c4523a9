use super::money::{currency_overflow, round_currency};
use super::snapshot::CartSnapshot;
use crate::error::CartError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Tax and shipping rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    /// Fraction of the subtotal charged as tax (0.18 for 18% GST).
    pub tax_rate: Decimal,
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Decimal,
    pub shipping_fee: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: dec!(0.18),
            free_shipping_threshold: dec!(500),
            shipping_fee: dec!(99),
        }
    }
}

impl PricingConfig {
    pub fn new(
        tax_rate: Decimal,
        free_shipping_threshold: Decimal,
        shipping_fee: Decimal,
    ) -> Result<Self, CartError> {
        if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE {
            return Err(CartError::Validation(format!(
                "Tax rate must be between 0 and 1, got {tax_rate}"
            )));
        }
        if free_shipping_threshold < Decimal::ZERO || shipping_fee < Decimal::ZERO {
            return Err(CartError::Validation(
                "Shipping threshold and fee must not be negative".to_string(),
            ));
        }
        Ok(Self {
            tax_rate,
            free_shipping_threshold,
            shipping_fee,
        })
    }
}

/// Checkout breakdown of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    /// How much more the cart needs to ship free; `None` once shipping is free.
    pub remaining_for_free_shipping: Option<Decimal>,
}

impl OrderSummary {
    pub fn compute(snapshot: &CartSnapshot, config: &PricingConfig) -> Result<Self, CartError> {
        let subtotal = snapshot.total_amount();
        let tax = subtotal
            .checked_mul(config.tax_rate)
            .map(round_currency)
            .ok_or_else(|| currency_overflow("Tax"))?;
        let charges_shipping =
            !snapshot.is_empty() && subtotal <= config.free_shipping_threshold;
        let shipping = if charges_shipping {
            config.shipping_fee
        } else {
            Decimal::ZERO
        };
        let total = subtotal
            .checked_add(tax)
            .and_then(|sum| sum.checked_add(shipping))
            .map(round_currency)
            .ok_or_else(|| currency_overflow("Order total"))?;
        // subtotal <= threshold whenever shipping is charged, so this cannot go negative.
        let remaining_for_free_shipping = charges_shipping
            .then(|| round_currency(config.free_shipping_threshold - subtotal));
        Ok(Self {
            subtotal,
            tax,
            shipping,
            total,
            remaining_for_free_shipping,
        })
    }
}
