use crate::error::CartError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Number of decimal places shown for any currency figure.
pub const CURRENCY_DP: u32 = 2;

/// Largest accepted unit price.
///
/// Keeps `price * u32::MAX` and any realistic cart sum far inside `Decimal`'s range.
pub const MAX_UNIT_PRICE: Decimal = dec!(1000000000);

/// Error for a currency computation that left `Decimal`'s range.
pub fn currency_overflow(what: &str) -> CartError {
    CartError::Validation(format!("{what} exceeds the supported currency range"))
}

/// Rounds a currency figure for presentation.
///
/// Uses round-half-up (`MidpointAwayFromZero`), so `0.005` becomes `0.01`.
/// Internal running sums stay unrounded; only figures handed to callers go through here.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// A positive unit price captured when a product is added to a cart.
///
/// Deserialization goes through [`Price::new`], so stored carts obey the same bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> Result<Self, CartError> {
        if value <= Decimal::ZERO {
            return Err(CartError::Validation(format!(
                "Unit price must be positive, got {value}"
            )));
        }
        if value > MAX_UNIT_PRICE {
            return Err(CartError::Validation(format!(
                "Unit price {value} is above the maximum of {MAX_UNIT_PRICE}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Unrounded `price * quantity`.
    pub fn times(&self, quantity: u32) -> Result<Money, CartError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Money)
            .ok_or_else(|| currency_overflow("Line total"))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = CartError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// An unrounded currency amount used for running sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn rounded(&self) -> Decimal {
        round_currency(self.0)
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, CartError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| currency_overflow("Cart total"))
    }
}
