use super::money::{Money, Price};
use crate::error::CartError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque product identifier; the unique key of a line within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// A line quantity of at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Self = Self(1);

    pub fn new(value: u32) -> Result<Self, CartError> {
        if value >= 1 {
            Ok(Self(value))
        } else {
            Err(CartError::Validation(
                "Quantity must be at least 1".to_string(),
            ))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = CartError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = u32::try_from(value).map_err(|_| {
            CartError::Validation(format!("Quantity {value} is out of range"))
        })?;
        Self::new(value)
    }
}

/// A catalog product as handed to the cart by the product pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, CartError> {
        Ok(Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price: Price::new(price)?,
        })
    }
}

/// One product's presence in a cart.
///
/// Name, category and price are copies taken when the line was created and are
/// not refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    pub quantity: u32,
    pub unit_price: Price,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: Quantity) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            category: product.category.clone(),
            quantity: quantity.get(),
            unit_price: product.price,
        }
    }

    /// Unrounded `unit_price * quantity`.
    pub fn line_total(&self) -> Result<Money, CartError> {
        self.unit_price.times(self.quantity)
    }
}

/// A cart line as the remote cart service returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_category: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Decimal,
}

impl From<RemoteCartLine> for CartLine {
    fn from(line: RemoteCartLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name,
            category: line.product_category,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// Body of an add-line request to the remote cart service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineRequest {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_category: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Decimal,
}

impl AddLineRequest {
    pub fn new(product: &Product, quantity: Quantity) -> Result<Self, CartError> {
        Ok(Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_category: product.category.clone(),
            quantity: quantity.get(),
            unit_price: product.price,
            total_price: product.price.times(quantity.get())?.0,
        })
    }

    /// Request that uploads a guest line, used by the login merge.
    pub fn from_line(line: &CartLine) -> Result<Self, CartError> {
        Ok(Self {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            product_category: line.category.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.line_total()?.0,
        })
    }
}
