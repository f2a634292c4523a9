//! Pure line-list transitions for the guest cart.

use super::line::{CartLine, Product, ProductId, Quantity};
use crate::error::CartError;

/// Adds `quantity` of `product`, incrementing an existing line in place.
///
/// Fails with `Validation` and leaves the list untouched if the summed quantity
/// does not fit a line.
pub fn add_line(
    lines: &mut Vec<CartLine>,
    product: &Product,
    quantity: Quantity,
) -> Result<(), CartError> {
    match lines.iter_mut().find(|line| line.product_id == product.id) {
        Some(line) => {
            line.quantity = line.quantity.checked_add(quantity.get()).ok_or_else(|| {
                CartError::Validation(format!("Quantity of {} is too large", product.id))
            })?;
        }
        None => lines.push(CartLine::from_product(product, quantity)),
    }
    Ok(())
}

/// Sets the quantity of an existing line; a quantity of zero or less removes it.
///
/// Returns `false` when the product is not in the list.
pub fn set_quantity(lines: &mut Vec<CartLine>, product_id: &ProductId, quantity: i64) -> bool {
    let Some(index) = lines.iter().position(|line| &line.product_id == product_id) else {
        return false;
    };
    match Quantity::try_from(quantity) {
        Ok(quantity) => lines[index].quantity = quantity.get(),
        Err(_) => {
            lines.remove(index);
        }
    }
    true
}

/// Removes the line for `product_id`. Returns `false` when it was absent.
pub fn remove_line(lines: &mut Vec<CartLine>, product_id: &ProductId) -> bool {
    let before = lines.len();
    lines.retain(|line| &line.product_id != product_id);
    lines.len() != before
}
