use crate::domain::identity::IdentityKey;
use crate::domain::line::{AddLineRequest, CartLine, ProductId, RemoteCartLine};
use crate::domain::ports::{LocalCartStore, RemoteCartStore};
use crate::error::{CartError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory stand-in for the backend cart service.
///
/// Uses `Arc<RwLock<HashMap<IdentityKey, Vec<RemoteCartLine>>>>`, so clones share
/// carts. Mirrors the service's rules: adding an existing product bumps its
/// quantity, fetching an unknown identity creates an empty cart, and quantity
/// updates on a missing cart or product fail with `NotFound`.
#[derive(Default, Clone)]
pub struct InMemoryRemoteCartStore {
    carts: Arc<RwLock<HashMap<IdentityKey, Vec<RemoteCartLine>>>>,
}

impl InMemoryRemoteCartStore {
    /// Creates a new store with no carts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities that currently have a cart.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[async_trait]
impl RemoteCartStore for InMemoryRemoteCartStore {
    async fn fetch(&self, identity: &IdentityKey) -> Result<Vec<RemoteCartLine>> {
        let mut carts = self.carts.write().await;
        Ok(carts.entry(identity.clone()).or_default().clone())
    }

    async fn add_line(&self, identity: &IdentityKey, request: AddLineRequest) -> Result<()> {
        if request.quantity == 0 {
            return Err(CartError::Validation(
                "Quantity must be positive".to_string(),
            ));
        }
        let mut carts = self.carts.write().await;
        let lines = carts.entry(identity.clone()).or_default();
        match lines
            .iter_mut()
            .find(|line| line.product_id == request.product_id)
        {
            Some(line) => {
                let quantity = line.quantity.checked_add(request.quantity).ok_or_else(|| {
                    CartError::Validation(format!(
                        "Quantity of {} is too large",
                        request.product_id
                    ))
                })?;
                line.total_price = line.unit_price.times(quantity)?.0;
                line.quantity = quantity;
            }
            None => lines.push(RemoteCartLine {
                product_id: request.product_id,
                product_name: request.product_name,
                product_category: request.product_category,
                quantity: request.quantity,
                unit_price: request.unit_price,
                total_price: request.total_price,
            }),
        }
        Ok(())
    }

    async fn update_quantity(
        &self,
        identity: &IdentityKey,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        let mut carts = self.carts.write().await;
        let lines = carts
            .get_mut(identity)
            .ok_or_else(|| CartError::NotFound("Cart not found".to_string()))?;
        let index = lines
            .iter()
            .position(|line| &line.product_id == product_id)
            .ok_or_else(|| CartError::NotFound(format!("Item {product_id} not found in cart")))?;

        if quantity == 0 {
            lines.remove(index);
        } else {
            let line = &mut lines[index];
            line.total_price = line.unit_price.times(quantity)?.0;
            line.quantity = quantity;
        }
        Ok(())
    }

    async fn delete_line(&self, identity: &IdentityKey, product_id: &ProductId) -> Result<()> {
        let mut carts = self.carts.write().await;
        let lines = carts
            .get_mut(identity)
            .ok_or_else(|| CartError::NotFound("Cart not found".to_string()))?;
        lines.retain(|line| &line.product_id != product_id);
        Ok(())
    }

    async fn clear(&self, identity: &IdentityKey) -> Result<()> {
        self.carts.write().await.remove(identity);
        Ok(())
    }
}

/// A thread-safe in-memory guest cart.
///
/// `None` means no cart has been written yet (or it was deleted), which reads as
/// an empty list.
#[derive(Default, Clone)]
pub struct InMemoryLocalCartStore {
    lines: Arc<RwLock<Option<Vec<CartLine>>>>,
}

impl InMemoryLocalCartStore {
    /// Creates a new, empty local store.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a cart entry is present, even an empty one.
    pub async fn has_entry(&self) -> bool {
        self.lines.read().await.is_some()
    }
}

#[async_trait]
impl LocalCartStore for InMemoryLocalCartStore {
    async fn read_all(&self) -> Result<Vec<CartLine>> {
        Ok(self.lines.read().await.clone().unwrap_or_default())
    }

    async fn write_all(&self, lines: &[CartLine]) -> Result<()> {
        *self.lines.write().await = Some(lines.to_vec());
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        *self.lines.write().await = None;
        Ok(())
    }
}
