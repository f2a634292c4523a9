use super::identity::{Identity, IdentityKey};
use super::line::{AddLineRequest, CartLine, ProductId, RemoteCartLine};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Server-side cart storage for authenticated identities.
///
/// The store is authoritative: the engine re-fetches after every write.
#[async_trait]
pub trait RemoteCartStore: Send + Sync {
    async fn fetch(&self, identity: &IdentityKey) -> Result<Vec<RemoteCartLine>>;
    async fn add_line(&self, identity: &IdentityKey, request: AddLineRequest) -> Result<()>;
    async fn update_quantity(
        &self,
        identity: &IdentityKey,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()>;
    async fn delete_line(&self, identity: &IdentityKey, product_id: &ProductId) -> Result<()>;
    async fn clear(&self, identity: &IdentityKey) -> Result<()>;
}

/// Device-local persistence for the guest cart. Always reads and writes the full list.
#[async_trait]
pub trait LocalCartStore: Send + Sync {
    async fn read_all(&self) -> Result<Vec<CartLine>>;
    async fn write_all(&self, lines: &[CartLine]) -> Result<()>;
    async fn delete_all(&self) -> Result<()>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current(&self) -> Identity;
}

pub type RemoteCartStoreRef = Arc<dyn RemoteCartStore>;
pub type LocalCartStoreRef = Arc<dyn LocalCartStore>;
pub type IdentityProviderRef = Arc<dyn IdentityProvider>;
