use crate::domain::cart;
use crate::domain::identity::{Identity, IdentityKey};
use crate::domain::line::{AddLineRequest, CartLine, Product, ProductId, Quantity};
use crate::domain::ports::{IdentityProviderRef, LocalCartStoreRef, RemoteCartStoreRef};
use crate::domain::snapshot::{CartSnapshot, Totals};
use crate::domain::summary::{OrderSummary, PricingConfig};
use crate::error::{CartError, ErrorKind, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Lifecycle tag of a [`CartEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartStatus {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Mutating,
    /// The last operation failed; the snapshot is the one from before it.
    Error(ErrorKind),
}

#[derive(Debug, Default)]
struct EngineState {
    snapshot: CartSnapshot,
    status: CartStatus,
    last_error: Option<String>,
    /// Sequence number of the read that produced `snapshot`.
    applied_seq: u64,
    /// Identity the current snapshot belongs to.
    identity: Option<Identity>,
}

/// Snapshot produced by an operation, tagged with the sequence number of the read
/// that observed it.
struct Observed {
    seq: u64,
    snapshot: CartSnapshot,
}

/// Owns one cart: routes every operation to the remote store (signed in) or the
/// local store (guest) and keeps the last good snapshot.
///
/// Mutations are queued behind an async mutex so at most one is in flight.
/// Every read that produces a snapshot draws a sequence number when it starts,
/// and a result is applied only if no newer read has been applied meanwhile.
/// A `load` racing a mutation therefore can never overwrite the mutation's result
/// with data fetched before it.
pub struct CartEngine {
    remote: RemoteCartStoreRef,
    local: LocalCartStoreRef,
    identity: IdentityProviderRef,
    state: Mutex<EngineState>,
    mutations: tokio::sync::Mutex<()>,
    issued: AtomicU64,
}

impl CartEngine {
    pub fn new(
        remote: RemoteCartStoreRef,
        local: LocalCartStoreRef,
        identity: IdentityProviderRef,
    ) -> Self {
        Self {
            remote,
            local,
            identity,
            state: Mutex::new(EngineState::default()),
            mutations: tokio::sync::Mutex::new(()),
            issued: AtomicU64::new(0),
        }
    }

    /// The last successfully applied snapshot.
    pub fn snapshot(&self) -> CartSnapshot {
        self.lock_state().snapshot.clone()
    }

    pub fn status(&self) -> CartStatus {
        self.lock_state().status
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Leaves the `Error` state without touching the cart.
    pub fn clear_error(&self) {
        let mut state = self.lock_state();
        if let CartStatus::Error(_) = state.status {
            state.status = CartStatus::Ready;
        }
        state.last_error = None;
    }

    pub fn totals(&self) -> Totals {
        self.lock_state().snapshot.totals()
    }

    pub fn item_quantity(&self, product_id: &ProductId) -> u32 {
        self.lock_state().snapshot.item_quantity(product_id)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lock_state().snapshot.contains(product_id)
    }

    pub fn summary(&self, config: &PricingConfig) -> Result<OrderSummary> {
        OrderSummary::compute(&self.lock_state().snapshot, config)
    }

    /// Loads the cart for the current identity.
    ///
    /// A failed remote fetch falls back to the local store without an error.
    pub async fn load(&self) -> Result<CartSnapshot> {
        let identity = self.identity.current().await;
        self.begin(CartStatus::Loading);
        debug!(identity = %identity, "loading cart");
        let result = self.read_for(&identity).await;
        self.settle(result, identity)
    }

    /// Adds `quantity` of `product`. Quantities below one are rejected before any I/O.
    pub async fn add_item(&self, product: &Product, quantity: i64) -> Result<CartSnapshot> {
        let quantity = match Quantity::try_from(quantity) {
            Ok(quantity) => quantity,
            Err(e) => return Err(self.fail(e)),
        };
        let _guard = self.mutations.lock().await;
        let identity = self.identity.current().await;
        self.begin(CartStatus::Mutating);
        debug!(identity = %identity, product_id = %product.id, quantity = quantity.get(), "adding item");

        let result = match &identity {
            Identity::Authenticated(key) => self.add_remote(key, product, quantity).await,
            Identity::Guest => {
                self.rewrite_local(|lines| {
                    cart::add_line(lines, product, quantity)?;
                    Ok(true)
                })
                .await
            }
        };
        self.settle(result, identity)
    }

    /// Sets a line's quantity. Zero or less removes the line.
    ///
    /// A product missing from a guest cart is a no-op; the remote store reports
    /// its own `NotFound`.
    pub async fn update_item(
        &self,
        product_id: &ProductId,
        new_quantity: i64,
    ) -> Result<CartSnapshot> {
        if new_quantity <= 0 {
            return self.remove_item(product_id).await;
        }
        let quantity = match Quantity::try_from(new_quantity) {
            Ok(quantity) => quantity,
            Err(e) => return Err(self.fail(e)),
        };
        let _guard = self.mutations.lock().await;
        let identity = self.identity.current().await;
        self.begin(CartStatus::Mutating);
        debug!(identity = %identity, product_id = %product_id, quantity = quantity.get(), "updating item");

        let result = match &identity {
            Identity::Authenticated(key) => {
                match self
                    .remote
                    .update_quantity(key, product_id, quantity.get())
                    .await
                {
                    Ok(()) => self.fetch_remote(key).await,
                    Err(e) => Err(e),
                }
            }
            Identity::Guest => {
                self.rewrite_local(|lines| {
                    Ok(cart::set_quantity(lines, product_id, i64::from(quantity.get())))
                })
                .await
            }
        };
        self.settle(result, identity)
    }

    /// Removes a line if present.
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<CartSnapshot> {
        let _guard = self.mutations.lock().await;
        let identity = self.identity.current().await;
        self.begin(CartStatus::Mutating);
        debug!(identity = %identity, product_id = %product_id, "removing item");

        let result = match &identity {
            Identity::Authenticated(key) => match self.remote.delete_line(key, product_id).await {
                Ok(()) => self.fetch_remote(key).await,
                Err(e) => Err(e),
            },
            Identity::Guest => {
                self.rewrite_local(|lines| Ok(cart::remove_line(lines, product_id)))
                    .await
            }
        };
        self.settle(result, identity)
    }

    /// Empties the cart.
    pub async fn clear(&self) -> Result<CartSnapshot> {
        let _guard = self.mutations.lock().await;
        let identity = self.identity.current().await;
        self.begin(CartStatus::Mutating);
        debug!(identity = %identity, "clearing cart");

        let result = match &identity {
            Identity::Authenticated(key) => self.remote.clear(key).await,
            Identity::Guest => self.local.delete_all().await,
        }
        .map(|()| Observed {
            seq: self.next_seq(),
            snapshot: CartSnapshot::empty(),
        });
        self.settle(result, identity)
    }

    /// Empties the cart after an order has been placed.
    pub async fn order_placed(&self) -> Result<CartSnapshot> {
        let snapshot = self.clear().await?;
        info!("cart emptied after order placement");
        Ok(snapshot)
    }

    /// Re-reads the identity collaborator and reconciles the cart with it.
    ///
    /// On a transition into a signed-in identity the guest cart is merged into
    /// the remote cart (quantities summed per product) and drained from the local
    /// store. Any other state (guest, logout, same identity) is a plain
    /// [`load`](Self::load).
    pub async fn identity_changed(&self) -> Result<CartSnapshot> {
        let _guard = self.mutations.lock().await;
        let identity = self.identity.current().await;
        let previous = self.lock_state().identity.clone();

        let signed_in = match &identity {
            Identity::Authenticated(key) if previous.as_ref() != Some(&identity) => {
                Some(key.clone())
            }
            _ => None,
        };
        let Some(key) = signed_in else {
            self.begin(CartStatus::Loading);
            debug!(identity = %identity, "identity unchanged or signed out, reloading");
            let result = self.read_for(&identity).await;
            return self.settle(result, identity);
        };

        self.begin(CartStatus::Mutating);
        let result = self.merge_guest_cart(&key).await;
        self.settle(result, identity)
    }

    /// Uploads guest lines one at a time through the remote add, which sums
    /// quantities for products already in the remote cart.
    ///
    /// Each uploaded line is dropped from the local store before the next one is
    /// sent, so a retry after a failure only uploads what is still pending.
    async fn merge_guest_cart(&self, key: &IdentityKey) -> Result<Observed> {
        let mut pending = self.local.read_all().await?;
        if pending.is_empty() {
            debug!(identity = %key, "no guest cart to merge");
            return self.fetch_remote(key).await;
        }

        let guest_lines = pending.len();
        while let Some(line) = pending.first() {
            let request = AddLineRequest::from_line(line)?;
            self.remote.add_line(key, request).await?;
            pending.remove(0);
            if pending.is_empty() {
                self.local.delete_all().await?;
            } else {
                self.local.write_all(&pending).await?;
            }
        }
        info!(identity = %key, guest_lines, "merged guest cart into remote cart");

        self.fetch_remote(key).await
    }

    async fn add_remote(
        &self,
        key: &IdentityKey,
        product: &Product,
        quantity: Quantity,
    ) -> Result<Observed> {
        let request = AddLineRequest::new(product, quantity)?;
        self.remote.add_line(key, request).await?;
        self.fetch_remote(key).await
    }

    async fn read_for(&self, identity: &Identity) -> Result<Observed> {
        match identity {
            Identity::Authenticated(key) => match self.fetch_remote(key).await {
                Ok(observed) => Ok(observed),
                Err(e) => {
                    warn!(identity = %key, error = %e, "remote cart unavailable, using local cart");
                    self.read_local().await
                }
            },
            Identity::Guest => self.read_local().await,
        }
    }

    async fn fetch_remote(&self, key: &IdentityKey) -> Result<Observed> {
        let seq = self.next_seq();
        let lines = self
            .remote
            .fetch(key)
            .await?
            .into_iter()
            .map(CartLine::from)
            .collect();
        Ok(Observed {
            seq,
            snapshot: CartSnapshot::from_lines(lines)?,
        })
    }

    async fn read_local(&self) -> Result<Observed> {
        let seq = self.next_seq();
        let lines = self.local.read_all().await?;
        Ok(Observed {
            seq,
            snapshot: CartSnapshot::from_lines(lines)?,
        })
    }

    /// Applies `edit` to the stored guest lines and persists them if it reports a change.
    ///
    /// Totals are computed before anything is written, so an edit that leaves the
    /// currency range is rejected without touching the store.
    async fn rewrite_local<F>(&self, edit: F) -> Result<Observed>
    where
        F: FnOnce(&mut Vec<CartLine>) -> Result<bool>,
    {
        let mut lines = self.local.read_all().await?;
        let changed = edit(&mut lines)?;
        let snapshot = CartSnapshot::from_lines(lines)?;
        if changed {
            self.local.write_all(snapshot.lines()).await?;
        }
        Ok(Observed {
            seq: self.next_seq(),
            snapshot,
        })
    }

    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn begin(&self, status: CartStatus) {
        self.lock_state().status = status;
    }

    fn settle(&self, result: Result<Observed>, identity: Identity) -> Result<CartSnapshot> {
        match result {
            Ok(observed) => Ok(self.apply(observed, identity)),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn apply(&self, observed: Observed, identity: Identity) -> CartSnapshot {
        let mut state = self.lock_state();
        if observed.seq <= state.applied_seq {
            warn!(
                seq = observed.seq,
                applied = state.applied_seq,
                "discarding stale cart response"
            );
            return state.snapshot.clone();
        }
        state.snapshot = observed.snapshot;
        state.applied_seq = observed.seq;
        state.status = CartStatus::Ready;
        state.last_error = None;
        state.identity = Some(identity);
        state.snapshot.clone()
    }

    fn fail(&self, error: CartError) -> CartError {
        warn!(error = %error, "cart operation failed");
        let mut state = self.lock_state();
        state.status = CartStatus::Error(error.kind());
        state.last_error = Some(error.to_string());
        error
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
