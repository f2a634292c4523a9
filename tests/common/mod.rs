#![allow(dead_code)]

use async_trait::async_trait;
use cartkeeper::application::engine::CartEngine;
use cartkeeper::domain::identity::{IdentityKey, SessionIdentity};
use cartkeeper::domain::line::{AddLineRequest, CartLine, Product, ProductId, RemoteCartLine};
use cartkeeper::domain::ports::{LocalCartStore, RemoteCartStore};
use cartkeeper::error::{CartError, Result};
use cartkeeper::infrastructure::in_memory::{InMemoryLocalCartStore, InMemoryRemoteCartStore};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, Notify, oneshot};

pub fn product(id: &str, price: Decimal) -> Product {
    Product::new(id, format!("Product {id}"), "Grocery", price).unwrap()
}

/// Remote store that fails on demand with a transient error.
#[derive(Clone)]
pub struct FlakyRemoteCartStore {
    pub inner: InMemoryRemoteCartStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    /// Writes still allowed before every further write fails; `usize::MAX` disables the limit.
    writes_left: Arc<AtomicUsize>,
}

impl Default for FlakyRemoteCartStore {
    fn default() -> Self {
        Self {
            inner: InMemoryRemoteCartStore::new(),
            fail_reads: Arc::default(),
            fail_writes: Arc::default(),
            writes_left: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }
}

impl FlakyRemoteCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `successes` more writes through, then fails every write after them.
    pub fn fail_writes_after(&self, successes: usize) {
        self.writes_left.store(successes, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Fails every write while set. Clearing it also lifts any write limit.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
        if !fail {
            self.writes_left.store(usize::MAX, Ordering::SeqCst);
        }
    }

    fn check(&self, flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(CartError::TransientStore("503 Service Unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<()> {
        self.check(&self.fail_writes)?;
        let limited = self
            .writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                usize::MAX => Some(left),
                0 => None,
                _ => Some(left - 1),
            });
        match limited {
            Ok(_) => Ok(()),
            Err(_) => Err(CartError::TransientStore("503 Service Unavailable".to_string())),
        }
    }
}

#[async_trait]
impl RemoteCartStore for FlakyRemoteCartStore {
    async fn fetch(&self, identity: &IdentityKey) -> Result<Vec<RemoteCartLine>> {
        self.check(&self.fail_reads)?;
        self.inner.fetch(identity).await
    }

    async fn add_line(&self, identity: &IdentityKey, request: AddLineRequest) -> Result<()> {
        self.check_write()?;
        self.inner.add_line(identity, request).await
    }

    async fn update_quantity(
        &self,
        identity: &IdentityKey,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        self.check_write()?;
        self.inner.update_quantity(identity, product_id, quantity).await
    }

    async fn delete_line(&self, identity: &IdentityKey, product_id: &ProductId) -> Result<()> {
        self.check_write()?;
        self.inner.delete_line(identity, product_id).await
    }

    async fn clear(&self, identity: &IdentityKey) -> Result<()> {
        self.check_write()?;
        self.inner.clear(identity).await
    }
}

/// Local store whose medium can be switched to "full".
#[derive(Default, Clone)]
pub struct FullableLocalCartStore {
    pub inner: InMemoryLocalCartStore,
    full: Arc<AtomicBool>,
}

impl FullableLocalCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_full(&self, full: bool) {
        self.full.store(full, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.full.load(Ordering::SeqCst) {
            Err(CartError::StorageUnavailable("QuotaExceededError".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LocalCartStore for FullableLocalCartStore {
    async fn read_all(&self) -> Result<Vec<CartLine>> {
        self.inner.read_all().await
    }

    async fn write_all(&self, lines: &[CartLine]) -> Result<()> {
        self.check()?;
        self.inner.write_all(lines).await
    }

    async fn delete_all(&self) -> Result<()> {
        self.check()?;
        self.inner.delete_all().await
    }
}

/// Remote store whose next fetch can be held open.
///
/// An armed fetch reads the cart immediately, signals `entered`, and only returns
/// that (by then stale) data once the release sender fires.
#[derive(Default, Clone)]
pub struct GatedRemoteCartStore {
    pub inner: InMemoryRemoteCartStore,
    gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    pub entered: Arc<Notify>,
}

impl GatedRemoteCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn arm(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().await = Some(rx);
        tx
    }
}

#[async_trait]
impl RemoteCartStore for GatedRemoteCartStore {
    async fn fetch(&self, identity: &IdentityKey) -> Result<Vec<RemoteCartLine>> {
        let lines = self.inner.fetch(identity).await?;
        let gate = self.gate.lock().await.take();
        if let Some(release) = gate {
            self.entered.notify_one();
            let _ = release.await;
        }
        Ok(lines)
    }

    async fn add_line(&self, identity: &IdentityKey, request: AddLineRequest) -> Result<()> {
        self.inner.add_line(identity, request).await
    }

    async fn update_quantity(
        &self,
        identity: &IdentityKey,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        self.inner.update_quantity(identity, product_id, quantity).await
    }

    async fn delete_line(&self, identity: &IdentityKey, product_id: &ProductId) -> Result<()> {
        self.inner.delete_line(identity, product_id).await
    }

    async fn clear(&self, identity: &IdentityKey) -> Result<()> {
        self.inner.clear(identity).await
    }
}

pub fn engine_with<R, L>(remote: &R, local: &L, session: &SessionIdentity) -> CartEngine
where
    R: RemoteCartStore + Clone + 'static,
    L: LocalCartStore + Clone + 'static,
{
    CartEngine::new(
        Arc::new(remote.clone()),
        Arc::new(local.clone()),
        Arc::new(session.clone()),
    )
}

/// Writes a command script with `rows` guest adds spread over ten products.
pub fn generate_script(path: &Path, rows: usize) -> std::result::Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record([
        "command", "product", "name", "category", "price", "quantity", "identity",
    ])?;

    for i in 1..=rows {
        let id = format!("p{}", i % 10);
        wtr.write_record(["add", id.as_str(), id.as_str(), "Bulk", "1.25", "1", ""])?;
    }

    wtr.flush()?;
    Ok(())
}
