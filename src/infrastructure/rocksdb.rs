use crate::domain::line::CartLine;
use crate::domain::ports::LocalCartStore;
use crate::error::{CartError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the guest cart.
pub const CF_LOCAL_CART: &str = "local_cart";
/// Key under which the serialized guest line list is stored.
pub const LOCAL_CART_KEY: &[u8] = b"localCart";

/// A durable guest cart backed by RocksDB.
///
/// The whole line list lives under a single key as a JSON array, matching the
/// read-all / write-all contract of [`LocalCartStore`]. Medium failures surface as
/// `StorageUnavailable`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBLocalCartStore {
    db: Arc<DB>,
}

impl RocksDBLocalCartStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_local_cart = ColumnFamilyDescriptor::new(CF_LOCAL_CART, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_local_cart]).map_err(unavailable)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_LOCAL_CART).ok_or_else(|| {
            CartError::StorageUnavailable("Local cart column family not found".to_string())
        })
    }
}

fn unavailable(e: rocksdb::Error) -> CartError {
    CartError::StorageUnavailable(e.to_string())
}

#[async_trait]
impl LocalCartStore for RocksDBLocalCartStore {
    async fn read_all(&self) -> Result<Vec<CartLine>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, LOCAL_CART_KEY).map_err(unavailable)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write_all(&self, lines: &[CartLine]) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(lines)?;
        self.db
            .put_cf(cf, LOCAL_CART_KEY, value)
            .map_err(unavailable)
    }

    async fn delete_all(&self) -> Result<()> {
        let cf = self.cf()?;
        self.db.delete_cf(cf, LOCAL_CART_KEY).map_err(unavailable)
    }
}
