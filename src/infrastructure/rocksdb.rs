use crate::domain::ports::SessionStore;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding session entries.
pub const CF_SESSION: &str = "session";

/// A persistent session store backed by RocksDB.
///
/// Keys and values are stored as UTF-8 bytes in the `session` column family.
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBSessionStore {
    db: Arc<DB>,
}

impl RocksDBSessionStore {
    /// Opens or creates a RocksDB instance at `path`, ensuring the session
    /// column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_session = ColumnFamilyDescriptor::new(CF_SESSION, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_session])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn missing_cf() -> SyncError {
        SyncError::InternalError(Box::new(std::io::Error::other(
            "Session column family not found",
        )))
    }
}

#[async_trait]
impl SessionStore for RocksDBSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cf = self.db.cf_handle(CF_SESSION).ok_or_else(Self::missing_cf)?;
        match self.db.get_cf(&cf, key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| SyncError::InternalError(Box::new(e))),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let cf = self.db.cf_handle(CF_SESSION).ok_or_else(Self::missing_cf)?;
        self.db.put_cf(&cf, key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let cf = self.db.cf_handle(CF_SESSION).ok_or_else(Self::missing_cf)?;
        self.db.delete_cf(&cf, key.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBSessionStore::open(dir.path()).expect("Failed to open RocksDB");
        assert!(store.db.cf_handle(CF_SESSION).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_session_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBSessionStore::open(dir.path()).unwrap();

        store.set("checkout-id", "chk-1").await.unwrap();
        assert_eq!(
            store.get("checkout-id").await.unwrap().as_deref(),
            Some("chk-1")
        );

        store.delete("checkout-id").await.unwrap();
        assert!(store.get("checkout-id").await.unwrap().is_none());
    }
}
