//! Persistent storage on the ReDB embedded database.
//!
//! ```text
//! entries_v1 : key (string) -> value (string)
//! ```
//!
//! Keys written with a TTL (rate-limit counters) stay in a [`MemoryStore`]
//! and never reach the database.

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{MemoryStore, Store};
use crate::SrvError;

const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("entries_v1");

fn db_err(e: impl std::fmt::Display) -> SrvError {
    SrvError::Store(e.to_string())
}

fn join_err(e: tokio::task::JoinError) -> SrvError {
    SrvError::Store(format!("task join error: {e}"))
}

/// Store that keeps keys without a TTL in a ReDB database file.
pub struct RedbStore {
    db: Arc<Database>,
    volatile: MemoryStore,
}

impl RedbStore {
    /// Open or create the database at `path`, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();

        let db = tokio::task::spawn_blocking(move || -> crate::Result<Database> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let db = Database::create(&path).map_err(db_err)?;

            let write_txn = db.begin_write().map_err(db_err)?;
            {
                write_txn.open_table(ENTRIES).map_err(db_err)?;
            }
            write_txn.commit().map_err(db_err)?;

            info!(path = %path.display(), "opened redb store");
            Ok(db)
        })
        .await
        .map_err(join_err)??;

        Ok(Self {
            db: Arc::new(db),
            volatile: MemoryStore::new(),
        })
    }

    async fn read(&self, key: &str) -> crate::Result<Option<String>> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let read_txn = db.begin_read().map_err(db_err)?;
            let table = read_txn.open_table(ENTRIES).map_err(db_err)?;
            let value = table.get(key.as_str()).map_err(db_err)?;
            Ok(value.map(|access| access.value().to_string()))
        })
        .await
        .map_err(join_err)?
    }

    async fn write(&self, key: &str, value: String) -> crate::Result<()> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write().map_err(db_err)?;
            {
                let mut table = write_txn.open_table(ENTRIES).map_err(db_err)?;
                table.insert(key.as_str(), value.as_str()).map_err(db_err)?;
            }
            write_txn.commit().map_err(db_err)?;
            debug!(key = %key, "committed");
            Ok(())
        })
        .await
        .map_err(join_err)?
    }

    async fn remove(&self, key: &str) -> crate::Result<bool> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write().map_err(db_err)?;
            let removed = {
                let mut table = write_txn.open_table(ENTRIES).map_err(db_err)?;
                let removed = table.remove(key.as_str()).map_err(db_err)?.is_some();
                removed
            };
            write_txn.commit().map_err(db_err)?;
            Ok(removed)
        })
        .await
        .map_err(join_err)?
    }
}

#[async_trait]
impl Store for RedbStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        if let Some(value) = self.volatile.get(key).await? {
            return Ok(Some(value));
        }
        self.read(key).await
    }

    // The database commits first; the memory layer only changes once the
    // commit has succeeded.
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> crate::Result<()> {
        if ttl.is_some() {
            self.remove(key).await?;
            return self.volatile.put(key, value, ttl).await;
        }

        self.write(key, value).await?;
        self.volatile.delete(key).await
    }

    async fn delete(&self, key: &str) -> crate::Result<()> {
        self.remove(key).await?;
        self.volatile.delete(key).await
    }

    async fn incr(&self, key: &str, ttl: Duration) -> crate::Result<u64> {
        self.volatile.incr(key, ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_durable_keys_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.redb");

        {
            let store = RedbStore::open(&path).await.unwrap();
            store.put("domain_data", "{}".into(), None).await.unwrap();
            store.put("other", "x".into(), None).await.unwrap();
            store.delete("other").await.unwrap();
        }

        let store = RedbStore::open(&path).await.unwrap();
        assert_eq!(store.get("domain_data").await.unwrap().as_deref(), Some("{}"));
        assert!(store.get("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ttl_keys_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.redb");

        {
            let store = RedbStore::open(&path).await.unwrap();
            store
                .put("ratelimit:1.2.3.4:0", "3".into(), Some(Duration::from_secs(60)))
                .await
                .unwrap();
            assert_eq!(store.incr("counter", Duration::from_secs(60)).await.unwrap(), 1);
            assert_eq!(
                store.get("ratelimit:1.2.3.4:0").await.unwrap().as_deref(),
                Some("3")
            );
        }

        let store = RedbStore::open(&path).await.unwrap();
        assert!(store.get("ratelimit:1.2.3.4:0").await.unwrap().is_none());
        assert!(store.get("counter").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_database_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.redb");
        std::fs::write(&path, "not a database").unwrap();

        assert!(matches!(
            RedbStore::open(&path).await,
            Err(SrvError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_ttl_write_shadows_durable_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.redb");

        {
            let store = RedbStore::open(&path).await.unwrap();
            store.put("k", "durable".into(), None).await.unwrap();
            store
                .put("k", "volatile".into(), Some(Duration::from_secs(60)))
                .await
                .unwrap();
            assert_eq!(store.get("k").await.unwrap().as_deref(), Some("volatile"));
        }

        // the volatile write removed the durable copy
        let store = RedbStore::open(&path).await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());

        store.put("k", "durable again".into(), None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("durable again"));
    }

    #[tokio::test]
    async fn test_reads_match_writes_after_directory_removed() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        let store = RedbStore::open(sub.join("store.redb")).await.unwrap();
        store.put("domain_data", "old".into(), None).await.unwrap();

        std::fs::remove_dir_all(&sub).unwrap();

        match store.put("domain_data", "new".into(), None).await {
            Ok(()) => assert_eq!(store.get("domain_data").await.unwrap().as_deref(), Some("new")),
            Err(_) => assert_eq!(store.get("domain_data").await.unwrap().as_deref(), Some("old")),
        }

        let before = store.get("domain_data").await.unwrap();
        match store.delete("domain_data").await {
            Ok(()) => assert!(store.get("domain_data").await.unwrap().is_none()),
            Err(_) => assert_eq!(store.get("domain_data").await.unwrap(), before),
        }
    }
}
