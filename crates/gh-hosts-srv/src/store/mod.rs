//! Key-value storage behind the domain cache and the rate limiter.
//!
//! Values are opaque strings. Keys written with a TTL expire on their own;
//! keys written without one persist until overwritten or deleted.

mod memory;
mod redb;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub use memory::MemoryStore;
pub use self::redb::RedbStore;

/// A string key-value store with optional per-key expiry.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read `key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> crate::Result<Option<String>>;

    /// Write `key`, replacing any previous value and expiry.
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> crate::Result<()>;

    /// Remove `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> crate::Result<()>;

    /// Add one to the counter at `key` and return the new count.
    ///
    /// A missing or unparseable value counts as zero. The TTL is reset on
    /// every increment.
    async fn incr(&self, key: &str, ttl: Duration) -> crate::Result<u64> {
        let current = self
            .get(key)
            .await?
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let next = current.saturating_add(1);
        self.put(key, next.to_string(), Some(ttl)).await?;
        Ok(next)
    }
}

/// Read and decode a JSON value.
pub async fn get_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> crate::Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value without expiry.
pub async fn put_json<T: Serialize + Sync>(store: &dyn Store, key: &str, value: &T) -> crate::Result<()> {
    let raw = serde_json::to_string(value)?;
    store.put(key, raw, None).await
}
