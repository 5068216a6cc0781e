use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

use super::Store;

/// Writes between sweeps of expired keys.
const SWEEP_EVERY: u64 = 256;

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Process-local store. Nothing survives a restart.
///
/// Expired keys are hidden on read and reclaimed by a periodic sweep on
/// the write path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Slot>>,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired key, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| slot.is_live(now));
        before - slots.len()
    }

    /// Number of keys held, including expired ones not yet swept.
    pub async fn key_count(&self) -> usize {
        self.slots.read().await.len()
    }

    async fn after_write(&self) {
        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            let removed = self.purge_expired().await;
            let remaining = self.key_count().await;
            trace!(removed, remaining, "swept expired keys");
        }
    }
}

/// Expiry instant for `ttl`. A TTL past the clock's range never expires.
fn deadline(ttl: Option<Duration>) -> Option<Instant> {
    ttl.and_then(|ttl| Instant::now().checked_add(ttl))
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        let now = Instant::now();
        let slots = self.slots.read().await;
        Ok(slots
            .get(key)
            .filter(|slot| slot.is_live(now))
            .map(|slot| slot.value.clone()))
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> crate::Result<()> {
        let slot = Slot {
            value,
            expires_at: deadline(ttl),
        };
        self.slots.write().await.insert(key.to_string(), slot);
        self.after_write().await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> crate::Result<()> {
        self.slots.write().await.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str, ttl: Duration) -> crate::Result<u64> {
        let now = Instant::now();
        let next = {
            let mut slots = self.slots.write().await;
            let current = slots
                .get(key)
                .filter(|slot| slot.is_live(now))
                .and_then(|slot| slot.value.parse::<u64>().ok())
                .unwrap_or(0);
            let next = current.saturating_add(1);
            slots.insert(
                key.to_string(),
                Slot {
                    value: next.to_string(),
                    expires_at: now.checked_add(ttl),
                },
            );
            next
        };
        self.after_write().await;
        Ok(next)
    }
}
