//! Fakes shared by the service's unit tests.

use async_trait::async_trait;
use gh_hosts_client::Resolve;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::store::{MemoryStore, Store};

/// Resolver answering from a mutable table, counting every call.
pub struct TableResolver {
    table: Mutex<HashMap<String, Ipv4Addr>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl TableResolver {
    pub fn new(pairs: &[(&str, [u8; 4])]) -> Arc<Self> {
        Self::with_delay(pairs, Duration::ZERO)
    }

    /// Like [`TableResolver::new`], sleeping `delay` before each answer.
    pub fn with_delay(pairs: &[(&str, [u8; 4])], delay: Duration) -> Arc<Self> {
        let table = pairs
            .iter()
            .map(|(d, ip)| ((*d).to_string(), Ipv4Addr::from(*ip)))
            .collect();
        Arc::new(Self {
            table: Mutex::new(table),
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    /// Answers for the three domains most tests use.
    pub fn github() -> Arc<Self> {
        Self::new(GITHUB_TABLE)
    }

    pub fn set(&self, domain: &str, ip: [u8; 4]) {
        self.table
            .lock()
            .unwrap()
            .insert(domain.to_string(), Ipv4Addr::from(ip));
    }

    pub fn clear(&self) {
        self.table.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resolve for TableResolver {
    async fn resolve(&self, domain: &str) -> Option<Ipv4Addr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.table.lock().unwrap().get(domain).copied()
    }
}

/// Domains answered by [`TableResolver::github`], in listing order.
pub const GITHUB_DOMAINS: [&str; 3] = ["github.com", "api.github.com", "gist.github.com"];

pub const GITHUB_TABLE: &[(&str, [u8; 4])] = &[
    ("github.com", [140, 82, 112, 3]),
    ("api.github.com", [140, 82, 112, 5]),
    ("gist.github.com", [140, 82, 112, 4]),
];

pub fn github_domains() -> Vec<String> {
    GITHUB_DOMAINS.iter().map(ToString::to_string).collect()
}

/// In-memory store counting every `put` and `delete`.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> crate::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> crate::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }
}
