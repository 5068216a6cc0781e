//! Read-through cache of per-domain resolution state.
//!
//! All records live in one [`CacheSnapshot`] stored under [`SNAPSHOT_KEY`].
//! Snapshot writes are serialized in-process and re-read under the lock, so
//! concurrent single-domain updates never clobber each other. Bulk rebuilds
//! are serialized separately so a burst of stale reads resolves the domain
//! list once.

use chrono::{TimeDelta, Utc};
use gh_hosts_client::{BatchConfig, BatchRefresher, Resolve};
use gh_hosts_core::{CacheSnapshot, DomainRecord, HostEntry, SNAPSHOT_KEY};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::store::{self, Store};

/// Domain cache backed by a [`Store`] and a [`Resolve`] implementation.
pub struct DomainCache {
    store: Arc<dyn Store>,
    resolver: Arc<dyn Resolve>,
    refresher: BatchRefresher,
    domains: Vec<String>,
    freshness: TimeDelta,
    write_lock: Mutex<()>,
    rebuild_lock: Mutex<()>,
}

impl DomainCache {
    /// Create a cache over `domains`, in listing order.
    pub fn new(
        store: Arc<dyn Store>,
        resolver: Arc<dyn Resolve>,
        batch: BatchConfig,
        domains: Vec<String>,
        freshness: Duration,
    ) -> Self {
        let refresher = BatchRefresher::new(Arc::clone(&resolver), batch);
        let freshness = TimeDelta::from_std(freshness).unwrap_or(TimeDelta::MAX);

        Self {
            store,
            resolver,
            refresher,
            domains,
            freshness,
            write_lock: Mutex::new(()),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Configured domains in listing order.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// All known `(ip, domain)` pairs, rebuilding the snapshot when stale.
    pub async fn get_all_domains(&self) -> Vec<HostEntry> {
        let snapshot = self.load().await;
        if !snapshot.is_stale(Utc::now(), self.freshness) {
            return snapshot.entries_in_order(&self.domains);
        }

        let _rebuilding = self.rebuild_lock.lock().await;

        // another caller may have rebuilt while we waited
        let snapshot = self.load().await;
        if !snapshot.is_stale(Utc::now(), self.freshness) {
            debug!("snapshot rebuilt by a concurrent caller");
            return snapshot.entries_in_order(&self.domains);
        }

        self.rebuild().await
    }

    /// Record for one domain, re-resolving it once it falls outside the
    /// freshness window.
    ///
    /// A failed resolution falls back to the stale record. `None` means the
    /// domain has never resolved.
    pub async fn get_domain(&self, domain: &str) -> Option<DomainRecord> {
        let snapshot = self.load().await;
        let existing = snapshot.get(domain).cloned();

        if let Some(record) = &existing {
            if record.is_fresh(Utc::now(), self.freshness) {
                debug!(domain, "serving fresh record");
                return existing;
            }
        }

        let Some(ip) = self.resolver.resolve(domain).await else {
            warn!(domain, stale = existing.is_some(), "resolution failed");
            return existing;
        };

        let _writing = self.write_lock.lock().await;
        let mut latest = self.load().await;
        let now = Utc::now();

        let record = match latest.get(domain) {
            Some(current) => {
                let mut record = current.clone();
                if record.observe(ip, now) {
                    info!(domain, %ip, "address changed");
                }
                record
            }
            None => DomainRecord::new(domain, ip, now),
        };

        latest.upsert(record.clone());
        self.save(&latest).await;
        Some(record)
    }

    /// Drop the snapshot and rebuild it from scratch.
    pub async fn reset(&self) -> Vec<HostEntry> {
        let _rebuilding = self.rebuild_lock.lock().await;

        {
            let _writing = self.write_lock.lock().await;
            if let Err(e) = self.store.delete(SNAPSHOT_KEY).await {
                warn!(error = %e, "failed to delete snapshot");
            }
        }
        info!("snapshot purged");

        self.rebuild().await
    }

    /// Rebuild the snapshot regardless of its age.
    pub async fn refresh(&self) -> Vec<HostEntry> {
        let _rebuilding = self.rebuild_lock.lock().await;
        self.rebuild().await
    }

    /// Resolve every domain and replace the snapshot with the result. An
    /// empty result leaves the stored snapshot untouched.
    async fn rebuild(&self) -> Vec<HostEntry> {
        let entries = self.refresher.refresh_all(&self.domains).await;

        if entries.is_empty() {
            warn!(
                domains = self.domains.len(),
                "bulk refresh resolved nothing, keeping previous snapshot"
            );
            return self.load().await.entries_in_order(&self.domains);
        }

        let _writing = self.write_lock.lock().await;
        let snapshot = CacheSnapshot::from_entries(&entries, Utc::now());
        self.save(&snapshot).await;

        info!(
            resolved = entries.len(),
            domains = self.domains.len(),
            "snapshot rebuilt"
        );
        entries
    }

    async fn load(&self) -> CacheSnapshot {
        match store::get_json::<CacheSnapshot>(self.store.as_ref(), SNAPSHOT_KEY).await {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to read snapshot, treating as empty");
                CacheSnapshot::default()
            }
        }
    }

    async fn save(&self, snapshot: &CacheSnapshot) {
        if let Err(e) = store::put_json(self.store.as_ref(), SNAPSHOT_KEY, snapshot).await {
            warn!(error = %e, "failed to write snapshot");
        }
    }
}
