use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DomainRecord, HostEntry};

/// Store key holding the serialized [`CacheSnapshot`].
pub const SNAPSHOT_KEY: &str = "domain_data";

/// All cached domain records, stored and replaced as a single blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Records keyed by domain
    #[serde(default)]
    pub domain_data: BTreeMap<String, DomainRecord>,

    /// Time of the last write of the snapshot as a whole
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl CacheSnapshot {
    /// Build a full snapshot from freshly resolved entries
    #[must_use]
    pub fn from_entries(entries: &[HostEntry], now: DateTime<Utc>) -> Self {
        let domain_data = entries
            .iter()
            .map(|e| (e.domain().to_string(), DomainRecord::new(e.domain(), e.ip(), now)))
            .collect();

        Self {
            domain_data,
            last_updated: Some(now),
        }
    }

    /// Look up the record for `domain`
    #[must_use]
    pub fn get(&self, domain: &str) -> Option<&DomainRecord> {
        self.domain_data.get(domain)
    }

    /// Insert or replace a record and stamp the snapshot write time
    pub fn upsert(&mut self, record: DomainRecord) {
        self.last_updated = Some(record.last_checked);
        self.domain_data.insert(record.domain.clone(), record);
    }

    /// Returns true if the snapshot needs a full rebuild: never written,
    /// older than `window`, or holding no records
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        match self.last_updated {
            None => true,
            Some(_) if self.domain_data.is_empty() => true,
            Some(written) => now - written > window,
        }
    }

    /// Project records into `(ip, domain)` pairs following `order`,
    /// skipping domains without a record
    #[must_use]
    pub fn entries_in_order<S: AsRef<str>>(&self, order: &[S]) -> Vec<HostEntry> {
        order
            .iter()
            .filter_map(|d| self.get(d.as_ref()))
            .map(DomainRecord::to_entry)
            .collect()
    }

    /// Number of cached records
    #[must_use]
    pub fn len(&self) -> usize {
        self.domain_data.len()
    }

    /// Returns true if no records are cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain_data.is_empty()
    }
}
