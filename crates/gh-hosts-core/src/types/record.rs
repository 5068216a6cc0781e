use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Cached resolution state of a single domain.
///
/// `last_updated` only moves when the IP changes, `last_checked` moves on
/// every successful resolution, so `last_updated <= last_checked` holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    /// Domain name (the snapshot key)
    pub domain: String,

    /// Last resolved IPv4 address
    pub ip: Ipv4Addr,

    /// When the IP last changed
    pub last_updated: DateTime<Utc>,

    /// When a resolution last succeeded
    pub last_checked: DateTime<Utc>,
}

impl DomainRecord {
    /// Create a freshly resolved record
    #[must_use]
    pub fn new(domain: impl Into<String>, ip: Ipv4Addr, now: DateTime<Utc>) -> Self {
        Self {
            domain: domain.into(),
            ip,
            last_updated: now,
            last_checked: now,
        }
    }

    /// Returns true if the record was checked less than `window` ago
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        now - self.last_checked < window
    }

    /// Record a successful resolution.
    ///
    /// Returns true if the IP changed.
    pub fn observe(&mut self, ip: Ipv4Addr, now: DateTime<Utc>) -> bool {
        self.last_checked = now;
        if self.ip == ip {
            return false;
        }
        self.ip = ip;
        self.last_updated = now;
        true
    }

    /// The `(ip, domain)` pair for hosts listings
    #[must_use]
    pub fn to_entry(&self) -> HostEntry {
        HostEntry::new(self.ip, self.domain.clone())
    }
}

/// An `(ip, domain)` pair, serialized as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry(pub Ipv4Addr, pub String);

impl HostEntry {
    /// Create a new entry
    #[must_use]
    pub fn new(ip: Ipv4Addr, domain: impl Into<String>) -> Self {
        Self(ip, domain.into())
    }

    /// Resolved address
    #[must_use]
    pub const fn ip(&self) -> Ipv4Addr {
        self.0
    }

    /// Domain name
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_observe_same_ip_only_touches_last_checked() {
        let ip: Ipv4Addr = "140.82.112.3".parse().unwrap();
        let mut record = DomainRecord::new("github.com", ip, ts(1_000));

        assert!(!record.observe(ip, ts(5_000)));
        assert_eq!(record.last_updated, ts(1_000));
        assert_eq!(record.last_checked, ts(5_000));
    }

    #[test]
    fn test_observe_new_ip_moves_both() {
        let mut record = DomainRecord::new("github.com", "140.82.112.3".parse().unwrap(), ts(1_000));

        assert!(record.observe("140.82.112.4".parse().unwrap(), ts(5_000)));
        assert_eq!(record.ip.to_string(), "140.82.112.4");
        assert_eq!(record.last_updated, ts(5_000));
        assert_eq!(record.last_checked, ts(5_000));
    }

    #[test]
    fn test_freshness_window() {
        let record = DomainRecord::new("github.com", Ipv4Addr::LOCALHOST, ts(0));
        let hour = TimeDelta::hours(1);
        assert!(record.is_fresh(ts(3_599), hour));
        assert!(!record.is_fresh(ts(3_600), hour));
    }

    #[test]
    fn test_record_json_shape() {
        let record = DomainRecord::new("github.com", "140.82.112.3".parse().unwrap(), ts(0));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["domain"], "github.com");
        assert_eq!(json["ip"], "140.82.112.3");
        assert_eq!(json["lastUpdated"], "1970-01-01T00:00:00Z");
        assert_eq!(json["lastChecked"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_host_entry_is_a_pair() {
        let entry = HostEntry::new("140.82.112.3".parse().unwrap(), "github.com");
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"["140.82.112.3","github.com"]"#
        );
    }
}
