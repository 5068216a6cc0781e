//! Client configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A named DNS-over-HTTPS endpoint speaking the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DohProvider {
    /// Short name used to select the provider
    pub name: String,

    /// Query endpoint, e.g. `https://dns.google/resolve`
    pub url: String,
}

impl DohProvider {
    /// Create a provider
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Cloudflare's JSON endpoint
    #[must_use]
    pub fn cloudflare() -> Self {
        Self::new("cloudflare", "https://cloudflare-dns.com/dns-query")
    }

    /// Google Public DNS JSON endpoint
    #[must_use]
    pub fn google() -> Self {
        Self::new("google", "https://dns.google/resolve")
    }

    /// Built-in provider list; the first entry is the default
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![Self::cloudflare(), Self::google()]
    }
}

/// Retry configuration for failed DoH requests
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first request
    pub max_retries: u32,

    /// Initial backoff duration
    pub initial_backoff: Duration,

    /// Maximum backoff duration
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfig {
    /// Three retries at 1s, 2s and 4s
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }

    /// Set maximum retries
    #[must_use]
    pub const fn max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set initial backoff duration
    #[must_use]
    pub const fn initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    /// Set maximum backoff duration
    #[must_use]
    pub const fn max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Calculate backoff for a given (zero-based) retry
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let initial = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        let backoff = initial.saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(backoff.min(max))
    }
}

/// Batch refresh tuning
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Domains resolved concurrently per batch
    pub batch_size: usize,

    /// Pause between consecutive batches
    pub delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_schedule() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.backoff_for(0), Duration::from_secs(1));
        assert_eq!(retry.backoff_for(1), Duration::from_secs(2));
        assert_eq!(retry.backoff_for(2), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetryConfig::new().max_backoff(Duration::from_secs(3));
        assert_eq!(retry.backoff_for(2), Duration::from_secs(3));
        assert_eq!(retry.backoff_for(40), Duration::from_secs(3));
    }

    #[test]
    fn test_default_providers() {
        let providers = DohProvider::defaults();
        assert_eq!(providers[0].name, "cloudflare");
        assert!(providers.iter().all(|p| p.url.starts_with("https://")));
    }
}
