//! Service configuration for gh-hosts.

use gh_hosts_client::{BatchConfig, DohProvider, ResolverClient, RetryConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::hosts_file::{CONTENT_PLACEHOLDER, DEFAULT_TEMPLATE};

/// Directory name under the platform config/data dirs.
const APP_DIR: &str = "gh-hosts";

/// Upper bound for windows and periods given in seconds (366 days).
pub const MAX_PERIOD_SECS: u64 = 366 * 24 * 60 * 60;

/// Configuration for a gh-hosts service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address (default: 0.0.0.0:8787).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Admin key required by `POST /reset`. Reset is refused when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Key-value store backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// Freshness and scheduled refresh.
    #[serde(default)]
    pub cache: CacheConfig,

    /// DNS-over-HTTPS resolution.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Request rate limits.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Served domains and hosts-file rendering.
    #[serde(default)]
    pub hosts: HostsConfig,
}

/// Key-value store backend selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Keep everything in memory (nothing survives a restart).
    #[serde(default)]
    pub memory: bool,

    /// ReDB database for durable keys (default: platform data dir).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Cache freshness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Records checked less than this many seconds ago are served as-is.
    #[serde(default = "default_hour")]
    pub freshness_secs: u64,

    /// Scheduled full refresh period in seconds (0 disables the scheduler).
    #[serde(default = "default_hour")]
    pub refresh_interval_secs: u64,
}

/// DoH resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Providers in preference order; the first is the default.
    #[serde(default = "DohProvider::defaults")]
    pub providers: Vec<DohProvider>,

    /// Retries after the first failed query.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First retry delay in milliseconds, doubled on each retry.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional cap on outbound DoH queries per second.
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Domains resolved concurrently during a bulk refresh.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between bulk refresh batches in milliseconds.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

/// Fixed-window rate limits (requests per window per client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Limit applied to every route.
    #[serde(default = "default_global_limit")]
    pub global: u32,

    /// Stricter limit for `POST /reset`.
    #[serde(default = "default_reset_limit")]
    pub reset: u32,

    /// Stricter limit for `GET /{domain}`.
    #[serde(default = "default_domain_limit")]
    pub domain: u32,
}

/// Served domains and hosts-file rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostsConfig {
    /// Allow-list of resolvable domains, in listing order.
    #[serde(default = "gh_hosts_core::default_domains")]
    pub domains: Vec<String>,

    /// Hosts file template with `{content}` and `{updateTime}` placeholders.
    #[serde(default = "default_template")]
    pub template: String,

    /// UTC offset (hours) used for the generation timestamp.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,

    /// HTML page served at `/` instead of the built-in one.
    #[serde(default)]
    pub index_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            api_key: None,
            log_level: default_log_level(),
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
            resolver: ResolverConfig::default(),
            rate_limit: RateLimitConfig::default(),
            hosts: HostsConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_secs: default_hour(),
            refresh_interval_secs: default_hour(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            providers: DohProvider::defaults(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: None,
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            global: default_global_limit(),
            reset: default_reset_limit(),
            domain: default_domain_limit(),
        }
    }
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            domains: gh_hosts_core::default_domains(),
            template: default_template(),
            utc_offset_hours: default_utc_offset(),
            index_path: None,
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::SrvError::Config(e.to_string()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Default config file path (`<config dir>/gh-hosts/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Durable store file, falling back to `<data dir>/gh-hosts/store.redb`.
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store
            .path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR).join("store.redb")))
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: &str| Err(crate::SrvError::Config(msg.to_string()));

        if self.hosts.domains.is_empty() {
            return invalid("hosts.domains must not be empty");
        }
        if self.hosts.domains.iter().any(|d| d.trim().is_empty()) {
            return invalid("hosts.domains contains an empty entry");
        }
        if !self.hosts.template.contains(CONTENT_PLACEHOLDER) {
            return invalid("hosts.template must contain {content}");
        }
        if !(-23..=23).contains(&self.hosts.utc_offset_hours) {
            return invalid("hosts.utc_offset_hours must be within -23..=23");
        }
        if self.resolver.providers.is_empty() {
            return invalid("resolver.providers must not be empty");
        }
        if self.resolver.batch_size == 0 {
            return invalid("resolver.batch_size must be at least 1");
        }
        if self.rate_limit.window_secs == 0 {
            return invalid("rate_limit.window_secs must be at least 1");
        }
        if [self.rate_limit.global, self.rate_limit.reset, self.rate_limit.domain].contains(&0) {
            return invalid("rate limits must be at least 1");
        }
        if self.cache.freshness_secs == 0 {
            return invalid("cache.freshness_secs must be at least 1");
        }
        if [
            self.rate_limit.window_secs,
            self.cache.freshness_secs,
            self.cache.refresh_interval_secs,
        ]
        .iter()
        .any(|&secs| secs > MAX_PERIOD_SECS)
        {
            return invalid("windows and intervals must not exceed 366 days");
        }
        Ok(())
    }
}

impl CacheConfig {
    /// Freshness window as a duration.
    pub const fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    /// Scheduler period, `None` when disabled.
    pub const fn refresh_interval(&self) -> Option<Duration> {
        if self.refresh_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.refresh_interval_secs))
        }
    }
}

impl ResolverConfig {
    /// Build a resolver client with every setting in this table applied.
    pub fn client(&self) -> gh_hosts_core::Result<ResolverClient> {
        ResolverClient::builder()
            .providers(self.providers.clone())
            .retry(self.retry_config())
            .timeout(self.timeout())
            .requests_per_second(self.requests_per_second)
            .build()
    }

    /// Retry policy for the resolver client.
    pub const fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_retries(self.max_retries)
            .initial_backoff(Duration::from_millis(self.initial_backoff_ms))
    }

    /// Batch policy for bulk refreshes.
    pub const fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            batch_size: self.batch_size,
            delay: Duration::from_millis(self.batch_delay_ms),
        }
    }

    /// Request timeout as a duration.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RateLimitConfig {
    /// Window length as a duration.
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

// Default value functions for serde.
fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8787))
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_hour() -> u64 {
    3600
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_batch_size() -> usize {
    5
}

const fn default_batch_delay_ms() -> u64 {
    2000
}

const fn default_window_secs() -> u64 {
    60
}

const fn default_global_limit() -> u32 {
    60
}

const fn default_reset_limit() -> u32 {
    5
}

const fn default_domain_limit() -> u32 {
    30
}

fn default_template() -> String {
    String::from(DEFAULT_TEMPLATE)
}

const fn default_utc_offset() -> i32 {
    8
}
