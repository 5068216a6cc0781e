//! DNS-over-HTTPS resolver client.

use crate::answer::DohResponse;
use crate::config::{DohProvider, RetryConfig};
use crate::Resolve;
use async_trait::async_trait;
use gh_hosts_core::{HostsError, Result};
use governor::{Quota, RateLimiter};
use reqwest::header::ACCEPT;
use reqwest::Client as HttpClient;
use std::net::Ipv4Addr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// User-Agent sent with every query
const USER_AGENT: &str = concat!("gh-hosts/", env!("CARGO_PKG_VERSION"));

/// Media type of the DoH JSON API
const DNS_JSON: &str = "application/dns-json";

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Resolves domains to IPv4 addresses through DoH providers.
///
/// Failures never surface as errors: after the retry budget is spent the
/// lookup degrades to `None`.
#[derive(Clone)]
pub struct ResolverClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    providers: Vec<DohProvider>,
    retry_config: RetryConfig,
    timeout: Duration,
    rate_limiter: Option<DirectLimiter>,
}

impl ResolverClient {
    /// Create a client with the built-in providers and default settings
    pub fn new() -> Result<Self> {
        ResolverClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> ResolverClientBuilder {
        ResolverClientBuilder::new()
    }

    /// Configured providers, default first
    #[must_use]
    pub fn providers(&self) -> &[DohProvider] {
        &self.inner.providers
    }

    /// Whether outbound queries are capped by a per-second quota
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.inner.rate_limiter.is_some()
    }

    /// Select a provider by name, falling back to the default one
    #[must_use]
    pub fn provider(&self, name: Option<&str>) -> &DohProvider {
        let default = &self.inner.providers[0];
        match name {
            None => default,
            Some(name) => self
                .inner
                .providers
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(name))
                .unwrap_or_else(|| {
                    warn!(provider = name, fallback = %default.name, "unknown DoH provider");
                    default
                }),
        }
    }

    /// Resolve `domain` to its first A record using the named provider
    /// (or the default one), retrying transient failures with backoff.
    pub async fn lookup(&self, domain: &str, provider: Option<&str>) -> Option<Ipv4Addr> {
        let domain = domain.trim();
        if domain.is_empty() {
            debug!("refusing to resolve an empty domain");
            return None;
        }

        let provider = self.provider(provider);
        let retry = &self.inner.retry_config;
        let mut attempt = 0;

        loop {
            match self.query(provider, domain).await {
                Ok(response) => {
                    let ip = response.first_ipv4();
                    if ip.is_none() {
                        debug!(domain, status = response.status, "no A record in answer");
                    }
                    return ip;
                }
                Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                    let delay = retry.backoff_for(attempt);
                    attempt += 1;
                    debug!(
                        domain,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "DoH query failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        domain,
                        provider = %provider.name,
                        attempts = attempt + 1,
                        status = ?e.status_code(),
                        error = %e,
                        "DoH resolution failed"
                    );
                    return None;
                }
            }
        }
    }

    /// Perform a single DoH query
    #[instrument(skip(self, provider), fields(provider = %provider.name))]
    async fn query(&self, provider: &DohProvider, domain: &str) -> Result<DohResponse> {
        if let Some(limiter) = &self.inner.rate_limiter {
            limiter.until_ready().await;
        }

        let url = url::Url::parse_with_params(&provider.url, &[("name", domain), ("type", "A")])
            .map_err(|e| HostsError::Config(format!("invalid provider URL {}: {e}", provider.url)))?;
        debug!(url = %url, "DoH request");

        let response = self
            .inner
            .http
            .get(url)
            .header(ACCEPT, DNS_JSON)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HostsError::Provider {
                code: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| self.map_reqwest_error(e))?;
        serde_json::from_str(&body).map_err(HostsError::Json)
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> HostsError {
        if e.is_timeout() {
            HostsError::Timeout(self.inner.timeout.as_secs())
        } else {
            HostsError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl Resolve for ResolverClient {
    async fn resolve(&self, domain: &str) -> Option<Ipv4Addr> {
        self.lookup(domain, None).await
    }
}

/// Builder for configuring a [`ResolverClient`]
pub struct ResolverClientBuilder {
    providers: Vec<DohProvider>,
    timeout: Duration,
    retry_config: RetryConfig,
    requests_per_second: Option<u32>,
}

impl Default for ResolverClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverClientBuilder {
    /// Create a builder with the built-in providers
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: DohProvider::defaults(),
            timeout: DEFAULT_TIMEOUT,
            retry_config: RetryConfig::default(),
            requests_per_second: None,
        }
    }

    /// Replace the provider list; the first entry becomes the default
    #[must_use]
    pub fn providers(mut self, providers: Vec<DohProvider>) -> Self {
        self.providers = providers;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry configuration
    #[must_use]
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Cap outbound queries per second across all providers
    #[must_use]
    pub fn requests_per_second(mut self, rps: Option<u32>) -> Self {
        self.requests_per_second = rps;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ResolverClient> {
        if self.providers.is_empty() {
            return Err(HostsError::Config("at least one DoH provider is required".into()));
        }
        for provider in &self.providers {
            url::Url::parse(&provider.url).map_err(|e| {
                HostsError::Config(format!("invalid URL for provider {}: {e}", provider.name))
            })?;
        }

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| HostsError::Http(e.to_string()))?;

        let rate_limiter = self
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(ResolverClient {
            inner: Arc::new(ClientInner {
                http,
                providers: self.providers,
                retry_config: self.retry_config,
                timeout: self.timeout,
                rate_limiter,
            }),
        })
    }
}
