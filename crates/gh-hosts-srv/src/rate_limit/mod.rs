//! Fixed-window request limiting keyed by client address.
//!
//! Counters live in the shared [`Store`] under
//! `ratelimit:[{scope}:]{ip}:{windowStart}` and expire a minute after their
//! window closes.

mod ip;
mod middleware;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::store::Store;

pub use ip::{client_ip, normalize_ip, UNKNOWN_CLIENT};
pub use middleware::rate_limit;

/// Extra lifetime of a counter past the end of its window.
const KEY_GRACE: Duration = Duration::from_secs(60);

/// Requests permitted per window.
pub const HEADER_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
/// Requests left in the current window.
pub const HEADER_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
/// Seconds until the window resets.
pub const HEADER_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests permitted per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Seconds until the window resets.
    pub reset_secs: u64,
}

impl RateLimitDecision {
    /// Set the `RateLimit-*` headers unless an inner limiter already did.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers
            .entry(HEADER_LIMIT)
            .or_insert_with(|| HeaderValue::from(self.limit));
        headers
            .entry(HEADER_REMAINING)
            .or_insert_with(|| HeaderValue::from(self.remaining));
        headers
            .entry(HEADER_RESET)
            .or_insert_with(|| HeaderValue::from(self.reset_secs));
    }
}

/// Counts requests per client in fixed, wall-clock aligned windows.
pub struct FixedWindowLimiter {
    store: Arc<dyn Store>,
    scope: Option<String>,
    limit: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    /// Limiter applied across all routes.
    pub fn new(store: Arc<dyn Store>, limit: u32, window: Duration) -> Self {
        Self {
            store,
            scope: None,
            limit,
            window,
        }
    }

    /// Limiter for one route, counted separately from the global one.
    pub fn scoped(
        scope: impl Into<String>,
        store: Arc<dyn Store>,
        limit: u32,
        window: Duration,
    ) -> Self {
        Self {
            scope: Some(scope.into()),
            ..Self::new(store, limit, window)
        }
    }

    fn window_ms(&self) -> u64 {
        u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX).max(1)
    }

    /// Counter key for `ip` in the window starting at `window_start_ms`.
    pub fn key(&self, ip: &str, window_start_ms: u64) -> String {
        match &self.scope {
            Some(scope) => format!("ratelimit:{scope}:{ip}:{window_start_ms}"),
            None => format!("ratelimit:{ip}:{window_start_ms}"),
        }
    }

    /// Count a request from `ip` at `now_ms` (Unix milliseconds).
    ///
    /// Store failures let the request through.
    pub async fn check(&self, ip: &str, now_ms: u64) -> RateLimitDecision {
        let window_ms = self.window_ms();
        let window_start = now_ms - now_ms % window_ms;
        let reset_secs = window_start
            .saturating_add(window_ms)
            .saturating_sub(now_ms)
            .div_ceil(1000);

        let key = self.key(ip, window_start);
        let count = match self.store.incr(&key, self.window.saturating_add(KEY_GRACE)).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, key = %key, "rate limit store failed, allowing request");
                return RateLimitDecision {
                    allowed: true,
                    limit: self.limit,
                    remaining: self.limit,
                    reset_secs,
                };
            }
        };

        let used = u32::try_from(count).unwrap_or(u32::MAX);
        RateLimitDecision {
            allowed: used <= self.limit,
            limit: self.limit,
            remaining: self.limit.saturating_sub(used),
            reset_secs,
        }
    }

    /// Count a request from `ip` now.
    pub async fn hit(&self, ip: &str) -> RateLimitDecision {
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.check(ip, now_ms).await
    }
}
