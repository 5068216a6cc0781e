//! Throttled bulk resolution of the domain list.

use crate::config::BatchConfig;
use crate::Resolve;
use gh_hosts_core::HostEntry;
use std::sync::Arc;
use tracing::debug;

/// Resolves many domains in fixed-size concurrent batches with a pause
/// between batches.
#[derive(Clone)]
pub struct BatchRefresher {
    resolver: Arc<dyn Resolve>,
    config: BatchConfig,
}

impl BatchRefresher {
    /// Create a refresher around `resolver`
    #[must_use]
    pub fn new(resolver: Arc<dyn Resolve>, config: BatchConfig) -> Self {
        Self { resolver, config }
    }

    /// Resolve every domain, returning `(ip, domain)` pairs for the ones that
    /// answered. Order follows the input order; failures are dropped.
    pub async fn refresh_all<S: AsRef<str> + Sync>(&self, domains: &[S]) -> Vec<HostEntry> {
        let batch_size = self.config.batch_size.max(1);
        let mut entries = Vec::with_capacity(domains.len());

        for (index, batch) in domains.chunks(batch_size).enumerate() {
            if index > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            let futures: Vec<_> = batch
                .iter()
                .map(|domain| async move {
                    let domain = domain.as_ref();
                    self.resolver
                        .resolve(domain)
                        .await
                        .map(|ip| HostEntry::new(ip, domain))
                })
                .collect();

            let resolved = futures_util::future::join_all(futures).await;
            let before = entries.len();
            entries.extend(resolved.into_iter().flatten());

            debug!(
                batch = index,
                requested = batch.len(),
                resolved = entries.len() - before,
                "resolved batch"
            );
        }

        entries
    }
}
