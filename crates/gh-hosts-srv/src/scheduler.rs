//! Periodic forced refresh of the domain cache.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::DomainCache;
use crate::config::MAX_PERIOD_SECS;

/// Handle to a running refresh task.
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Spawn a task calling [`DomainCache::refresh`] every `period`, first
    /// one `period` from now. Runs never overlap; ticks missed while a
    /// refresh is in flight are skipped. `period` is capped at 366 days.
    pub fn spawn(cache: Arc<DomainCache>, period: Duration) -> Self {
        let period = period.min(Duration::from_secs(MAX_PERIOD_SECS));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(period_secs = period.as_secs(), "refresh scheduler started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("scheduled refresh");
                        let entries = cache.refresh().await;
                        info!(entries = entries.len(), "scheduled refresh finished");
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            info!("refresh scheduler stopped");
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Stop the task, letting an in-flight refresh finish first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }
}
