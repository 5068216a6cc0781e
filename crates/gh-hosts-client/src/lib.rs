//! DNS-over-HTTPS resolver client for gh-hosts.
//!
//! This crate provides the [`ResolverClient`] used to look up the current
//! IPv4 address of a domain through public DoH JSON endpoints, and the
//! [`BatchRefresher`] that resolves a whole domain list in throttled batches.

#![doc(html_root_url = "https://docs.rs/gh-hosts-client/1.0.0")]

pub mod answer;
mod batch;
mod client;
mod config;

use async_trait::async_trait;
use std::net::Ipv4Addr;

pub use batch::BatchRefresher;
pub use client::{ResolverClient, ResolverClientBuilder};
pub use config::*;
pub use gh_hosts_core::{HostsError, Result};

/// Something that can turn a domain into an IPv4 address.
///
/// Implementations swallow their own failures and answer `None`.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Resolve `domain`, or `None` if no usable A record was obtained
    async fn resolve(&self, domain: &str) -> Option<Ipv4Addr>;
}
