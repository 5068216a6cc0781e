//! gh-hosts-srv: caching GitHub hosts service.
//!
//! Resolves a fixed list of GitHub domains over DNS-over-HTTPS, caches the
//! answers in a key-value store and serves them over HTTP as JSON and as a
//! ready-to-use hosts file.
//!
//! # Architecture
//!
//! - [`cache::DomainCache`] owns the freshness policy: it decides when to
//!   call the resolver and when to write the snapshot back.
//! - [`store`] holds the snapshot and the rate-limit counters, in memory or
//!   in a ReDB database file.
//! - [`http`] exposes the cache behind per-client fixed-window limits
//!   ([`rate_limit`]).
//! - [`scheduler`] forces a rebuild on a timer.

pub mod cache;
pub mod config;
pub mod error;
pub mod hosts_file;
pub mod http;
pub mod rate_limit;
pub mod scheduler;
pub mod server;
pub mod store;

#[cfg(test)]
mod test_helpers;

// Re-exports for convenience.
pub use cache::DomainCache;
pub use config::ServerConfig;
pub use error::SrvError;
pub use hosts_file::HostsFormatter;
pub use server::Services;

/// Result type for gh-hosts-srv operations.
pub type Result<T> = std::result::Result<T, SrvError>;
