//! Core types for the gh-hosts GitHub DNS cache.
//!
//! This crate provides the foundational types shared by the resolver client,
//! the caching service and the CLI:
//!
//! - **Types**: [`DomainRecord`], [`CacheSnapshot`] and [`HostEntry`]
//! - **Domains**: the default GitHub domain allow-list
//! - **Errors**: [`HostsError`] and the [`Result`] alias
//!
//! # Example
//!
//! ```rust,ignore
//! use gh_hosts_core::{CacheSnapshot, DomainRecord};
//!
//! let mut snapshot = CacheSnapshot::default();
//! let record = DomainRecord::new("github.com", "140.82.112.3".parse()?, chrono::Utc::now());
//! snapshot.upsert(record);
//! ```

#![doc(html_root_url = "https://docs.rs/gh-hosts-core/1.0.0")]

pub mod domains;
mod error;
pub mod types;

pub use domains::{canonical, default_domains, DEFAULT_DOMAINS};
pub use error::{HostsError, Result};
pub use types::*;
