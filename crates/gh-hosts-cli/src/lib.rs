//! # gh-hosts-cli
//!
//! The `gh-hosts` binary: runs the HTTP service or drives the same cache
//! and resolver from the command line.
//!
//! ## Commands
//!
//! - **serve**: HTTP API plus the hourly refresh scheduler
//! - **resolve**: one-off DoH lookup, bypassing the cache
//! - **hosts**: print the hosts file (or JSON) through the cache
//! - **lookup**: single-domain cache lookup
//! - **reset**: purge and rebuild the cached snapshot
//! - **providers**: list configured DoH providers

pub mod cli;
pub mod telemetry;

pub use cli::run;
