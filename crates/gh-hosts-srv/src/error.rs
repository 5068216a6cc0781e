//! Error types for the gh-hosts service.

use gh_hosts_core::HostsError;
use thiserror::Error;

/// Errors that can occur in gh-hosts service operations.
#[derive(Error, Debug)]
pub enum SrvError {
    /// HTTP server failed to bind or run.
    #[error("server error: {0}")]
    Server(String),

    /// Configuration is invalid or unreadable.
    #[error("config error: {0}")]
    Config(String),

    /// Key-value store read/write failed.
    #[error("store error: {0}")]
    Store(String),

    /// Hosts template is malformed.
    #[error("template error: {0}")]
    Template(String),

    /// Resolver client setup failed.
    #[error(transparent)]
    Hosts(#[from] HostsError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
