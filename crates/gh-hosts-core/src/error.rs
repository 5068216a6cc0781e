use thiserror::Error;

/// Result type alias for gh-hosts operations
pub type Result<T> = std::result::Result<T, HostsError>;

/// Errors that can occur while resolving host data
#[derive(Error, Debug)]
pub enum HostsError {
    /// HTTP request to a DNS-over-HTTPS provider failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Provider answered with a non-success status
    #[error("DoH provider error ({code}): {message}")]
    Provider {
        /// HTTP status code
        code: u16,
        /// Response body or reason
        message: String,
    },

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl HostsError {
    /// Returns true if the failure is transient: network errors, non-2xx
    /// responses and undecodable bodies are all worth another attempt
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout(_) | Self::Json(_) | Self::Provider { .. }
        )
    }

    /// Returns the HTTP status code if this is a provider error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(HostsError::Http("connection reset".into()).is_retryable());
        assert!(HostsError::Timeout(10).is_retryable());
        assert!(HostsError::Provider { code: 503, message: String::new() }.is_retryable());
        assert!(!HostsError::Config("no providers".into()).is_retryable());
    }

    #[test]
    fn test_status_code() {
        let err = HostsError::Provider { code: 502, message: "bad gateway".into() };
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(HostsError::Timeout(10).status_code(), None);
    }
}
