use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors returned to API clients as JSON.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Domain is not on the allow-list.
    #[error("Invalid domain")]
    InvalidDomain {
        /// Domain as requested
        domain: String,
    },

    /// Missing or wrong admin key.
    #[error("Unauthorized")]
    Unauthorized,

    /// No such resource.
    #[error("Not found")]
    NotFound,

    /// Path exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Domain could not be resolved and nothing is cached for it.
    #[error("Failed to resolve domain")]
    ResolutionFailed {
        /// Domain as requested
        domain: String,
    },

    /// Too many requests in the current window.
    #[error("Too many requests")]
    RateLimited {
        /// Seconds until the window resets
        retry_after: u64,
    },
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidDomain { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ResolutionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        let body = match &self {
            Self::InvalidDomain { domain } => json!({
                "error": error,
                "domain": domain,
                "hint": "Only GitHub-related domains listed at /hosts.json can be queried",
            }),
            Self::ResolutionFailed { domain } => json!({
                "error": error,
                "domain": domain,
            }),
            Self::RateLimited { retry_after } => json!({
                "error": error,
                "retryAfter": retry_after,
            }),
            Self::Unauthorized | Self::NotFound | Self::MethodNotAllowed => {
                json!({ "error": error })
            }
        };

        let mut response = (self.status(), Json(body)).into_response();
        if let Self::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}
