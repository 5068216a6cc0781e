use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use super::{client_ip, FixedWindowLimiter};
use crate::http::ApiError;

/// axum middleware counting each request against `limiter`.
///
/// Rejected requests get a 429 without reaching the handler. Every response
/// carries the `RateLimit-*` headers.
pub async fn rate_limit(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);
    let decision = limiter.hit(&ip).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        debug!(client = %ip, limit = decision.limit, "rate limited");
        ApiError::RateLimited {
            retry_after: decision.reset_secs,
        }
        .into_response()
    };

    decision.apply_headers(response.headers_mut());
    response
}
