//! HTTP API.
//!
//! | Route | Limit |
//! |---|---|
//! | `GET /` | global |
//! | `GET /hosts.json` | global |
//! | `GET /hosts` | global |
//! | `POST /reset?key=` | global + reset |
//! | `GET /{domain}` | global + domain |
//!
//! `GET /reset` is a domain lookup like any other path segment. Errors,
//! including unknown paths and unsupported methods, are JSON.

mod error;
pub mod handlers;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::cache::DomainCache;
use crate::config::RateLimitConfig;
use crate::hosts_file::HostsFormatter;
use crate::rate_limit::{rate_limit, FixedWindowLimiter};
use crate::store::Store;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DomainCache>,
    pub formatter: Arc<HostsFormatter>,
    /// Key required by `POST /reset`; reset is refused when unset.
    pub api_key: Option<Arc<str>>,
    /// Landing page override.
    pub index_path: Option<PathBuf>,
}

/// The global limiter and the stricter per-route ones.
#[derive(Clone)]
pub struct Limiters {
    pub global: Arc<FixedWindowLimiter>,
    pub reset: Arc<FixedWindowLimiter>,
    pub domain: Arc<FixedWindowLimiter>,
}

impl Limiters {
    /// Build all limiters over one store.
    pub fn from_config(store: &Arc<dyn Store>, config: &RateLimitConfig) -> Self {
        let window = config.window();
        Self {
            global: Arc::new(FixedWindowLimiter::new(
                Arc::clone(store),
                config.global,
                window,
            )),
            reset: Arc::new(FixedWindowLimiter::scoped(
                "reset",
                Arc::clone(store),
                config.reset,
                window,
            )),
            domain: Arc::new(FixedWindowLimiter::scoped(
                "domain",
                Arc::clone(store),
                config.domain,
                window,
            )),
        }
    }
}

/// Build the API router.
pub fn router(state: AppState, limiters: Limiters) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/hosts.json", get(handlers::hosts_json))
        .route("/hosts", get(handlers::hosts_text))
        .route(
            "/reset",
            post(handlers::reset)
                .route_layer(from_fn_with_state(limiters.reset, rate_limit))
                .merge(
                    get(handlers::reset_lookup)
                        .route_layer(from_fn_with_state(Arc::clone(&limiters.domain), rate_limit)),
                ),
        )
        .route(
            "/{domain}",
            get(handlers::domain).route_layer(from_fn_with_state(limiters.domain, rate_limit)),
        )
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(from_fn_with_state(limiters.global, rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts_file::DEFAULT_TEMPLATE;
    use crate::rate_limit::{HEADER_LIMIT, HEADER_REMAINING};
    use crate::store::MemoryStore;
    use crate::test_helpers::{github_domains, TableResolver};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use gh_hosts_client::BatchConfig;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    const KEY: &str = "s3cret";

    struct Harness {
        app: Router,
        resolver: Arc<TableResolver>,
    }

    fn harness_with(resolver: Arc<TableResolver>, api_key: Option<&str>, limits: RateLimitConfig) -> Harness {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cache = DomainCache::new(
            Arc::clone(&store),
            resolver.clone(),
            BatchConfig {
                batch_size: 5,
                delay: Duration::ZERO,
            },
            github_domains(),
            Duration::from_secs(3600),
        );
        let state = AppState {
            cache: Arc::new(cache),
            formatter: Arc::new(HostsFormatter::new(DEFAULT_TEMPLATE, 8).unwrap()),
            api_key: api_key.map(Arc::from),
            index_path: None,
        };
        let limiters = Limiters::from_config(&store, &limits);

        Harness {
            app: router(state, limiters),
            resolver,
        }
    }

    fn harness() -> Harness {
        harness_with(TableResolver::github(), Some(KEY), RateLimitConfig::default())
    }

    async fn send(app: &Router, method: &str, uri: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_hosts_json() {
        let h = harness();
        let response = send(&h.app, "GET", "/hosts.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[HEADER_LIMIT], "60");

        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0][0], "140.82.112.3");
        assert_eq!(json[0][1], "github.com");
    }

    #[tokio::test]
    async fn test_hosts_text() {
        let h = harness();
        let response = send(&h.app, "GET", "/hosts").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");

        let text = body_text(response).await;
        assert!(text.contains(&format!("{:<30}github.com", "140.82.112.3")));
        assert!(text.contains("# Update time: "));
    }

    #[tokio::test]
    async fn test_index_page() {
        let h = harness();
        let response = send(&h.app, "GET", "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<title>GitHub Hosts</title>"));
    }

    #[tokio::test]
    async fn test_missing_index_file_is_404() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cache = DomainCache::new(
            Arc::clone(&store),
            TableResolver::github(),
            BatchConfig::default(),
            github_domains(),
            Duration::from_secs(3600),
        );
        let state = AppState {
            cache: Arc::new(cache),
            formatter: Arc::new(HostsFormatter::new(DEFAULT_TEMPLATE, 8).unwrap()),
            api_key: None,
            index_path: Some(PathBuf::from("/nonexistent/gh-hosts/index.html")),
        };
        let app = router(state, Limiters::from_config(&store, &RateLimitConfig::default()));

        let response = send(&app, "GET", "/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_domain_lookup_is_cached() {
        let h = harness();

        let first = send(&h.app, "GET", "/github.com").await;
        assert_eq!(first.status(), StatusCode::OK);
        let first = body_json(first).await;
        assert_eq!(first["domain"], "github.com");
        assert_eq!(first["ip"], "140.82.112.3");
        assert_eq!(first["lastUpdated"], first["lastChecked"]);

        let second = body_json(send(&h.app, "GET", "/GitHub.com").await).await;
        assert_eq!(second, first);
        assert_eq!(h.resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_unlisted_domain_is_rejected_without_resolving() {
        let h = harness();
        let response = send(&h.app, "GET", "/example.com").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid domain");
        assert!(json["hint"].is_string());
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_domain_is_500() {
        let h = harness_with(TableResolver::new(&[]), Some(KEY), RateLimitConfig::default());
        let response = send(&h.app, "GET", "/github.com").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["domain"], "github.com");
    }

    #[tokio::test]
    async fn test_reset_requires_key() {
        let h = harness();

        for uri in ["/reset", "/reset?key=wrong"] {
            let response = send(&h.app, "POST", uri).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
        assert_eq!(h.resolver.calls(), 0);

        let response = send(&h.app, "POST", "/reset?key=s3cret").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Reset completed");
        assert_eq!(json["entriesCount"], 3);
        assert_eq!(json["entries"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reset_refused_without_configured_key() {
        let h = harness_with(TableResolver::github(), None, RateLimitConfig::default());
        let response = send(&h.app, "POST", "/reset?key=").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_route_limit_applies_and_reports_inner_headers() {
        let limits = RateLimitConfig {
            domain: 2,
            ..RateLimitConfig::default()
        };
        let h = harness_with(TableResolver::github(), Some(KEY), limits);

        for expected in ["1", "0"] {
            let response = send(&h.app, "GET", "/github.com").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[HEADER_LIMIT], "2");
            assert_eq!(response.headers()[HEADER_REMAINING], expected);
        }

        let response = send(&h.app, "GET", "/github.com").await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = response.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after <= 60);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Too many requests");
        assert_eq!(json["retryAfter"], retry_after);

        // other routes only count against the global limit
        let response = send(&h.app, "GET", "/hosts.json").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[HEADER_LIMIT], "60");
    }

    #[tokio::test]
    async fn test_global_limit() {
        let limits = RateLimitConfig {
            global: 1,
            ..RateLimitConfig::default()
        };
        let h = harness_with(TableResolver::github(), Some(KEY), limits);

        assert_eq!(send(&h.app, "GET", "/").await.status(), StatusCode::OK);
        let response = send(&h.app, "GET", "/hosts").await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_reset_is_a_rejected_domain_lookup() {
        let h = harness();
        let response = send(&h.app, "GET", "/reset").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key(HEADER_LIMIT));
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid domain");
        assert_eq!(json["domain"], "reset");
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_method_is_json_405() {
        let h = harness();

        for (method, uri) in [("POST", "/hosts.json"), ("DELETE", "/github.com"), ("PUT", "/reset")] {
            let response = send(&h.app, method, uri).await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            assert_eq!(body_json(response).await["error"], "Method not allowed");
        }
        assert_eq!(h.resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let h = harness();
        let response = send(&h.app, "GET", "/a/b").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }
}
