use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use gh_hosts_core::{canonical, DomainRecord, HostEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ApiError, AppState};

/// Built-in landing page.
pub const INDEX_HTML: &str = include_str!("index.html");

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let Some(path) = state.index_path.as_deref() else {
        return Ok(Html(INDEX_HTML.to_string()));
    };

    match tokio::fs::read_to_string(path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "index page unavailable");
            Err(ApiError::NotFound)
        }
    }
}

/// `GET /hosts.json`
pub async fn hosts_json(State(state): State<AppState>) -> Json<Vec<HostEntry>> {
    Json(state.cache.get_all_domains().await)
}

/// `GET /hosts`
pub async fn hosts_text(State(state): State<AppState>) -> Response {
    let entries = state.cache.get_all_domains().await;
    let body = state.formatter.render(&entries);
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ResetParams {
    key: Option<String>,
}

/// Body of a successful reset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub message: &'static str,
    pub entries_count: usize,
    pub entries: Vec<HostEntry>,
}

/// `POST /reset?key=API_KEY`
pub async fn reset(
    State(state): State<AppState>,
    Query(params): Query<ResetParams>,
) -> Result<Json<ResetResponse>, ApiError> {
    let authorized = matches!(
        (state.api_key.as_deref(), params.key.as_deref()),
        (Some(expected), Some(given)) if expected == given
    );
    if !authorized {
        warn!("rejected reset with missing or wrong key");
        return Err(ApiError::Unauthorized);
    }

    let entries = state.cache.reset().await;
    info!(entries = entries.len(), "reset completed");

    Ok(Json(ResetResponse {
        message: "Reset completed",
        entries_count: entries.len(),
        entries,
    }))
}

/// `GET /{domain}`
pub async fn domain(
    State(state): State<AppState>,
    Path(requested): Path<String>,
) -> Result<Json<DomainRecord>, ApiError> {
    lookup(&state, requested).await
}

/// `GET /reset`, looked up like any other path segment.
pub async fn reset_lookup(State(state): State<AppState>) -> Result<Json<DomainRecord>, ApiError> {
    lookup(&state, "reset".to_string()).await
}

async fn lookup(state: &AppState, requested: String) -> Result<Json<DomainRecord>, ApiError> {
    let Some(domain) = canonical(state.cache.domains(), &requested) else {
        debug!(domain = %requested, "domain not on allow-list");
        return Err(ApiError::InvalidDomain { domain: requested });
    };

    state
        .cache
        .get_domain(domain)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::ResolutionFailed {
            domain: domain.to_string(),
        })
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
