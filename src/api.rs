// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP binding of the service layer.
//!
//! ## Routes
//!
//! ```text
//! /
//! ├── /api/v1
//! │   ├── GET  /fqdns                  - paginated, filtered list (JSON)
//! │   ├── GET  /fqdns/stream           - added/modified/deleted events (SSE)
//! │   ├── POST /fqdns/check            - live DNS sync check
//! │   ├── POST /groups/resolve         - group mapping for labels + namespace
//! │   ├── GET  /resource-refs/parse    - validate a kind/namespace/name string
//! │   └── GET  /summary                - per-source name counts
//! ├── GET /healthz                     - liveness
//! ├── GET /readyz                      - 503 until the first refresh
//! └── GET /metrics                     - Prometheus text format
//! ```
//!
//! List and stream share the filter query parameters `namespace`, `portal`,
//! `source` and `search`. The list additionally takes `pageSize` and `pageToken`.

use crate::aggregator::{FqdnFilters, Page};
use crate::constants::SSE_KEEP_ALIVE_SECS;
use crate::errors::ServiceError;
use crate::fqdn::FqdnSource;
use crate::metrics;
use crate::resource_ref::ResourceRef;
use crate::service::{FqdnService, Summary};
use crate::sync_check::CheckResult;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Portal operations
    pub service: FqdnService,
    /// Fires on process shutdown; every open stream listens to a child of it
    pub shutdown: CancellationToken,
}

/// Build the complete router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_router())
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_text))
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/fqdns", get(list_fqdns))
        .route("/fqdns/stream", get(stream_fqdns))
        .route("/fqdns/check", post(check_fqdn))
        .route("/groups/resolve", post(resolve_groups))
        .route("/resource-refs/parse", get(parse_resource_ref))
        .route("/summary", get(summary))
}

// ============================================================================
// Errors
// ============================================================================

/// Errors rendered as `{ "reason": ..., "message": ... }`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A service operation failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The metrics registry could not be encoded
    #[error("Failed to encode metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::NotReady(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Service(ServiceError::ResourceRef(_) | ServiceError::InvalidSource(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable reason.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Service(ServiceError::NotReady(_)) => "NotReady",
            ApiError::Service(ServiceError::ResourceRef(_)) => "InvalidResourceRef",
            ApiError::Service(ServiceError::InvalidSource(_)) => "InvalidSource",
            ApiError::Metrics(_) => "MetricsEncodingFailed",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    reason: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, reason = self.reason(), "Request failed");
        }
        let body = ErrorBody {
            reason: self.reason(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Query parameters of the list and stream endpoints.
///
/// Empty values are treated as absent.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FqdnQuery {
    /// Namespace of the owning `DNSRecordSet`
    pub namespace: Option<String>,
    /// Portal name
    pub portal: Option<String>,
    /// `manual` or `discovered`
    pub source: Option<String>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    /// Page size; missing, zero or unparseable means everything
    pub page_size: Option<String>,
    /// Continuation token from a previous page
    pub page_token: Option<String>,
}

impl FqdnQuery {
    /// Filters described by the query.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidSource`] for an unknown `source` value.
    pub fn filters(&self) -> Result<FqdnFilters, ServiceError> {
        let source = non_empty(self.source.as_ref())
            .map(|raw| raw.parse::<FqdnSource>().map_err(|_| ServiceError::InvalidSource(raw)))
            .transpose()?;

        Ok(FqdnFilters {
            namespace: non_empty(self.namespace.as_ref()),
            portal: non_empty(self.portal.as_ref()),
            source,
            search: non_empty(self.search.as_ref()),
        })
    }

    fn page_size(&self) -> usize {
        self.page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Body of `POST /api/v1/fqdns/check`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    /// Name to resolve
    pub name: String,
    /// Declared record type; empty for an existence check
    #[serde(default)]
    pub record_type: String,
    /// Expected targets
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Body of `POST /api/v1/groups/resolve`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveGroupsRequest {
    /// Labels of the origin object
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
    /// Namespace of the origin object
    #[serde(default)]
    pub namespace: String,
}

/// Response of `POST /api/v1/groups/resolve`.
#[derive(Clone, Debug, Serialize)]
pub struct ResolveGroupsResponse {
    /// Resolved groups, never empty
    pub groups: Vec<String>,
}

/// Query of `GET /api/v1/resource-refs/parse`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ParseQuery {
    /// Raw `kind/namespace/name` string
    #[serde(default)]
    pub raw: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /api/v1/fqdns`
///
/// # Errors
///
/// 400 for an unknown source, 503 when no data is available yet.
pub async fn list_fqdns(
    State(state): State<AppState>,
    Query(query): Query<FqdnQuery>,
) -> Result<Json<Page>, ApiError> {
    let filters = query.filters()?;
    let page_token = query.page_token.as_deref().unwrap_or_default();
    let page = state
        .service
        .list_fqdns(&filters, query.page_size(), page_token)
        .await?;
    Ok(Json(page))
}

/// `GET /api/v1/fqdns/stream`
///
/// # Errors
///
/// 400 for an unknown source.
pub async fn stream_fqdns(
    State(state): State<AppState>,
    Query(query): Query<FqdnQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let filters = query.filters()?;
    let events = state
        .service
        .stream_fqdns(filters, state.shutdown.child_token())
        .map(|event| {
            Event::default()
                .event(event.event_type.as_str())
                .json_data(&event.fqdn)
        });

    Ok(Sse::new(events).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS)),
    ))
}

/// `POST /api/v1/fqdns/check`
pub async fn check_fqdn(State(state): State<AppState>, Json(request): Json<CheckRequest>) -> Json<CheckResult> {
    Json(
        state
            .service
            .check_fqdn(&request.name, &request.record_type, &request.targets)
            .await,
    )
}

/// `POST /api/v1/groups/resolve`
pub async fn resolve_groups(
    State(state): State<AppState>,
    Json(request): Json<ResolveGroupsRequest>,
) -> Json<ResolveGroupsResponse> {
    let groups = state
        .service
        .resolve_groups(request.labels.as_ref(), &request.namespace);
    Json(ResolveGroupsResponse { groups })
}

/// `GET /api/v1/resource-refs/parse`
///
/// # Errors
///
/// 400 carrying the raw input when it does not parse.
pub async fn parse_resource_ref(
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
) -> Result<Json<ResourceRef>, ApiError> {
    Ok(Json(state.service.parse_resource_ref(&query.raw)?))
}

/// `GET /api/v1/summary`
pub async fn summary(State(state): State<AppState>) -> Json<Summary> {
    Json(state.service.summary())
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}

/// `GET /readyz`
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.service.cache().is_ready() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "waiting for first refresh")
    }
}

/// `GET /metrics`
///
/// # Errors
///
/// 500 if the registry cannot be encoded.
pub async fn metrics_text() -> Result<impl IntoResponse, ApiError> {
    let body = metrics::gather_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    ))
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
