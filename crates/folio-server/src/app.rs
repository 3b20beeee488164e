//! Operational HTTP endpoints: liveness, readiness and Prometheus metrics.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use folio_core::{FolioError, HealthCheck, HealthStatus};
use folio_service::{CacheBackend, CacheHandle};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared state of the operational router.
#[derive(Clone)]
pub struct AppState {
    checks: Vec<Arc<dyn HealthCheck>>,
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn new(checks: Vec<Arc<dyn HealthCheck>>, metrics: Option<PrometheusHandle>) -> Self {
        Self { checks, metrics }
    }
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness response with one entry per check.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// `ready`, `degraded` or `unavailable`.
    pub status: &'static str,
    pub checks: BTreeMap<String, HealthStatus>,
}

/// Readiness check backed by a cache ping.
///
/// A failing cache only degrades the service, so this check never reports
/// [`HealthStatus::Unhealthy`].
pub struct CacheHealthCheck {
    cache: CacheHandle,
}

impl CacheHealthCheck {
    #[must_use]
    pub fn new(cache: CacheHandle) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl HealthCheck for CacheHealthCheck {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> HealthStatus {
        match &self.cache {
            CacheHandle::Disabled => HealthStatus::Degraded("cache disabled".to_string()),
            CacheHandle::Connected(backend) => match backend.ping().await {
                Ok(()) => HealthStatus::Healthy,
                Err(e) => HealthStatus::Degraded(FolioError::from(e).to_string()),
            },
        }
    }
}

/// Creates the operational router.
pub fn create_router(state: AppState, metrics_path: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route(metrics_path, get(render_metrics))
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness endpoint. Answers 503 only when a check is unhealthy.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    for check in &state.checks {
        checks.insert(check.name().to_string(), check.check().await);
    }

    let (status_code, status) = if checks.values().any(HealthStatus::is_unhealthy) {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    } else if checks.values().all(HealthStatus::is_healthy) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::OK, "degraded")
    };

    (status_code, Json(ReadinessResponse { status, checks }))
}

async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics are disabled".to_string()),
    }
}

/// Records request count and latency per route.
async fn track_metrics(req: Request<Body>, next: Next) -> impl IntoResponse {
    let start = Instant::now();

    let path = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", response.status().as_u16().to_string()),
    ];
    metrics::counter!("folio_http_requests_total", &labels).increment(1);
    metrics::histogram!("folio_http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());

    response
}
