use crate::docs::ApiDoc;
use crate::infra::{AppState, SharedPropertyService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use property_ledger::middleware::with_request_tracing;
use property_ledger::properties::property_router;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

pub(crate) fn with_property_routes(service: Arc<SharedPropertyService>) -> Router {
    let app = property_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api-docs/openapi.json", get(openapi_endpoint));

    with_request_tracing(app)
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthStatus {
    pub(crate) ok: bool,
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "operations",
    responses((status = 200, description = "Service is healthy", body = HealthStatus))
)]
pub(crate) async fn healthcheck() -> Json<HealthStatus> {
    Json(HealthStatus { ok: true })
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn openapi_endpoint() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
