use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tracing::info;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wraps `router` with request-id tagging (outermost) and per-request logging.
pub fn with_request_tracing<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn(log_requests))
        .layer(middleware::from_fn(assign_request_id))
}

/// Reuses a caller-supplied `x-request-id` or mints a new one, echoing it on the response.
pub async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let value = resolve_request_id(request.headers());
    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER, value.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, value);
    response
}

pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request_id(request.headers());
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        %request_id,
        "request completed"
    );
    response
}

/// Request id for error payloads; `"unknown"` when the tagging layer did not run.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("unknown")
        .to_string()
}

fn resolve_request_id(headers: &HeaderMap) -> HeaderValue {
    let supplied = headers.get(REQUEST_ID_HEADER).filter(|value| {
        value
            .to_str()
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false)
    });

    match supplied {
        Some(value) => value.clone(),
        None => HeaderValue::from_str(&Uuid::new_v4().to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
    }
}
