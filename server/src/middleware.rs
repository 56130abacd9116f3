//! Request-level middleware, layered in front of the router in addition to
//! the orchestrator's own per-query budget.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Logs method, path, status, and latency for every request.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    debug!("incoming request: {} {}", method, uri);

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();
    if status.is_success() {
        info!("{} {} - {} ({:?})", method, uri, status, duration);
    } else {
        warn!("{} {} - {} ({:?})", method, uri, status, duration);
    }

    response
}

/// A coarse connection-level timeout, independent of the orchestrator's own
/// per-query budget — catches requests stuck before they ever reach the
/// pipeline (e.g. body read stalls).
pub async fn request_timeout(request: Request, next: Next) -> Result<Response, StatusCode> {
    let timeout_duration = Duration::from_secs(90);
    match tokio::time::timeout(timeout_duration, next.run(request)).await {
        Ok(response) => Ok(response),
        Err(_) => {
            warn!("request timed out after {:?}", timeout_duration);
            Err(StatusCode::REQUEST_TIMEOUT)
        }
    }
}

