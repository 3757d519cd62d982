//! Request timeout middleware.
//!
//! Requests that run past `server.request_timeout` are answered with
//! `408 Request Timeout`. Deliveries already started keep running on their
//! own tasks and are recorded as usual.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;

/// Middleware that bounds how long a handler may run.
pub async fn timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(
                method = %method,
                uri = %uri,
                limit_ms = limit.as_millis() as u64,
                "Request timed out"
            );
            StatusCode::REQUEST_TIMEOUT.into_response()
        }
    }
}
