//! Health check endpoint handlers.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use jiff::Timestamp;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Component health
/// - `GET /health/live` - Liveness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(liveness_check))
}

/// Reports the store and channel registry.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = BTreeMap::new();
    checks.insert("store".to_string(), check_store(&state).await);
    checks.insert("channels".to_string(), check_channels(&state));

    Json(HealthResponse {
        status: HealthStatus::overall(checks.values()),
        version: state.settings.application.version.clone(),
        timestamp: Timestamp::now().to_string(),
        checks,
    })
}

/// Liveness probe: answers as long as the process serves requests.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_store(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let records = state.store.ping().await;
    ComponentHealth {
        status: HealthStatus::Healthy,
        message: Some(format!("{} notification(s)", records)),
        response_time_ms: Some(start.elapsed().as_millis() as u64),
    }
}

/// Degraded when the policy routes to a kind nothing is registered for.
fn check_channels(state: &AppState) -> ComponentHealth {
    let factory = state.dispatcher.factory();
    let missing: Vec<String> = state
        .dispatcher
        .policy()
        .referenced_kinds()
        .into_iter()
        .filter(|kind| !factory.is_registered(kind))
        .map(|kind| kind.to_string())
        .collect();

    if missing.is_empty() {
        ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some(format!("{} channel(s) registered", factory.supported_kinds().len())),
            response_time_ms: None,
        }
    } else {
        ComponentHealth {
            status: HealthStatus::Degraded,
            message: Some(format!("Unregistered channel(s): {}", missing.join(", "))),
            response_time_ms: None,
        }
    }
}
