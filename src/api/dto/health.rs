//! Health check DTOs for API responses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2026-01-01T12:00:00Z",
    "checks": {
        "store": {
            "status": "healthy",
            "message": "12 notification(s)",
            "response_time_ms": 0
        }
    }
}))]
pub struct HealthResponse {
    /// Overall health status
    #[schema(example = "healthy")]
    pub status: HealthStatus,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Timestamp of the health check (RFC 3339)
    #[schema(value_type = String, format = DateTime, example = "2026-01-01T12:00:00Z")]
    pub timestamp: String,
    /// Detailed checks for various components
    pub checks: BTreeMap<String, ComponentHealth>,
}

/// Health status, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but some notifications cannot be delivered
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// The worst status among the checks; healthy when there are none.
    pub fn overall<'a>(checks: impl IntoIterator<Item = &'a ComponentHealth>) -> Self {
        checks
            .into_iter()
            .map(|check| check.status)
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }
}

/// Individual component health information.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    #[schema(example = "healthy")]
    pub status: HealthStatus,
    /// Optional message with details
    #[schema(example = "12 notification(s)")]
    pub message: Option<String>,
    /// Response time in milliseconds
    #[schema(example = 0)]
    pub response_time_ms: Option<u64>,
}
