//! Domain event publication DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use validator::Validate;

use crate::events::PublishReport;

/// Body of `POST /api/events`
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "favorite_added",
    "payload": {"user_id": 1, "product_id": 100, "product_name": "Widget"}
}))]
pub struct PublishEventRequest {
    #[validate(length(min = 1, max = 100, message = "Event name must be between 1 and 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: JsonValue,
}

/// One observer that did not handle the event
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ObserverFailureResponse {
    pub observer: String,
    pub reason: String,
}

/// What happened when the event was published
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublishEventResponse {
    pub event: String,
    /// Observers invoked
    pub notified: usize,
    pub succeeded: usize,
    pub failures: Vec<ObserverFailureResponse>,
}

impl From<PublishReport> for PublishEventResponse {
    fn from(report: PublishReport) -> Self {
        let succeeded = report.succeeded();
        Self {
            event: report.event,
            notified: report.notified,
            succeeded,
            failures: report
                .failures
                .into_iter()
                .map(|f| ObserverFailureResponse {
                    observer: f.observer,
                    reason: f.reason,
                })
                .collect(),
        }
    }
}
