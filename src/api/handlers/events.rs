//! Domain event ingestion.
//!
//! Lets collaborating services raise events over HTTP instead of linking
//! against the bus directly.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::EVENT_TAG;
use crate::api::dto::{PublishEventRequest, PublishEventResponse};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

pub fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(publish_event))
}

/// POST /api/events - Publish a domain event
///
/// Observer failures do not fail the request; they are listed in the report.
/// Unknown event names are accepted and reach no observer.
#[utoipa::path(
    post,
    path = "/events",
    tag = EVENT_TAG,
    request_body = PublishEventRequest,
    responses(
        (status = 202, description = "Event published", body = PublishEventResponse),
        (status = 400, description = "Malformed event payload", body = crate::api::dto::ErrorResponse)
    )
)]
async fn publish_event(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PublishEventRequest>,
) -> AppResult<(StatusCode, Json<PublishEventResponse>)> {
    let report = state
        .events
        .publish_raw(&payload.name, payload.payload)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(PublishEventResponse::from(report))))
}
