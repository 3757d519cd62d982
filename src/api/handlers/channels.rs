//! Channel registry endpoint.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::CHANNEL_TAG;
use crate::api::dto::ChannelListResponse;
use crate::state::AppState;

pub fn channel_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_channels))
}

/// GET /api/channels - Registered channel kinds
#[utoipa::path(
    get,
    path = "/channels",
    tag = CHANNEL_TAG,
    responses(
        (status = 200, description = "Registered channel kinds", body = ChannelListResponse)
    )
)]
async fn list_channels(State(state): State<AppState>) -> Json<ChannelListResponse> {
    let dispatcher = &state.dispatcher;
    Json(ChannelListResponse {
        channels: dispatcher
            .factory()
            .supported_kinds()
            .into_iter()
            .map(|kind| kind.to_string())
            .collect(),
        default_channels: state.settings.notifications.default_channels.clone(),
    })
}
