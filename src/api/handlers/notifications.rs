//! Notification API handlers.
//!
//! Thin adapters over `NotificationDispatcher`: parse, delegate, convert.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::NOTIFICATION_TAG;
use crate::api::dto::{
    BulkNotificationRequest, BulkResponse, CreateNotificationRequest, ErrorResponse,
    NotificationListResponse, NotificationQuery, NotificationResponse, RetryResponse,
};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates notification-related routes.
///
/// Routes:
/// - GET /notifications          - List a user's notifications
/// - POST /notifications         - Create and dispatch one notification
/// - POST /notifications/bulk    - Create and dispatch several
/// - POST /notifications/retry   - Retry FAILED notifications
/// - GET /notifications/pending  - List PENDING notifications
/// - GET /notifications/:id      - Get one notification
pub fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_notifications))
        .routes(routes!(create_notification))
        .routes(routes!(create_notifications_bulk))
        .routes(routes!(retry_failed))
        .routes(routes!(list_pending))
        .routes(routes!(get_notification))
}

/// GET /api/notifications - List a user's notifications
///
/// Always 200; the list is empty when nothing matches.
#[utoipa::path(
    get,
    path = "/notifications",
    tag = NOTIFICATION_TAG,
    params(NotificationQuery),
    responses(
        (status = 200, description = "Matching notifications", body = NotificationListResponse),
        (status = 400, description = "Invalid user id or status", body = ErrorResponse)
    )
)]
async fn list_notifications(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<NotificationQuery>,
) -> AppResult<Json<NotificationListResponse>> {
    let status = query.status()?;
    let records = state
        .dispatcher
        .user_notifications(query.user_id, status)
        .await?;
    Ok(Json(NotificationListResponse::from(records)))
}

/// POST /api/notifications - Create and dispatch a notification
///
/// The returned record reflects the first delivery attempt: `sent` or
/// `failed`. Nothing is stored when the request is rejected.
#[utoipa::path(
    post,
    path = "/notifications",
    tag = NOTIFICATION_TAG,
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created and dispatched", body = NotificationResponse),
        (status = 400, description = "Missing field or unknown channel type", body = ErrorResponse)
    )
)]
async fn create_notification(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateNotificationRequest>,
) -> AppResult<(StatusCode, Json<NotificationResponse>)> {
    let record = state
        .dispatcher
        .notify(payload.into_new_notification()?)
        .await?;
    Ok((StatusCode::CREATED, Json(NotificationResponse::from(record))))
}

/// POST /api/notifications/bulk - Create and dispatch several notifications
///
/// Items for an unregistered channel are reported in `rejected`; a malformed
/// item rejects the whole request.
#[utoipa::path(
    post,
    path = "/notifications/bulk",
    tag = NOTIFICATION_TAG,
    request_body = BulkNotificationRequest,
    responses(
        (status = 200, description = "Per-request outcome counts", body = BulkResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse)
    )
)]
async fn create_notifications_bulk(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BulkNotificationRequest>,
) -> AppResult<Json<BulkResponse>> {
    let requests = payload
        .notifications
        .into_iter()
        .map(CreateNotificationRequest::into_new_notification)
        .collect::<AppResult<Vec<_>>>()?;

    let report = state.dispatcher.notify_bulk(requests).await?;
    Ok(Json(BulkResponse::from(report)))
}

/// POST /api/notifications/retry - Retry FAILED notifications
///
/// Uses the configured attempt ceiling.
#[utoipa::path(
    post,
    path = "/notifications/retry",
    tag = NOTIFICATION_TAG,
    responses(
        (status = 200, description = "Retry sweep report", body = RetryResponse)
    )
)]
async fn retry_failed(State(state): State<AppState>) -> AppResult<Json<RetryResponse>> {
    let max_retries = state.dispatcher.max_retries();
    let report = state.dispatcher.retry_failed(max_retries).await?;
    Ok(Json(RetryResponse::from(report)))
}

/// GET /api/notifications/pending - Notifications not yet attempted
#[utoipa::path(
    get,
    path = "/notifications/pending",
    tag = NOTIFICATION_TAG,
    responses(
        (status = 200, description = "PENDING notifications", body = NotificationListResponse)
    )
)]
async fn list_pending(State(state): State<AppState>) -> AppResult<Json<NotificationListResponse>> {
    let records = state.dispatcher.pending_notifications().await?;
    Ok(Json(NotificationListResponse::from(records)))
}

/// GET /api/notifications/:id - Get one notification
#[utoipa::path(
    get,
    path = "/notifications/{id}",
    tag = NOTIFICATION_TAG,
    params(
        ("id" = i64, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification found", body = NotificationResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    )
)]
async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<NotificationResponse>> {
    let record = state.dispatcher.get(id).await?;
    Ok(Json(NotificationResponse::from(record)))
}
