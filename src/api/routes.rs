//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use axum::{Router, http::StatusCode, middleware};
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    error_response_middleware, logging_middleware, request_id_middleware, timeout_middleware,
};
use crate::state::AppState;

/// Path the generated OpenAPI document is served on
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Path of the Swagger UI
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID middleware - generates/propagates request IDs
/// 2. Logging middleware - logs requests with request IDs
/// 3. Error response middleware - adds the request ID to error bodies
/// 4. Timeout middleware - answers 408 after `server.request_timeout` seconds
///
/// # Routes
/// - `/api/health` - Health checks
/// - `/api/notifications` - Notification creation, query and retry
/// - `/api/channels` - Registered channel kinds
/// - `/api/events` - Domain event ingestion
/// - `/api-docs/openapi.json` - OpenAPI document
/// - `/swagger-ui` - Swagger UI over that document
pub fn create_router(state: AppState) -> Router {
    let api_routes = OpenApiRouter::new()
        .merge(handlers::health::health_routes())
        .merge(handlers::notifications::notification_routes())
        .merge(handlers::channels::channel_routes())
        .merge(handlers::events::event_routes());

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api_routes)
        .split_for_parts();

    let request_timeout = Duration::from_secs(state.settings.server.request_timeout);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_PATH, openapi))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(request_timeout, timeout_middleware))
        .layer(middleware::from_fn(error_response_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::db::Store;
    use crate::error::AppResult;
    use crate::models::{ChannelKind, DeliveryOutcome, Notification, NotificationStatus};
    use crate::services::ChannelStrategy;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request, Response};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Unreachable;

    #[async_trait]
    impl ChannelStrategy for Unreachable {
        async fn send(&self, _notification: &Notification) -> AppResult<DeliveryOutcome> {
            Ok(DeliveryOutcome::Failed("gateway unreachable".to_string()))
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    struct Sluggish;

    #[async_trait]
    impl ChannelStrategy for Sluggish {
        async fn send(&self, _notification: &Notification) -> AppResult<DeliveryOutcome> {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            Ok(DeliveryOutcome::Delivered)
        }

        fn name(&self) -> &str {
            "sluggish"
        }
    }

    fn test_state() -> AppState {
        AppState::with_store(Settings::default(), Store::in_memory()).unwrap()
    }

    async fn send(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_body(kind: &str) -> Value {
        json!({
            "user_id": 1,
            "type": kind,
            "title": "Price drop",
            "message": "Widget is now 19.99"
        })
    }

    #[tokio::test]
    async fn test_create_notification_is_dispatched() {
        let state = test_state();
        let response = send(&state, Method::POST, "/api/notifications", Some(create_body("log"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_json(response).await;
        assert_eq!(body["status"], "sent");
        assert_eq!(body["type"], "log");
        assert_eq!(body["attempts"], 1);

        let id = body["id"].as_i64().unwrap();
        let response = send(&state, Method::GET, &format!("/api/notifications/{}", id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_with_missing_title_stores_nothing() {
        let state = test_state();
        let response = send(
            &state,
            Method::POST,
            "/api/notifications",
            Some(json!({"user_id": 1, "type": "log", "message": "m"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.repository.count().await.unwrap(), 0);

        let response = send(
            &state,
            Method::POST,
            "/api/notifications",
            Some(json!({"user_id": 1, "type": "log", "title": "", "message": "m"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());
        assert_eq!(state.repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_with_unknown_type_is_rejected() {
        let state = test_state();
        let response = send(&state, Method::POST, "/api/notifications", Some(create_body("pigeon"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "UNKNOWN_CHANNEL_KIND");
        assert_eq!(state.repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_notifications_filters() {
        let state = test_state();
        let response = send(&state, Method::GET, "/api/notifications?user_id=1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["count"], 0);

        send(&state, Method::POST, "/api/notifications", Some(create_body("log"))).await;

        let response = send(&state, Method::GET, "/api/notifications?user_id=1&status=sent", None).await;
        assert_eq!(body_json(response).await["count"], 1);

        let response = send(&state, Method::GET, "/api/notifications?user_id=1&status=failed", None).await;
        assert_eq!(body_json(response).await["count"], 0);

        let response = send(&state, Method::GET, "/api/notifications?user_id=1&status=lost", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&state, Method::GET, "/api/notifications", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_retry_reattempts_failed_notifications() {
        let state = test_state();
        state
            .dispatcher
            .factory()
            .register(ChannelKind::Custom("pager".to_string()), |_| {
                Ok(Arc::new(Unreachable))
            });

        let response = send(&state, Method::POST, "/api/notifications", Some(create_body("pager"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "failed");
        assert_eq!(body["last_error"], "gateway unreachable");

        let response = send(&state, Method::POST, "/api/notifications/retry", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["retried"], 1);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["sent"], 0);

        let stored = state.repository.find_by_user(1).await.unwrap();
        assert_eq!(stored[0].attempts, 2);
    }

    #[tokio::test]
    async fn test_bulk_reports_rejected_items() {
        let state = test_state();
        let response = send(
            &state,
            Method::POST,
            "/api/notifications/bulk",
            Some(json!({"notifications": [create_body("log"), create_body("pigeon")]})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["sent"], 1);
        assert_eq!(body["rejected"].as_array().unwrap().len(), 1);

        let response = send(
            &state,
            Method::POST,
            "/api/notifications/bulk",
            Some(json!({"notifications": []})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pending_and_missing_notification() {
        let state = test_state();
        let response = send(&state, Method::GET, "/api/notifications/pending", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["count"], 0);

        let response = send(&state, Method::GET, "/api/notifications/404", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_publish_event_creates_notifications() {
        let state = test_state();
        let response = send(
            &state,
            Method::POST,
            "/api/events",
            Some(json!({"name": "favorite_added", "payload": {"user_id": 7, "product_id": 3}})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response).await;
        assert_eq!(body["notified"], 1);
        assert_eq!(state.repository.find_by_user(7).await.unwrap().len(), 1);

        let response = send(
            &state,
            Method::POST,
            "/api/events",
            Some(json!({"name": "favorite_added", "payload": {"product_id": 3}})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_channels_and_health() {
        let state = test_state();
        let response = send(&state, Method::GET, "/api/channels", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["channels"].as_array().unwrap().contains(&json!("email")));

        let response = send(&state, Method::GET, "/api/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");

        let response = send(&state, Method::GET, "/api/health/live", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_slow_request_times_out_but_delivery_completes() {
        let mut settings = Settings::default();
        settings.server.request_timeout = 1;
        let state = AppState::with_store(settings, Store::in_memory()).unwrap();
        state
            .dispatcher
            .factory()
            .register(ChannelKind::Custom("carrier".to_string()), |_| {
                Ok(Arc::new(Sluggish))
            });

        let response = send(&state, Method::POST, "/api/notifications", Some(create_body("carrier"))).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = body_json(response).await;
        assert_eq!(body["code"], "REQUEST_TIMEOUT");
        assert!(body["request_id"].is_string());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let stored = state.repository.find_by_user(1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, NotificationStatus::Sent);
        assert_eq!(stored[0].attempts, 1);
    }

    #[tokio::test]
    async fn test_openapi_document_and_fallback() {
        let state = test_state();
        let response = send(&state, Method::GET, OPENAPI_PATH, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/api/notifications"].is_object());
        assert!(body["paths"]["/api/events"].is_object());

        let response = send(&state, Method::GET, "/nowhere", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }
}
