//! Error handler for converting AppError to HTTP responses.
//!
//! `IntoResponse for AppError` is the single place where errors become status
//! codes. Server-side failures are logged in full and answered with a generic
//! body. `error_response_middleware` stamps the request ID into error bodies
//! and gives plain-text framework errors (unknown route, wrong method) the
//! same JSON shape.

use axum::{
    Json,
    extract::{
        Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

impl IntoResponse for AppError {
    /// # Status Code Mapping
    /// - NotFound → 404
    /// - Validation, BadRequest, UnknownChannelKind → 400
    /// - Conflict → 409
    /// - DeliveryFailed, Storage, Configuration, Internal → 500
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let body = match &self {
            AppError::NotFound {
                entity,
                field,
                value,
            } => ErrorResponse::new("NOT_FOUND", &self.to_string()).with_details(json!({
                "entity": entity,
                "field": field,
                "value": value,
            })),
            AppError::Validation { field, reason } => {
                ErrorResponse::new("VALIDATION_ERROR", &self.to_string()).with_details(json!({
                    "field": field,
                    "reason": reason,
                }))
            }
            AppError::BadRequest { message } => ErrorResponse::new("BAD_REQUEST", message),
            AppError::UnknownChannelKind { kind } => {
                tracing::warn!(channel = %kind, "Request referenced an unknown channel kind");
                ErrorResponse::new("UNKNOWN_CHANNEL_KIND", &self.to_string())
                    .with_details(json!({ "type": kind }))
            }
            AppError::Conflict { message } => ErrorResponse::new("CONFLICT", message),
            AppError::DeliveryFailed { .. }
            | AppError::Storage { .. }
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => {
                tracing::error!(error = ?self, "Request failed with an internal error");
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
            }
        };

        let mut response = (status, Json(body.clone())).into_response();
        // Picked up by `error_response_middleware` to add the request ID.
        response.extensions_mut().insert(body);
        response
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Validation { .. }
        | AppError::BadRequest { .. }
        | AppError::UnknownChannelKind { .. } => StatusCode::BAD_REQUEST,
        AppError::Conflict { .. } => StatusCode::CONFLICT,
        AppError::DeliveryFailed { .. }
        | AppError::Storage { .. }
        | AppError::Configuration { .. }
        | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

/// Gives every error response the `ErrorResponse` JSON shape with the
/// request ID filled in.
pub async fn error_response_middleware(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let response = next.run(request).await;
    let status = response.status();

    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let body = match response.extensions().get::<ErrorResponse>() {
        Some(body) => body.clone(),
        None => fallback_body(status),
    };
    let body = match request_id {
        Some(id) => body.with_request_id(&id),
        None => body,
    };

    (status, Json(body)).into_response()
}

fn fallback_body(status: StatusCode) -> ErrorResponse {
    let code = match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::REQUEST_TIMEOUT => "REQUEST_TIMEOUT",
        s if s.is_server_error() => "INTERNAL_ERROR",
        _ => "HTTP_ERROR",
    };
    let message = status.canonical_reason().unwrap_or("Request failed");
    ErrorResponse::new(code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::request_id_middleware;
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            error_to_status_code(&AppError::not_found("notification", "id", 1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_to_status_code(&AppError::validation("title", "required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&AppError::UnknownChannelKind {
                kind: "pigeon".to_string()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&AppError::Conflict {
                message: "sent".to_string()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_to_status_code(&AppError::storage("write snapshot", anyhow::anyhow!("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_body_is_sanitized() {
        let err = AppError::storage("write snapshot", anyhow::anyhow!("/var/lib/secret: EACCES"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_validation_body_has_details() {
        let response = AppError::validation("title", "Title is required").into_response();
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["field"], "title");
    }

    #[tokio::test]
    async fn test_middleware_adds_request_id_and_shapes_fallbacks() {
        let app = Router::new()
            .route(
                "/missing",
                get(|| async { AppError::not_found("notification", "id", 9) }),
            )
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(axum::middleware::from_fn(error_response_middleware))
            .layer(axum::middleware::from_fn(request_id_middleware));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/missing")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["request_id"], "req-42");
        assert_eq!(body["details"]["value"], "9");

        let response = app
            .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body["request_id"].is_string());
    }
}
