//! Conversion of `AppError` into HTTP responses.
//!
//! Handlers return `AppError`; `IntoResponse` maps each variant to a status
//! code and an [`ErrorResponse`] body. [`global_error_handler`] then adds the
//! request id to every error body and rewrites plain-text errors produced
//! by axum itself (unknown route, wrong method) into the same JSON shape.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Largest plain-text error body read back by [`global_error_handler`].
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Maps an error to its status code and response body.
///
/// Server-side failures never expose their source in the body.
pub fn error_parts(error: &AppError) -> (StatusCode, ErrorResponse) {
    match error {
        AppError::NotFound {
            entity,
            field,
            value,
        } => (
            StatusCode::NOT_FOUND,
            ErrorResponse::not_found_error(entity, field, value),
        ),
        AppError::Duplicate {
            entity,
            field,
            value,
        } => (
            StatusCode::CONFLICT,
            ErrorResponse::duplicate_error(entity, field, value),
        ),
        AppError::Validation { field, reason } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::validation_error(field, reason),
        ),
        AppError::ValidationErrors { errors } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::validation_errors(errors),
        ),
        AppError::BadRequest { message } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("BAD_REQUEST", message),
        ),
        AppError::UnprocessableContent { message } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse::new("UNPROCESSABLE_CONTENT", message),
        ),
        AppError::Unauthorized { message } => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new("UNAUTHORIZED", message),
        ),
        AppError::Database { operation, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(
                "DATABASE_ERROR",
                &format!("Database operation failed: {}", operation),
            )
            .with_details(json!({ "operation": operation })),
        ),
        AppError::Configuration { key, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("CONFIGURATION_ERROR", &format!("Configuration error: {}", key)),
        ),
        AppError::ConnectionPool { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable"),
        ),
        AppError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred"),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal { source } | AppError::Configuration { source, .. } => {
                tracing::error!(error = %self, source = ?source, "Request failed");
            }
            AppError::ConnectionPool { source } => {
                tracing::warn!(source = %source, "Database connection unavailable");
            }
            _ => {}
        }

        let (status, body) = error_parts(&self);
        let mut response = (status, Json(body.clone())).into_response();
        // Picked up by global_error_handler to add the request id.
        response.extensions_mut().insert(body);
        response
    }
}

/// Gives every error response the `ErrorResponse` JSON shape carrying the
/// request id.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().cloned();
    let response = next.run(request).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    if let Some(body) = response.extensions().get::<ErrorResponse>().cloned() {
        let (parts, _) = response.into_parts();
        let body = match &request_id {
            Some(id) => body.with_request_id(&id.0),
            None => body,
        };
        return with_json_body(parts, body);
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));
    if is_json {
        return response;
    }

    let (parts, body) = response.into_parts();
    let original = axum::body::to_bytes(body, MAX_ERROR_BODY_BYTES)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let body = fallback_body(status, original);
    let body = match &request_id {
        Some(id) => body.with_request_id(&id.0),
        None => body,
    };
    with_json_body(parts, body)
}

fn with_json_body(parts: axum::http::response::Parts, body: ErrorResponse) -> Response {
    let mut response = (parts.status, Json(body)).into_response();
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
    response
}

/// Body for an error response axum produced without going through `AppError`.
fn fallback_body(status: StatusCode, original: String) -> ErrorResponse {
    let (code, default_message) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ("METHOD_NOT_ALLOWED", "HTTP method not allowed for this endpoint")
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::REQUEST_TIMEOUT => ("REQUEST_TIMEOUT", "Request timeout"),
        StatusCode::SERVICE_UNAVAILABLE => {
            ("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
        }
        s if s.is_server_error() => ("INTERNAL_SERVER_ERROR", "An internal server error occurred"),
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    };

    // Server error bodies may carry internals; keep only the generic message.
    if original.is_empty() || status.is_server_error() {
        ErrorResponse::new(code, default_message)
    } else {
        ErrorResponse::new(code, &original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    fn status_and_code(error: AppError) -> (StatusCode, String) {
        let (status, body) = error_parts(&error);
        (status, body.code)
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = vec![
            (AppError::not_found("country", "id", 1), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::Duplicate {
                    entity: "sellers".to_string(),
                    field: "normalized_name".to_string(),
                    value: "ACME".to_string(),
                },
                StatusCode::CONFLICT,
                "DUPLICATE_ENTRY",
            ),
            (AppError::validation("page", "bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (
                AppError::ValidationErrors { errors: vec![] },
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                AppError::BadRequest {
                    message: "x".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                AppError::unprocessable("inactive"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_CONTENT",
            ),
            (
                AppError::Unauthorized {
                    message: "who".to_string(),
                },
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
            ),
            (
                AppError::Database {
                    operation: "insert city".to_string(),
                    source: anyhow::anyhow!("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
            ),
            (
                AppError::ConnectionPool {
                    source: anyhow::anyhow!("exhausted"),
                },
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                AppError::Internal {
                    source: anyhow::anyhow!("bug"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            assert_eq!(status_and_code(error), (status, code.to_string()));
        }
    }

    #[test]
    fn test_database_error_hides_source() {
        let error = AppError::Database {
            operation: "select sellers".to_string(),
            source: anyhow::anyhow!("password=secret"),
        };
        let (_, body) = error_parts(&error);
        let text = serde_json::to_string(&body).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("select sellers"));
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/missing",
                get(|| async { Err::<(), _>(AppError::not_found("seller", "id", "abc")) }),
            )
            .layer(middleware::from_fn(global_error_handler))
            .layer(middleware::from_fn(super::super::request_id_middleware))
    }

    #[tokio::test]
    async fn test_app_error_body_gets_request_id() {
        let request = Request::builder()
            .uri("/missing")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-request-id"], "req-42");

        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["request_id"], "req-42");
    }

    #[tokio::test]
    async fn test_unknown_route_becomes_json() {
        let request = Request::builder()
            .uri("/nowhere")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_method_becomes_json() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/missing")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["code"], "METHOD_NOT_ALLOWED");
    }
}
