//! Router assembly: every route group under `/api/v1`, the OpenAPI document
//! and the middleware stack.

use axum::http::HeaderValue;
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers::{
    cart::cart_routes, catalog::catalog_routes, delivery::delivery_routes,
    feedback::feedback_routes, geography::geography_routes, health::health_routes,
};
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Creates the application router.
///
/// Middleware runs outermost first: compression, CORS, request id, logging,
/// then the error handler closest to the routes.
///
/// # Errors
///
/// `Configuration` when a configured CORS origin is not a valid header value.
pub fn create_router(state: AppState, server: &ServerConfig) -> AppResult<Router> {
    let api_routes = OpenApiRouter::new()
        .merge(geography_routes())
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(delivery_routes())
        .merge(feedback_routes())
        .merge(health_routes());

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest(API_PREFIX, api_routes)
        .split_for_parts();

    let router = router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors_layer(&server.cors_allowed_origins)?)
        .layer(CompressionLayer::new())
        .with_state(state);

    Ok(router)
}

/// An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> AppResult<CorsLayer> {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| AppError::Configuration {
                    key: "server.cors_allowed_origins".to_string(),
                    source: anyhow::Error::from(e),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::config::{DatabaseConfig, PaginationConfig};
    use crate::db::lazy_connection_pool;

    // Every request below is rejected before a connection is needed.
    fn app() -> Router {
        let database = DatabaseConfig {
            url: "postgres://emporium@127.0.0.1:1/emporium".to_string(),
            min_connections: 0,
            ..DatabaseConfig::default()
        };
        let pool = lazy_connection_pool(&database);
        let state = AppState::new(pool, database.query_timeout(), PaginationConfig::default());
        create_router(state, &ServerConfig::default()).unwrap()
    }

    async fn get(uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_sort_key_is_bad_request() {
        let response = get("/api/v1/countries?sort_by=population").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_page_zero_is_bad_request() {
        let response = get("/api/v1/products?page=0").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_nil_id_is_bad_request() {
        let response = get("/api/v1/sellers/00000000-0000-0000-0000-000000000000").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_cart_requires_customer_header() {
        let response = get("/api/v1/cart").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let response = get("/api/v1/warehouses").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_versioned_paths() {
        let response = get("/api-docs/openapi.json").await;
        assert_eq!(response.status(), StatusCode::OK);

        let doc = json_body(response).await;
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/countries"));
        assert!(paths.contains_key("/api/v1/cart"));
        assert!(paths.contains_key("/api/v1/health"));
        assert!(doc["components"]["securitySchemes"]["customerId"].is_object());
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let server = ServerConfig {
            cors_allowed_origins: vec!["https://shop.example".to_string()],
            ..ServerConfig::default()
        };
        let layer = cors_layer(&server.cors_allowed_origins).unwrap();
        let app = Router::new()
            .route("/", axum::routing::get(|| async { "ok" }))
            .layer(layer);

        let request = Request::builder()
            .uri("/")
            .header(header::ORIGIN, "https://shop.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://shop.example"
        );
    }

    #[test]
    fn test_invalid_cors_origin_is_configuration_error() {
        let result = cors_layer(&["https://bad\norigin".to_string()]);
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
