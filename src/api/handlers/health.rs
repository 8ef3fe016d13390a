//! Health check endpoint. The database is checked through the pool directly.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use diesel_async::RunQueryDsl;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::db::AsyncDbPool;
use crate::state::AppState;

/// Routes:
/// - GET /health - Service and database health
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health_check))
}

/// GET /health - Service health
///
/// Responds 503 with the same body when any component is unhealthy.
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = BTreeMap::new();
    checks.insert("database".to_string(), check_database(&state.db_pool).await);

    let timestamp = jiff::Timestamp::now()
        .strftime("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();
    let response = HealthResponse::from_checks(crate::pkg_version(), timestamp, checks);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => {
            tracing::warn!(checks = ?response.checks, "Health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (status, Json(response))
}

async fn check_database(pool: &AsyncDbPool) -> ComponentHealth {
    let started = Instant::now();
    let elapsed = || started.elapsed().as_millis() as u64;

    let mut conn = match pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            return ComponentHealth::unhealthy(format!("Connection failed: {}", e), elapsed());
        }
    };

    match diesel::sql_query("SELECT 1").execute(&mut conn).await {
        Ok(_) => ComponentHealth::healthy("Connected", elapsed()),
        Err(e) => ComponentHealth::unhealthy(format!("Query failed: {}", e), elapsed()),
    }
}
