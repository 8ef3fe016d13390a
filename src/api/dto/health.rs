//! Health check DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2025-01-10T12:00:00.000Z",
    "checks": {
        "database": {
            "status": "healthy",
            "message": "Connected",
            "response_time_ms": 3
        }
    }
}))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    pub checks: BTreeMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Overall status is the worst status among `checks`.
    pub fn from_checks(
        version: impl Into<String>,
        timestamp: impl Into<String>,
        checks: BTreeMap<String, ComponentHealth>,
    ) -> Self {
        let status = checks
            .values()
            .map(|check| check.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        Self {
            status,
            version: version.into(),
            timestamp: timestamp.into(),
            checks,
        }
    }
}

/// Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[schema(example = "Connected")]
    pub message: Option<String>,
    #[schema(example = 3)]
    pub response_time_ms: Option<u64>,
}

impl ComponentHealth {
    pub fn healthy(message: &str, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: Some(message.to_string()),
            response_time_ms: Some(response_time_ms),
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message),
            response_time_ms: Some(response_time_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Degraded).unwrap(), "\"degraded\"");
    }

    #[test]
    fn test_overall_status_is_worst_check() {
        let mut checks = BTreeMap::new();
        checks.insert("database".to_string(), ComponentHealth::healthy("Connected", 2));
        let response = HealthResponse::from_checks("0.1.0", "now", checks);
        assert_eq!(response.status, HealthStatus::Healthy);

        let mut checks = BTreeMap::new();
        checks.insert("cache".to_string(), ComponentHealth::healthy("Connected", 1));
        checks.insert(
            "database".to_string(),
            ComponentHealth::unhealthy("Connection failed: timeout".to_string(), 5000),
        );
        let response = HealthResponse::from_checks("0.1.0", "now", checks);
        assert_eq!(response.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_no_checks_is_healthy() {
        let response = HealthResponse::from_checks("0.1.0", "now", BTreeMap::new());
        assert_eq!(response.status, HealthStatus::Healthy);
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["checks"], serde_json::json!({}));
    }
}
