//! Error response DTOs.

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::error::ValidationFieldError;

/// Standard error response format.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code, e.g. `NOT_FOUND`
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }

    pub fn not_found_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new(
            "NOT_FOUND",
            &format!("{} with {} '{}' was not found", entity, field, value),
        )
        .with_details(json!({ "entity": entity, "field": field, "value": value }))
    }

    pub fn duplicate_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new(
            "DUPLICATE_ENTRY",
            &format!("{} with {} '{}' already exists", entity, field, value),
        )
        .with_details(json!({ "entity": entity, "field": field, "value": value }))
    }

    pub fn validation_error(field: &str, reason: &str) -> Self {
        Self::new("VALIDATION_ERROR", &format!("Invalid {}: {}", field, reason))
            .with_details(json!({ "field": field, "reason": reason }))
    }

    /// One entry per failed field under `details.errors`.
    pub fn validation_errors(errors: &[ValidationFieldError]) -> Self {
        Self::new(
            "VALIDATION_ERROR",
            &format!("Request validation failed for {} field(s)", errors.len()),
        )
        .with_details(json!({ "errors": errors }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let body = serde_json::to_value(ErrorResponse::new("BAD_REQUEST", "nope")).unwrap();
        assert_eq!(body, json!({ "code": "BAD_REQUEST", "message": "nope" }));
    }

    #[test]
    fn test_not_found_error_details() {
        let body = ErrorResponse::not_found_error("country", "id", "7").with_request_id("req-1");
        assert_eq!(body.code, "NOT_FOUND");
        assert_eq!(body.request_id.as_deref(), Some("req-1"));
        assert_eq!(body.details.unwrap()["value"], "7");
    }

    #[test]
    fn test_validation_errors_lists_fields() {
        let errors = vec![
            ValidationFieldError {
                field: "name".to_string(),
                message: "too short".to_string(),
            },
            ValidationFieldError {
                field: "price".to_string(),
                message: "must be positive".to_string(),
            },
        ];
        let body = ErrorResponse::validation_errors(&errors);
        let details = body.details.unwrap();
        assert_eq!(details["errors"].as_array().unwrap().len(), 2);
        assert_eq!(details["errors"][1]["field"], "price");
    }
}
