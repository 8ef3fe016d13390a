//! Caller identity for customer-scoped routes.
//!
//! Identity management is external to this service; the calling customer is
//! named by the `X-Customer-Id` header.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

/// The customer making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Customer {
    pub id: Uuid,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized {
        message: message.to_string(),
    }
}

/// Reads the customer id from the request headers.
///
/// # Errors
///
/// `Unauthorized` when the header is missing, is not a UUID, or is nil.
pub fn customer_from_headers(headers: &HeaderMap<HeaderValue>) -> AppResult<Customer> {
    let raw = headers
        .get(CUSTOMER_ID_HEADER)
        .ok_or_else(|| unauthorized("Missing X-Customer-Id header"))?
        .to_str()
        .map_err(|_| unauthorized("Invalid X-Customer-Id header"))?;

    let id = Uuid::parse_str(raw.trim())
        .map_err(|_| unauthorized("X-Customer-Id must be a UUID"))?;
    if id.is_nil() {
        return Err(unauthorized("X-Customer-Id must not be the nil UUID"));
    }

    Ok(Customer { id })
}

/// Rejects requests without a valid customer id and stores the [`Customer`]
/// in the request extensions.
pub async fn customer_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let customer = customer_from_headers(request.headers())?;
    request.extensions_mut().insert(customer);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CUSTOMER_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_customer_header() {
        let id = Uuid::new_v4();
        let customer = customer_from_headers(&headers(&id.to_string())).unwrap();
        assert_eq!(customer.id, id);
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let result = customer_from_headers(&HeaderMap::new());
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn test_malformed_and_nil_ids_are_unauthorized() {
        for value in ["not-a-uuid", "", "00000000-0000-0000-0000-000000000000"] {
            let result = customer_from_headers(&headers(value));
            assert!(
                matches!(result, Err(AppError::Unauthorized { .. })),
                "{value} should be rejected"
            );
        }
    }
}
