//! Extractors that deserialize and then validate a request.

use crate::error::{AppError, AppResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that passed its `validator` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string that passed its `validator` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct SellerBody {
        #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
        name: String,
        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct RatingQuery {
        #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
        min_rating: Option<i16>,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/sellers")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_json_body() {
        let request = json_request(r#"{"name":"Acme","email":"sales@acme.test"}"#);
        let ValidatedJson(body) = ValidatedJson::<SellerBody>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(body.name, "Acme");
    }

    #[tokio::test]
    async fn test_invalid_json_fields_are_collected() {
        let request = json_request(r#"{"name":"","email":"nope"}"#);
        match ValidatedJson::<SellerBody>::from_request(request, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "name"]);
                assert!(errors[0].message.contains("Invalid email format"));
            }
            other => panic!("Expected ValidationErrors, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = json_request(r#"{"name":"#);
        let result = ValidatedJson::<SellerBody>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/sellers")
            .body(Body::from(r#"{"name":"Acme","email":"sales@acme.test"}"#))
            .unwrap();
        let result = ValidatedJson::<SellerBody>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    async fn query(uri: &str) -> AppResult<ValidatedQuery<RatingQuery>> {
        let (mut parts, _) = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
            .into_parts();
        ValidatedQuery::<RatingQuery>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_query_validation() {
        let ValidatedQuery(q) = query("/reviews?min_rating=4").await.unwrap();
        assert_eq!(q.min_rating, Some(4));

        let ValidatedQuery(q) = query("/reviews").await.unwrap();
        assert_eq!(q.min_rating, None);

        assert!(matches!(
            query("/reviews?min_rating=9").await,
            Err(AppError::ValidationErrors { .. })
        ));
        assert!(matches!(
            query("/reviews?min_rating=abc").await,
            Err(AppError::BadRequest { .. })
        ));
    }
}
