//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by business area; `error` and `pagination` hold the
//! shapes shared by every endpoint. Timestamps are rendered as ISO 8601
//! strings in UTC with millisecond precision.

mod cart;
mod catalog;
mod delivery;
mod error;
mod feedback;
mod geography;
mod health;
mod pagination;

pub use cart::{CartItemResponse, CartResponse};
pub use catalog::{
    AdjustStockRequest, CategoryListQuery, CategoryResponse, CreateCategoryRequest,
    CreateProductRequest, CreateProductVariantRequest, CreateSellerRequest, ProductListQuery,
    ProductResponse, ProductVariantListQuery, ProductVariantResponse, SellerListQuery,
    SellerResponse, UpdateCategoryRequest, UpdateProductRequest, UpdateProductVariantRequest,
    UpdateSellerRequest,
};
pub use delivery::{
    ChangeDeliveryStatusRequest, CreateDeliveryOrderRequest, CreateDeliveryTariffRequest,
    DeliveryOrderListQuery, DeliveryOrderResponse, DeliveryTariffListQuery,
    DeliveryTariffResponse, DeliveryTrackingResponse, QuoteQuery, QuoteResponse,
    UpdateDeliveryOrderRequest, UpdateDeliveryTariffRequest,
};
pub use error::ErrorResponse;
pub use feedback::{
    ComplaintListQuery, ComplaintResponse, CreateComplaintRequest, CreateReviewRequest,
    ProductRatingResponse, ResolveComplaintRequest, ReviewListQuery, ReviewResponse,
    UpdateComplaintRequest, UpdateReviewRequest,
};
pub use geography::{
    AddressListQuery, AddressResponse, CityListQuery, CityResponse, CountryListQuery,
    CountryResponse, CreateAddressRequest, CreateCityRequest, CreateCountryRequest,
    UpdateAddressRequest, UpdateCityRequest, UpdateCountryRequest,
};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use pagination::{PagedResponse, PaginationMeta, PaginationParams};

use bigdecimal::{BigDecimal, Zero};
use jiff_diesel::DateTime;
use validator::ValidationError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub(crate) fn timestamp(value: &DateTime) -> String {
    value.to_jiff().strftime(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn optional_timestamp(value: Option<&DateTime>) -> Option<String> {
    value.map(timestamp)
}

pub(crate) fn non_negative_decimal(value: &BigDecimal) -> Result<(), ValidationError> {
    if value < &BigDecimal::zero() {
        return Err(ValidationError::new("non_negative")
            .with_message("Value cannot be negative".into()));
    }
    Ok(())
}

pub(crate) fn positive_decimal(value: &BigDecimal) -> Result<(), ValidationError> {
    if value <= &BigDecimal::zero() {
        return Err(
            ValidationError::new("positive").with_message("Value must be greater than zero".into())
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_timestamp_has_millisecond_precision() {
        let value = DateTime::from(jiff::civil::date(2024, 3, 9).at(7, 5, 3, 120_000_000));
        assert_eq!(timestamp(&value), "2024-03-09T07:05:03.120Z");
        assert_eq!(optional_timestamp(None), None);
    }

    #[test]
    fn test_decimal_checks() {
        let zero = BigDecimal::zero();
        let negative = BigDecimal::from_str("-0.5").unwrap();
        assert!(non_negative_decimal(&zero).is_ok());
        assert!(non_negative_decimal(&negative).is_err());
        assert!(positive_decimal(&zero).is_err());
        assert!(positive_decimal(&BigDecimal::from_str("0.01").unwrap()).is_ok());
    }
}
