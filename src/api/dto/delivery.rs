//! Delivery tariff, order and tracking DTOs.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{non_negative_decimal, optional_timestamp, positive_decimal, timestamp};
use crate::models::{
    DeliveryOrder, DeliveryStatus, DeliveryTariff, DeliveryTracking, NewDeliveryTariff,
    UpdateDeliveryOrder, UpdateDeliveryTariff,
};
use crate::repositories::{
    DeliveryOrderFilter, DeliveryTariffFilter, PlaceDeliveryOrder, StatusChange,
};

// ============================================================================
// Tariffs
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateDeliveryTariffRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Standard")]
    pub name: String,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = String, example = "4.99")]
    pub base_price: BigDecimal,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = String, example = "0.80")]
    pub price_per_kg: BigDecimal,
    #[schema(example = 2)]
    pub min_days: i32,
    #[schema(example = 5)]
    pub max_days: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreateDeliveryTariffRequest {
    pub fn into_new_tariff(self) -> NewDeliveryTariff {
        NewDeliveryTariff {
            name: self.name,
            base_price: self.base_price,
            price_per_kg: self.price_per_kg,
            min_days: self.min_days,
            max_days: self.max_days,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateDeliveryTariffRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = Option<String>)]
    pub base_price: Option<BigDecimal>,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = Option<String>)]
    pub price_per_kg: Option<BigDecimal>,
    pub min_days: Option<i32>,
    pub max_days: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateDeliveryTariffRequest {
    pub fn into_update_tariff(self) -> UpdateDeliveryTariff {
        UpdateDeliveryTariff {
            name: self.name,
            base_price: self.base_price,
            price_per_kg: self.price_per_kg,
            min_days: self.min_days,
            max_days: self.max_days,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct DeliveryTariffListQuery {
    pub is_active: Option<bool>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
}

impl From<DeliveryTariffListQuery> for DeliveryTariffFilter {
    fn from(query: DeliveryTariffListQuery) -> Self {
        DeliveryTariffFilter {
            is_active: query.is_active,
            name: query.name,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct QuoteQuery {
    /// Parcel weight in kilograms
    #[validate(custom(function = "positive_decimal"))]
    #[param(value_type = String, example = "2.5")]
    pub weight_kg: BigDecimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub tariff_id: i32,
    #[schema(value_type = String, example = "2.5")]
    pub weight_kg: BigDecimal,
    #[schema(value_type = String, example = "6.99")]
    pub price: BigDecimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryTariffResponse {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "4.99")]
    pub base_price: BigDecimal,
    #[schema(value_type = String, example = "0.80")]
    pub price_per_kg: BigDecimal,
    pub min_days: i32,
    pub max_days: i32,
    pub is_active: bool,
    pub created_date: String,
    pub updated_date: Option<String>,
}

impl From<DeliveryTariff> for DeliveryTariffResponse {
    fn from(tariff: DeliveryTariff) -> Self {
        Self {
            id: tariff.id,
            name: tariff.name,
            base_price: tariff.base_price,
            price_per_kg: tariff.price_per_kg,
            min_days: tariff.min_days,
            max_days: tariff.max_days,
            is_active: tariff.is_active,
            created_date: timestamp(&tariff.created_date),
            updated_date: optional_timestamp(tariff.updated_date.as_ref()),
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateDeliveryOrderRequest {
    pub address_id: Uuid,
    #[validate(range(min = 1, message = "Tariff id must be positive"))]
    pub tariff_id: i32,
    pub customer_id: Uuid,
    #[validate(custom(function = "positive_decimal"))]
    #[schema(value_type = String, example = "2.5")]
    pub weight_kg: BigDecimal,
}

impl CreateDeliveryOrderRequest {
    pub fn into_place_order(self) -> PlaceDeliveryOrder {
        PlaceDeliveryOrder {
            address_id: self.address_id,
            tariff_id: self.tariff_id,
            customer_id: self.customer_id,
            weight_kg: self.weight_kg,
        }
    }
}

/// Only the destination can be corrected once an order exists.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateDeliveryOrderRequest {
    pub address_id: Option<Uuid>,
}

impl UpdateDeliveryOrderRequest {
    pub fn into_update_order(self) -> UpdateDeliveryOrder {
        UpdateDeliveryOrder {
            address_id: self.address_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChangeDeliveryStatusRequest {
    pub status: DeliveryStatus,
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    #[schema(example = "Leipzig hub")]
    pub location: Option<String>,
    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,
}

impl ChangeDeliveryStatusRequest {
    pub fn into_status_change(self) -> StatusChange {
        StatusChange {
            status: self.status,
            location: self.location,
            note: self.note,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct DeliveryOrderListQuery {
    pub customer_id: Option<Uuid>,
    pub status: Option<DeliveryStatus>,
    pub tariff_id: Option<i32>,
}

impl From<DeliveryOrderListQuery> for DeliveryOrderFilter {
    fn from(query: DeliveryOrderListQuery) -> Self {
        DeliveryOrderFilter {
            customer_id: query.customer_id,
            status: query.status,
            tariff_id: query.tariff_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryOrderResponse {
    pub id: i64,
    pub address_id: Uuid,
    pub tariff_id: i32,
    pub customer_id: Uuid,
    pub status: DeliveryStatus,
    #[schema(value_type = String, example = "2.5")]
    pub weight_kg: BigDecimal,
    #[schema(value_type = String, example = "6.99")]
    pub total_price: BigDecimal,
    pub created_date: String,
    pub updated_date: Option<String>,
    pub delivered_date: Option<String>,
}

impl From<DeliveryOrder> for DeliveryOrderResponse {
    fn from(order: DeliveryOrder) -> Self {
        Self {
            id: order.id,
            address_id: order.address_id,
            tariff_id: order.tariff_id,
            customer_id: order.customer_id,
            status: order.status,
            weight_kg: order.weight_kg,
            total_price: order.total_price,
            created_date: timestamp(&order.created_date),
            updated_date: optional_timestamp(order.updated_date.as_ref()),
            delivered_date: optional_timestamp(order.delivered_date.as_ref()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryTrackingResponse {
    pub id: i64,
    pub delivery_order_id: i64,
    pub status: DeliveryStatus,
    pub location: Option<String>,
    pub note: Option<String>,
    pub created_date: String,
}

impl From<DeliveryTracking> for DeliveryTrackingResponse {
    fn from(entry: DeliveryTracking) -> Self {
        Self {
            id: entry.id,
            delivery_order_id: entry.delivery_order_id,
            status: entry.status,
            location: entry.location,
            note: entry.note,
            created_date: timestamp(&entry.created_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_weight_must_be_positive() {
        let request = |weight: &str| CreateDeliveryOrderRequest {
            address_id: Uuid::new_v4(),
            tariff_id: 1,
            customer_id: Uuid::new_v4(),
            weight_kg: BigDecimal::from_str(weight).unwrap(),
        };
        assert!(request("0").validate().is_err());
        assert!(request("-1.5").validate().is_err());
        assert!(request("0.001").validate().is_ok());
    }

    #[test]
    fn test_tariff_is_active_by_default() {
        let request: CreateDeliveryTariffRequest = serde_json::from_str(
            r#"{"name":"Standard","base_price":"4.99","price_per_kg":"0.8","min_days":2,"max_days":5}"#,
        )
        .unwrap();
        assert!(request.is_active);
    }

    #[test]
    fn test_status_change_parses_snake_case() {
        let request: ChangeDeliveryStatusRequest =
            serde_json::from_str(r#"{"status":"in_transit","location":"Hub 4"}"#).unwrap();
        let change = request.into_status_change();
        assert_eq!(change.status, DeliveryStatus::InTransit);
        assert_eq!(change.location.as_deref(), Some("Hub 4"));
        assert_eq!(change.note, None);
    }
}
