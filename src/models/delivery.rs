//! Delivery tariffs, orders and the tracking history of each order.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of a delivery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::DeliveryStatus")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Created,
    InTransit,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    /// Terminal orders accept no further status changes.
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    /// Whether an order in `self` may move to `next`.
    ///
    /// Orders only move forward. `in_transit` to `in_transit` is allowed as a
    /// checkpoint; the caller requires a location for it.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        match self {
            Created => matches!(next, InTransit | Delivered | Cancelled),
            InTransit => matches!(next, InTransit | Delivered | Cancelled),
            Delivered | Cancelled => false,
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Created => write!(f, "created"),
            DeliveryStatus::InTransit => write!(f, "in_transit"),
            DeliveryStatus::Delivered => write!(f, "delivered"),
            DeliveryStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::delivery_tariffs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryTariff {
    pub id: i32,
    pub name: String,
    pub base_price: BigDecimal,
    pub price_per_kg: BigDecimal,
    pub min_days: i32,
    pub max_days: i32,
    pub is_active: bool,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
}

impl DeliveryTariff {
    /// Price of shipping `weight_kg` with this tariff.
    pub fn quote(&self, weight_kg: &BigDecimal) -> BigDecimal {
        quote_price(&self.base_price, &self.price_per_kg, weight_kg)
    }
}

/// `base_price + price_per_kg * weight_kg`, rounded to cents.
pub fn quote_price(
    base_price: &BigDecimal,
    price_per_kg: &BigDecimal,
    weight_kg: &BigDecimal,
) -> BigDecimal {
    (base_price + price_per_kg * weight_kg).round(2)
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::delivery_tariffs)]
pub struct NewDeliveryTariff {
    pub name: String,
    pub base_price: BigDecimal,
    pub price_per_kg: BigDecimal,
    pub min_days: i32,
    pub max_days: i32,
    pub is_active: bool,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::delivery_tariffs)]
pub struct UpdateDeliveryTariff {
    pub name: Option<String>,
    pub base_price: Option<BigDecimal>,
    pub price_per_kg: Option<BigDecimal>,
    pub min_days: Option<i32>,
    pub max_days: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::delivery_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryOrder {
    pub id: i64,
    pub address_id: Uuid,
    pub tariff_id: i32,
    pub customer_id: Uuid,
    pub status: DeliveryStatus,
    pub weight_kg: BigDecimal,
    pub total_price: BigDecimal,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
    pub delivered_date: Option<DateTime>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::delivery_orders)]
pub struct NewDeliveryOrder {
    pub address_id: Uuid,
    pub tariff_id: i32,
    pub customer_id: Uuid,
    pub status: DeliveryStatus,
    pub weight_kg: BigDecimal,
    pub total_price: BigDecimal,
}

/// Only the address may be corrected after creation; the status moves
/// through `change_status`.
#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::delivery_orders)]
pub struct UpdateDeliveryOrder {
    pub address_id: Option<Uuid>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::delivery_tracking_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryTracking {
    pub id: i64,
    pub delivery_order_id: i64,
    pub status: DeliveryStatus,
    pub location: Option<String>,
    pub note: Option<String>,
    pub created_date: DateTime,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::delivery_tracking_history)]
pub struct NewDeliveryTracking {
    pub delivery_order_id: i64,
    pub status: DeliveryStatus,
    pub location: Option<String>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_quote_adds_weight_price_to_base() {
        assert_eq!(quote_price(&dec("5.00"), &dec("1.50"), &dec("2.5")), dec("8.75"));
    }

    #[test]
    fn test_quote_zero_weight_is_base_price() {
        assert_eq!(quote_price(&dec("4.99"), &dec("2.00"), &dec("0")), dec("4.99"));
    }

    #[test]
    fn test_quote_rounds_to_cents() {
        assert_eq!(quote_price(&dec("1.00"), &dec("0.333"), &dec("1.000")), dec("1.33"));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(DeliveryStatus::Delivered.is_terminal());
        assert!(DeliveryStatus::Cancelled.is_terminal());
        assert!(!DeliveryStatus::Created.is_terminal());
        assert!(!DeliveryStatus::InTransit.is_terminal());
    }

    #[test]
    fn test_orders_only_move_forward() {
        use DeliveryStatus::*;
        assert!(Created.can_transition_to(InTransit));
        assert!(Created.can_transition_to(Delivered));
        assert!(Created.can_transition_to(Cancelled));
        assert!(InTransit.can_transition_to(Delivered));
        assert!(InTransit.can_transition_to(Cancelled));

        assert!(!Created.can_transition_to(Created));
        assert!(!InTransit.can_transition_to(Created));
    }

    #[test]
    fn test_in_transit_checkpoint_is_a_transition() {
        assert!(DeliveryStatus::InTransit.can_transition_to(DeliveryStatus::InTransit));
    }

    #[test]
    fn test_terminal_statuses_accept_nothing() {
        use DeliveryStatus::*;
        for next in [Created, InTransit, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&DeliveryStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
        assert_eq!(DeliveryStatus::InTransit.to_string(), "in_transit");
    }
}
