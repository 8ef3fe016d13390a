//! Shopping cart DTOs.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{optional_timestamp, timestamp};
use crate::models::ShoppingCartItem;
use crate::services::CartContents;

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub amount: i32,
    pub created_date: String,
    pub updated_date: Option<String>,
}

impl From<ShoppingCartItem> for CartItemResponse {
    fn from(item: ShoppingCartItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            amount: item.amount,
            created_date: timestamp(&item.created_date),
            updated_date: optional_timestamp(item.updated_date.as_ref()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<CartItemResponse>,
    /// Sum of the amounts of all lines
    pub total_amount: i64,
    pub created_date: String,
    pub updated_date: Option<String>,
}

impl From<CartContents> for CartResponse {
    fn from(contents: CartContents) -> Self {
        let CartContents { cart, items } = contents;
        Self {
            id: cart.id,
            customer_id: cart.customer_id,
            total_amount: items.iter().map(|item| i64::from(item.amount)).sum(),
            items: items.into_iter().map(CartItemResponse::from).collect(),
            created_date: timestamp(&cart.created_date),
            updated_date: optional_timestamp(cart.updated_date.as_ref()),
        }
    }
}
