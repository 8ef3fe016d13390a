use diesel::prelude::*;
use jiff_diesel::DateTime;
use uuid::Uuid;

/// One cart per customer, created lazily on first access.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::shopping_carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShoppingCart {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::shopping_carts)]
pub struct NewShoppingCart {
    pub id: Uuid,
    pub customer_id: Uuid,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::shopping_cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShoppingCartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub amount: i32,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::shopping_cart_items)]
pub struct NewShoppingCartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub amount: i32,
}
