//! Sellers, categories, products and their variants.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Publication state of a product. Only `Active` products can be put in a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ProductStatus")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Active,
    Archived,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::Archived => write!(f, "archived"),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::sellers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
    pub deleted_date: Option<DateTime>,
    pub is_deleted: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::sellers)]
pub struct NewSeller {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::sellers)]
pub struct UpdateSeller {
    pub name: Option<String>,
    pub normalized_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub name: String,
    pub normalized_name: String,
    pub description: Option<String>,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
    pub deleted_date: Option<DateTime>,
    pub is_deleted: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub parent_id: Option<i32>,
    pub name: String,
    pub normalized_name: String,
    pub description: Option<String>,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::categories)]
pub struct UpdateCategory {
    pub parent_id: Option<i32>,
    pub name: Option<String>,
    pub normalized_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: i32,
    pub name: String,
    pub normalized_name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub status: ProductStatus,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
    pub deleted_date: Option<DateTime>,
    pub is_deleted: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: i32,
    pub name: String,
    pub normalized_name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub status: ProductStatus,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct {
    pub category_id: Option<i32>,
    pub name: Option<String>,
    pub normalized_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::product_variants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
    pub deleted_date: Option<DateTime>,
    pub is_deleted: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::product_variants)]
pub struct NewProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub price: BigDecimal,
    pub stock_quantity: i32,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::product_variants)]
pub struct UpdateProductVariant {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock_quantity: Option<i32>,
}
