//! Seller, category, product and product variant DTOs.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{non_negative_decimal, optional_timestamp, timestamp};
use crate::models::{
    Category, NewCategory, NewProduct, NewProductVariant, NewSeller, Product, ProductStatus,
    ProductVariant, Seller, UpdateCategory, UpdateProduct, UpdateProductVariant, UpdateSeller,
};
use crate::repositories::{CategoryFilter, ProductFilter, ProductVariantFilter, SellerFilter};

// ============================================================================
// Sellers
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSellerRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    #[schema(example = "Acme Tools", min_length = 1, max_length = 200)]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(format = "email", example = "sales@acme.example")]
    pub email: String,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl CreateSellerRequest {
    pub fn into_new_seller(self) -> NewSeller {
        NewSeller {
            id: Uuid::new_v4(),
            name: self.name,
            normalized_name: String::new(),
            email: self.email,
            phone: self.phone,
            description: self.description,
            is_verified: self.is_verified,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateSellerRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    #[schema(format = "email")]
    pub email: Option<String>,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub is_verified: Option<bool>,
}

impl UpdateSellerRequest {
    pub fn into_update_seller(self) -> UpdateSeller {
        UpdateSeller {
            name: self.name,
            normalized_name: None,
            email: self.email,
            phone: self.phone,
            description: self.description,
            is_verified: self.is_verified,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SellerListQuery {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub is_verified: Option<bool>,
    /// List soft-deleted sellers instead of live ones
    pub is_deleted: Option<bool>,
}

impl From<SellerListQuery> for SellerFilter {
    fn from(query: SellerListQuery) -> Self {
        SellerFilter {
            name: query.name,
            is_verified: query.is_verified,
            is_deleted: query.is_deleted,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerResponse {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
    pub is_deleted: bool,
    pub created_date: String,
    pub updated_date: Option<String>,
    pub deleted_date: Option<String>,
}

impl From<Seller> for SellerResponse {
    fn from(seller: Seller) -> Self {
        Self {
            id: seller.id,
            name: seller.name,
            normalized_name: seller.normalized_name,
            email: seller.email,
            phone: seller.phone,
            description: seller.description,
            is_verified: seller.is_verified,
            is_deleted: seller.is_deleted,
            created_date: timestamp(&seller.created_date),
            updated_date: optional_timestamp(seller.updated_date.as_ref()),
            deleted_date: optional_timestamp(seller.deleted_date.as_ref()),
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    #[validate(range(min = 1, message = "Parent id must be positive"))]
    pub parent_id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Power tools")]
    pub name: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl CreateCategoryRequest {
    pub fn into_new_category(self) -> NewCategory {
        NewCategory {
            parent_id: self.parent_id,
            name: self.name,
            normalized_name: String::new(),
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(range(min = 1, message = "Parent id must be positive"))]
    pub parent_id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn into_update_category(self) -> UpdateCategory {
        UpdateCategory {
            parent_id: self.parent_id,
            name: self.name,
            normalized_name: None,
            description: self.description,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    pub parent_id: Option<i32>,
    /// Only top-level categories
    #[serde(default)]
    pub root_only: bool,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// List soft-deleted categories instead of live ones
    pub is_deleted: Option<bool>,
}

impl From<CategoryListQuery> for CategoryFilter {
    fn from(query: CategoryListQuery) -> Self {
        CategoryFilter {
            parent_id: query.parent_id,
            root_only: query.root_only,
            name: query.name,
            is_deleted: query.is_deleted,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub name: String,
    pub normalized_name: String,
    pub description: Option<String>,
    pub is_deleted: bool,
    pub created_date: String,
    pub updated_date: Option<String>,
    pub deleted_date: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            normalized_name: category.normalized_name,
            description: category.description,
            is_deleted: category.is_deleted,
            created_date: timestamp(&category.created_date),
            updated_date: optional_timestamp(category.updated_date.as_ref()),
            deleted_date: optional_timestamp(category.deleted_date.as_ref()),
        }
    }
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    pub seller_id: Uuid,
    #[validate(range(min = 1, message = "Category id must be positive"))]
    pub category_id: i32,
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    #[schema(example = "Cordless drill")]
    pub name: String,
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = String, example = "129.99")]
    pub price: BigDecimal,
    /// Defaults to `draft`
    pub status: Option<ProductStatus>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            id: Uuid::new_v4(),
            seller_id: self.seller_id,
            category_id: self.category_id,
            name: self.name,
            normalized_name: String::new(),
            description: self.description,
            price: self.price,
            status: self.status.unwrap_or(ProductStatus::Draft),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(range(min = 1, message = "Category id must be positive"))]
    pub category_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = Option<String>, example = "119.99")]
    pub price: Option<BigDecimal>,
    pub status: Option<ProductStatus>,
}

impl UpdateProductRequest {
    pub fn into_update_product(self) -> UpdateProduct {
        UpdateProduct {
            category_id: self.category_id,
            name: self.name,
            normalized_name: None,
            description: self.description,
            price: self.price,
            status: self.status,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    pub seller_id: Option<Uuid>,
    pub category_id: Option<i32>,
    pub status: Option<ProductStatus>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    #[param(value_type = Option<String>)]
    pub min_price: Option<BigDecimal>,
    #[param(value_type = Option<String>)]
    pub max_price: Option<BigDecimal>,
    /// List soft-deleted products instead of live ones
    pub is_deleted: Option<bool>,
}

impl From<ProductListQuery> for ProductFilter {
    fn from(query: ProductListQuery) -> Self {
        ProductFilter {
            seller_id: query.seller_id,
            category_id: query.category_id,
            status: query.status,
            name: query.name,
            min_price: query.min_price,
            max_price: query.max_price,
            is_deleted: query.is_deleted,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: i32,
    pub name: String,
    pub normalized_name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "129.99")]
    pub price: BigDecimal,
    pub status: ProductStatus,
    pub is_deleted: bool,
    pub created_date: String,
    pub updated_date: Option<String>,
    pub deleted_date: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            seller_id: product.seller_id,
            category_id: product.category_id,
            name: product.name,
            normalized_name: product.normalized_name,
            description: product.description,
            price: product.price,
            status: product.status,
            is_deleted: product.is_deleted,
            created_date: timestamp(&product.created_date),
            updated_date: optional_timestamp(product.updated_date.as_ref()),
            deleted_date: optional_timestamp(product.deleted_date.as_ref()),
        }
    }
}

// ============================================================================
// Product variants
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductVariantRequest {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 64, message = "SKU must be between 1 and 64 characters"))]
    #[schema(example = "DRL-18V-BLK")]
    pub sku: String,
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    #[schema(example = "18V, black")]
    pub name: String,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = String, example = "134.99")]
    pub price: BigDecimal,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    #[serde(default)]
    pub stock_quantity: i32,
}

impl CreateProductVariantRequest {
    pub fn into_new_variant(self) -> NewProductVariant {
        NewProductVariant {
            id: Uuid::new_v4(),
            product_id: self.product_id,
            sku: self.sku,
            name: self.name,
            price: self.price,
            stock_quantity: self.stock_quantity,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProductVariantRequest {
    #[validate(length(min = 1, max = 64, message = "SKU must be between 1 and 64 characters"))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = Option<String>)]
    pub price: Option<BigDecimal>,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: Option<i32>,
}

impl UpdateProductVariantRequest {
    pub fn into_update_variant(self) -> UpdateProductVariant {
        UpdateProductVariant {
            sku: self.sku,
            name: self.name,
            price: self.price,
            stock_quantity: self.stock_quantity,
        }
    }
}

/// Relative stock change; negative values take stock out.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AdjustStockRequest {
    pub delta: i32,
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ProductVariantListQuery {
    pub product_id: Option<Uuid>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Only variants with stock left
    pub in_stock: Option<bool>,
    /// List soft-deleted variants instead of live ones
    pub is_deleted: Option<bool>,
}

impl From<ProductVariantListQuery> for ProductVariantFilter {
    fn from(query: ProductVariantListQuery) -> Self {
        ProductVariantFilter {
            product_id: query.product_id,
            name: query.name,
            in_stock: query.in_stock,
            is_deleted: query.is_deleted,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductVariantResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    #[schema(value_type = String, example = "134.99")]
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub is_deleted: bool,
    pub created_date: String,
    pub updated_date: Option<String>,
    pub deleted_date: Option<String>,
}

impl From<ProductVariant> for ProductVariantResponse {
    fn from(variant: ProductVariant) -> Self {
        Self {
            id: variant.id,
            product_id: variant.product_id,
            sku: variant.sku,
            name: variant.name,
            price: variant.price,
            stock_quantity: variant.stock_quantity,
            is_deleted: variant.is_deleted,
            created_date: timestamp(&variant.created_date),
            updated_date: optional_timestamp(variant.updated_date.as_ref()),
            deleted_date: optional_timestamp(variant.deleted_date.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product_request(price: &str) -> CreateProductRequest {
        CreateProductRequest {
            seller_id: Uuid::new_v4(),
            category_id: 3,
            name: "Cordless drill".to_string(),
            description: None,
            price: BigDecimal::from_str(price).unwrap(),
            status: None,
        }
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let errors = product_request("-0.01").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
        assert!(product_request("0").validate().is_ok());
    }

    #[test]
    fn test_product_defaults_to_draft() {
        let new_product = product_request("10.00").into_new_product();
        assert_eq!(new_product.status, ProductStatus::Draft);
        assert!(!new_product.id.is_nil());
    }

    #[test]
    fn test_price_accepts_string_and_number() {
        let from_string: CreateProductVariantRequest = serde_json::from_str(
            r#"{"product_id":"6f9619ff-8b86-d011-b42d-00cf4fc964ff","sku":"A","name":"A","price":"12.50"}"#,
        )
        .unwrap();
        assert_eq!(from_string.price, BigDecimal::from_str("12.50").unwrap());
        assert_eq!(from_string.stock_quantity, 0);

        let from_number: CreateProductVariantRequest = serde_json::from_str(
            r#"{"product_id":"6f9619ff-8b86-d011-b42d-00cf4fc964ff","sku":"A","name":"A","price":12}"#,
        )
        .unwrap();
        assert_eq!(from_number.price, BigDecimal::from(12));
    }

    #[test]
    fn test_seller_email_is_checked() {
        let request = CreateSellerRequest {
            name: "Acme".to_string(),
            email: "not-an-email".to_string(),
            phone: None,
            description: None,
            is_verified: false,
        };
        assert!(request.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn test_status_parses_from_snake_case() {
        let query: ProductListQuery = serde_json::from_str(r#"{"status":"active"}"#).unwrap();
        assert_eq!(query.status, Some(ProductStatus::Active));
    }
}
