//! Shopping carts of customers.

use std::ops::RangeInclusive;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ProductStatus, ShoppingCart, ShoppingCartItem};
use crate::repositories::{ProductRepository, ShoppingCartRepository};

/// Accepted quantity of a single add or set operation.
pub const CART_AMOUNT_RANGE: RangeInclusive<i32> = 1..=1000;

/// A cart with its lines.
#[derive(Debug, Clone)]
pub struct CartContents {
    pub cart: ShoppingCart,
    pub items: Vec<ShoppingCartItem>,
}

pub fn validate_amount(amount: i32) -> AppResult<()> {
    if !CART_AMOUNT_RANGE.contains(&amount) {
        return Err(AppError::validation(
            "amount",
            format!(
                "Amount must be between {} and {}, got {}",
                CART_AMOUNT_RANGE.start(),
                CART_AMOUNT_RANGE.end(),
                amount
            ),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CartService {
    carts: ShoppingCartRepository,
    products: ProductRepository,
}

impl CartService {
    pub fn new(carts: ShoppingCartRepository, products: ProductRepository) -> Self {
        Self { carts, products }
    }

    async fn existing_cart(&self, customer_id: Uuid) -> AppResult<ShoppingCart> {
        self.carts
            .find_by_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("shopping cart", "customer_id", customer_id))
    }

    /// The customer's cart; an empty one is created on first access.
    pub async fn get_cart(&self, customer_id: Uuid) -> AppResult<CartContents> {
        let cart = self.carts.get_or_create_for_customer(customer_id).await?;
        let items = self.carts.list_items(cart.id).await?;
        Ok(CartContents { cart, items })
    }

    /// Puts `amount` units of an active product into the customer's cart.
    ///
    /// # Errors
    ///
    /// `Validation` for an amount outside [`CART_AMOUNT_RANGE`], `NotFound`
    /// for an unknown product and `UnprocessableContent` when the product is
    /// not on sale.
    pub async fn add_to_cart(
        &self,
        customer_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> AppResult<ShoppingCartItem> {
        validate_amount(amount)?;

        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::not_found("product", "id", product_id))?;
        if product.status != ProductStatus::Active {
            return Err(AppError::unprocessable(format!(
                "Product {} is {} and cannot be added to a cart",
                product.id, product.status
            )));
        }

        let cart = self.carts.get_or_create_for_customer(customer_id).await?;
        let item = self.carts.add_item(cart.id, product_id, amount).await?;
        tracing::debug!(%customer_id, %product_id, amount, total = item.amount, "Added to cart");
        Ok(item)
    }

    pub async fn set_item_amount(
        &self,
        customer_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> AppResult<ShoppingCartItem> {
        validate_amount(amount)?;
        let cart = self.existing_cart(customer_id).await?;
        self.carts.set_item_amount(cart.id, product_id, amount).await
    }

    pub async fn remove_item(&self, customer_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let cart = self.existing_cart(customer_id).await?;
        self.carts.remove_item(cart.id, product_id).await
    }

    /// Empties the cart; the cart itself is kept.
    pub async fn clear_cart(&self, customer_id: Uuid) -> AppResult<usize> {
        let cart = self.existing_cart(customer_id).await?;
        self.carts.clear(cart.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_bounds_are_inclusive() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(1000).is_ok());
    }

    #[test]
    fn test_amount_outside_range_is_rejected() {
        for amount in [0, -3, 1001, i32::MAX] {
            match validate_amount(amount) {
                Err(AppError::Validation { field, reason }) => {
                    assert_eq!(field, "amount");
                    assert!(reason.contains(&amount.to_string()));
                }
                other => panic!("Expected amount validation error, got {:?}", other),
            }
        }
    }
}
