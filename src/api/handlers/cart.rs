//! Shopping cart handlers.
//!
//! Every route acts on the cart of the customer named by `X-Customer-Id`.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    middleware,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::CART_TAG;
use crate::api::dto::{CartItemResponse, CartResponse, ErrorResponse};
use crate::api::middleware::{Customer, customer_middleware};
use crate::error::AppResult;
use crate::state::AppState;

/// Routes:
/// - GET /cart                                 - Current cart
/// - DELETE /cart                              - Empty the cart
/// - POST /add-to-cart/{product_id}/{amount}   - Add units of a product
/// - PUT /cart/items/{product_id}/{amount}     - Replace the amount of a line
/// - DELETE /cart/items/{product_id}           - Remove a line
pub fn cart_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_cart, clear_cart))
        .routes(routes!(add_to_cart))
        .routes(routes!(set_item_amount))
        .routes(routes!(remove_item))
        .route_layer(middleware::from_fn(customer_middleware))
}

/// GET /api/v1/cart - Current cart
///
/// An empty cart is created on first access.
#[utoipa::path(
    get,
    path = "/cart",
    tag = CART_TAG,
    responses(
        (status = 200, description = "Cart with its lines", body = CartResponse),
        (status = 401, description = "Missing or invalid X-Customer-Id", body = ErrorResponse)
    ),
    security(("customerId" = []))
)]
async fn get_cart(
    State(state): State<AppState>,
    Extension(customer): Extension<Customer>,
) -> AppResult<Json<CartResponse>> {
    let contents = state.services.carts.get_cart(customer.id).await?;
    Ok(Json(CartResponse::from(contents)))
}

/// POST /api/v1/add-to-cart/{product_id}/{amount} - Add product to cart
///
/// Adding a product already in the cart increases its amount.
#[utoipa::path(
    post,
    path = "/add-to-cart/{product_id}/{amount}",
    tag = CART_TAG,
    params(
        ("product_id" = Uuid, Path, description = "Product ID"),
        ("amount" = i32, Path, description = "Units to add (1 to 1000)", minimum = 1, maximum = 1000)
    ),
    responses(
        (status = 202, description = "Product added", body = CartItemResponse),
        (status = 400, description = "Amount out of range or malformed ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid X-Customer-Id", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 422, description = "Product is not on sale", body = ErrorResponse)
    ),
    security(("customerId" = []))
)]
async fn add_to_cart(
    State(state): State<AppState>,
    Extension(customer): Extension<Customer>,
    Path((product_id, amount)): Path<(Uuid, i32)>,
) -> AppResult<(StatusCode, Json<CartItemResponse>)> {
    let item = state
        .services
        .carts
        .add_to_cart(customer.id, product_id, amount)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(CartItemResponse::from(item))))
}

/// PUT /api/v1/cart/items/{product_id}/{amount} - Set line amount
#[utoipa::path(
    put,
    path = "/cart/items/{product_id}/{amount}",
    tag = CART_TAG,
    params(
        ("product_id" = Uuid, Path, description = "Product ID"),
        ("amount" = i32, Path, description = "New amount (1 to 1000)", minimum = 1, maximum = 1000)
    ),
    responses(
        (status = 200, description = "Amount replaced", body = CartItemResponse),
        (status = 400, description = "Amount out of range or malformed ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid X-Customer-Id", body = ErrorResponse),
        (status = 404, description = "No cart or product not in cart", body = ErrorResponse)
    ),
    security(("customerId" = []))
)]
async fn set_item_amount(
    State(state): State<AppState>,
    Extension(customer): Extension<Customer>,
    Path((product_id, amount)): Path<(Uuid, i32)>,
) -> AppResult<Json<CartItemResponse>> {
    let item = state
        .services
        .carts
        .set_item_amount(customer.id, product_id, amount)
        .await?;
    Ok(Json(CartItemResponse::from(item)))
}

/// DELETE /api/v1/cart/items/{product_id} - Remove line
#[utoipa::path(
    delete,
    path = "/cart/items/{product_id}",
    tag = CART_TAG,
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 401, description = "Missing or invalid X-Customer-Id", body = ErrorResponse),
        (status = 404, description = "No cart or product not in cart", body = ErrorResponse)
    ),
    security(("customerId" = []))
)]
async fn remove_item(
    State(state): State<AppState>,
    Extension(customer): Extension<Customer>,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .carts
        .remove_item(customer.id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cart - Empty cart
#[utoipa::path(
    delete,
    path = "/cart",
    tag = CART_TAG,
    responses(
        (status = 204, description = "Cart emptied"),
        (status = 401, description = "Missing or invalid X-Customer-Id", body = ErrorResponse),
        (status = 404, description = "Customer has no cart", body = ErrorResponse)
    ),
    security(("customerId" = []))
)]
async fn clear_cart(
    State(state): State<AppState>,
    Extension(customer): Extension<Customer>,
) -> AppResult<StatusCode> {
    let removed = state.services.carts.clear_cart(customer.id).await?;
    tracing::debug!(customer_id = %customer.id, removed, "Cart cleared");
    Ok(StatusCode::NO_CONTENT)
}
