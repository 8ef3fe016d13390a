//! Delivery tariff and delivery order handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::DELIVERY_TAG;
use crate::api::dto::{
    ChangeDeliveryStatusRequest, CreateDeliveryOrderRequest, CreateDeliveryTariffRequest,
    DeliveryOrderListQuery, DeliveryOrderResponse, DeliveryTariffListQuery,
    DeliveryTariffResponse, DeliveryTrackingResponse, ErrorResponse, PagedResponse,
    PaginationParams, QuoteQuery, QuoteResponse, UpdateDeliveryOrderRequest,
    UpdateDeliveryTariffRequest,
};
use crate::error::AppResult;
use crate::repositories::{DeliveryOrderSortKey, DeliveryTariffSortKey};
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Routes:
/// - GET/POST /delivery-tariffs, GET/PUT/DELETE /delivery-tariffs/{id},
///   GET /delivery-tariffs/{id}/quote
/// - GET/POST /delivery-orders, GET/PUT/DELETE /delivery-orders/{id},
///   POST /delivery-orders/{id}/status, GET /delivery-orders/{id}/tracking
pub fn delivery_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_tariffs, create_tariff))
        .routes(routes!(get_tariff, update_tariff, delete_tariff))
        .routes(routes!(quote_tariff))
        .routes(routes!(list_orders, create_order))
        .routes(routes!(get_order, update_order, delete_order))
        .routes(routes!(change_order_status))
        .routes(routes!(list_order_tracking))
}

// ============================================================================
// Tariffs
// ============================================================================

/// GET /api/v1/delivery-tariffs - List delivery tariffs
///
/// Sort keys: `id`, `name`, `base_price`, `price_per_kg`, `min_days`, `created_date`.
#[utoipa::path(
    get,
    path = "/delivery-tariffs",
    tag = DELIVERY_TAG,
    params(PaginationParams, DeliveryTariffListQuery),
    responses(
        (status = 200, description = "Paginated list of tariffs", body = PagedResponse<DeliveryTariffResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_tariffs(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<DeliveryTariffListQuery>,
) -> AppResult<Json<PagedResponse<DeliveryTariffResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<DeliveryTariffSortKey>()?;
    let tariffs = state
        .services
        .delivery_tariffs
        .list_tariffs(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(tariffs, &page)))
}

/// POST /api/v1/delivery-tariffs - Create delivery tariff
#[utoipa::path(
    post,
    path = "/delivery-tariffs",
    tag = DELIVERY_TAG,
    request_body = CreateDeliveryTariffRequest,
    responses(
        (status = 201, description = "Tariff created", body = DeliveryTariffResponse),
        (status = 400, description = "Invalid request or day range", body = ErrorResponse),
        (status = 409, description = "Tariff name already taken", body = ErrorResponse)
    )
)]
async fn create_tariff(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDeliveryTariffRequest>,
) -> AppResult<(StatusCode, Json<DeliveryTariffResponse>)> {
    let tariff = state
        .services
        .delivery_tariffs
        .create_tariff(payload.into_new_tariff())
        .await?;
    Ok((StatusCode::CREATED, Json(DeliveryTariffResponse::from(tariff))))
}

/// GET /api/v1/delivery-tariffs/{id} - Get delivery tariff by ID
#[utoipa::path(
    get,
    path = "/delivery-tariffs/{id}",
    tag = DELIVERY_TAG,
    params(("id" = i32, Path, description = "Tariff ID")),
    responses(
        (status = 200, description = "Tariff found", body = DeliveryTariffResponse),
        (status = 404, description = "Tariff not found", body = ErrorResponse)
    )
)]
async fn get_tariff(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DeliveryTariffResponse>> {
    let tariff = state.services.delivery_tariffs.get_tariff(id).await?;
    Ok(Json(DeliveryTariffResponse::from(tariff)))
}

/// GET /api/v1/delivery-tariffs/{id}/quote - Price a parcel
///
/// `base_price + price_per_kg * weight_kg`, rounded to cents.
#[utoipa::path(
    get,
    path = "/delivery-tariffs/{id}/quote",
    tag = DELIVERY_TAG,
    params(("id" = i32, Path, description = "Tariff ID"), QuoteQuery),
    responses(
        (status = 200, description = "Delivery price", body = QuoteResponse),
        (status = 400, description = "Missing or non-positive weight", body = ErrorResponse),
        (status = 404, description = "Tariff not found", body = ErrorResponse)
    )
)]
async fn quote_tariff(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<QuoteQuery>,
) -> AppResult<Json<QuoteResponse>> {
    let price = state
        .services
        .delivery_tariffs
        .quote(id, &query.weight_kg)
        .await?;
    Ok(Json(QuoteResponse {
        tariff_id: id,
        weight_kg: query.weight_kg,
        price,
    }))
}

/// PUT /api/v1/delivery-tariffs/{id} - Update delivery tariff
#[utoipa::path(
    put,
    path = "/delivery-tariffs/{id}",
    tag = DELIVERY_TAG,
    params(("id" = i32, Path, description = "Tariff ID")),
    request_body = UpdateDeliveryTariffRequest,
    responses(
        (status = 200, description = "Tariff updated", body = DeliveryTariffResponse),
        (status = 400, description = "Invalid request or day range", body = ErrorResponse),
        (status = 404, description = "Tariff not found", body = ErrorResponse),
        (status = 409, description = "Tariff name already taken", body = ErrorResponse)
    )
)]
async fn update_tariff(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateDeliveryTariffRequest>,
) -> AppResult<Json<DeliveryTariffResponse>> {
    let tariff = state
        .services
        .delivery_tariffs
        .update_tariff(id, payload.into_update_tariff())
        .await?;
    Ok(Json(DeliveryTariffResponse::from(tariff)))
}

/// DELETE /api/v1/delivery-tariffs/{id} - Delete delivery tariff
///
/// Tariffs used by orders cannot be deleted; deactivate them instead.
#[utoipa::path(
    delete,
    path = "/delivery-tariffs/{id}",
    tag = DELIVERY_TAG,
    params(("id" = i32, Path, description = "Tariff ID")),
    responses(
        (status = 204, description = "Tariff deleted"),
        (status = 400, description = "Tariff still referenced by orders", body = ErrorResponse),
        (status = 404, description = "Tariff not found", body = ErrorResponse)
    )
)]
async fn delete_tariff(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.delivery_tariffs.delete_tariff(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Orders
// ============================================================================

/// GET /api/v1/delivery-orders - List delivery orders
///
/// Sort keys: `id`, `created_date`, `status`, `total_price`.
#[utoipa::path(
    get,
    path = "/delivery-orders",
    tag = DELIVERY_TAG,
    params(PaginationParams, DeliveryOrderListQuery),
    responses(
        (status = 200, description = "Paginated list of orders", body = PagedResponse<DeliveryOrderResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_orders(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<DeliveryOrderListQuery>,
) -> AppResult<Json<PagedResponse<DeliveryOrderResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<DeliveryOrderSortKey>()?;
    let orders = state
        .services
        .delivery_orders
        .list_orders(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(orders, &page)))
}

/// POST /api/v1/delivery-orders - Place delivery order
///
/// The total price is computed from the tariff; the order starts as `created`
/// with a first tracking entry.
#[utoipa::path(
    post,
    path = "/delivery-orders",
    tag = DELIVERY_TAG,
    request_body = CreateDeliveryOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = DeliveryOrderResponse),
        (status = 400, description = "Invalid request, unknown address or tariff", body = ErrorResponse),
        (status = 422, description = "Tariff is inactive", body = ErrorResponse)
    )
)]
async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDeliveryOrderRequest>,
) -> AppResult<(StatusCode, Json<DeliveryOrderResponse>)> {
    let order = state
        .services
        .delivery_orders
        .place_order(payload.into_place_order())
        .await?;
    Ok((StatusCode::CREATED, Json(DeliveryOrderResponse::from(order))))
}

/// GET /api/v1/delivery-orders/{id} - Get delivery order by ID
#[utoipa::path(
    get,
    path = "/delivery-orders/{id}",
    tag = DELIVERY_TAG,
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = DeliveryOrderResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeliveryOrderResponse>> {
    let order = state.services.delivery_orders.get_order(id).await?;
    Ok(Json(DeliveryOrderResponse::from(order)))
}

/// PUT /api/v1/delivery-orders/{id} - Change delivery address
#[utoipa::path(
    put,
    path = "/delivery-orders/{id}",
    tag = DELIVERY_TAG,
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdateDeliveryOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = DeliveryOrderResponse),
        (status = 400, description = "Unknown address", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 422, description = "Order already delivered or cancelled", body = ErrorResponse)
    )
)]
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateDeliveryOrderRequest>,
) -> AppResult<Json<DeliveryOrderResponse>> {
    let order = state
        .services
        .delivery_orders
        .update_order(id, payload.into_update_order())
        .await?;
    Ok(Json(DeliveryOrderResponse::from(order)))
}

/// DELETE /api/v1/delivery-orders/{id} - Delete delivery order
///
/// Removes the order together with its tracking history.
#[utoipa::path(
    delete,
    path = "/delivery-orders/{id}",
    tag = DELIVERY_TAG,
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.delivery_orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/delivery-orders/{id}/status - Change order status
///
/// Appends a tracking entry in the same transaction.
#[utoipa::path(
    post,
    path = "/delivery-orders/{id}/status",
    tag = DELIVERY_TAG,
    params(("id" = i64, Path, description = "Order ID")),
    request_body = ChangeDeliveryStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = DeliveryOrderResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 422, description = "Order already delivered or cancelled", body = ErrorResponse)
    )
)]
async fn change_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ChangeDeliveryStatusRequest>,
) -> AppResult<Json<DeliveryOrderResponse>> {
    let order = state
        .services
        .delivery_orders
        .change_status(id, payload.into_status_change())
        .await?;
    Ok(Json(DeliveryOrderResponse::from(order)))
}

/// GET /api/v1/delivery-orders/{id}/tracking - Tracking history
///
/// Entries are ordered by creation time; `descending=true` lists the newest first.
#[utoipa::path(
    get,
    path = "/delivery-orders/{id}/tracking",
    tag = DELIVERY_TAG,
    params(("id" = i64, Path, description = "Order ID"), PaginationParams),
    responses(
        (status = 200, description = "Paginated tracking history", body = PagedResponse<DeliveryTrackingResponse>),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
async fn list_order_tracking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<PagedResponse<DeliveryTrackingResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let entries = state.services.delivery_orders.tracking(id, page).await?;
    Ok(Json(PagedResponse::from_page(entries, &page)))
}
