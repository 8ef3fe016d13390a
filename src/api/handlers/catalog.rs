//! Seller, category, product and product variant handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::CATALOG_TAG;
use crate::api::dto::{
    AdjustStockRequest, CategoryListQuery, CategoryResponse, CreateCategoryRequest,
    CreateProductRequest, CreateProductVariantRequest, CreateSellerRequest, ErrorResponse,
    PagedResponse, PaginationParams, ProductListQuery, ProductRatingResponse, ProductResponse,
    ProductVariantListQuery, ProductVariantResponse, SellerListQuery, SellerResponse,
    UpdateCategoryRequest, UpdateProductRequest, UpdateProductVariantRequest, UpdateSellerRequest,
};
use crate::error::AppResult;
use crate::repositories::{CategorySortKey, ProductSortKey, ProductVariantSortKey, SellerSortKey};
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Routes:
/// - GET/POST /sellers, GET/PUT/DELETE /sellers/{id}, GET /sellers/name/{name}
/// - GET/POST /categories, GET/PUT/DELETE /categories/{id}, GET /categories/{id}/children
/// - GET/POST /products, GET/PUT/DELETE /products/{id}, GET /products/{id}/rating
/// - GET/POST /product-variants, GET/PUT/DELETE /product-variants/{id},
///   GET /product-variants/sku/{sku}, POST /product-variants/{id}/stock
pub fn catalog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_sellers, create_seller))
        .routes(routes!(get_seller, update_seller, delete_seller))
        .routes(routes!(get_seller_by_name))
        .routes(routes!(list_categories, create_category))
        .routes(routes!(get_category, update_category, delete_category))
        .routes(routes!(list_category_children))
        .routes(routes!(list_products, create_product))
        .routes(routes!(get_product, update_product, delete_product))
        .routes(routes!(get_product_rating))
        .routes(routes!(list_variants, create_variant))
        .routes(routes!(get_variant, update_variant, delete_variant))
        .routes(routes!(get_variant_by_sku))
        .routes(routes!(adjust_variant_stock))
}

// ============================================================================
// Sellers
// ============================================================================

/// GET /api/v1/sellers - List sellers
///
/// Sort keys: `id`, `name`, `email`, `created_date`.
#[utoipa::path(
    get,
    path = "/sellers",
    tag = CATALOG_TAG,
    params(PaginationParams, SellerListQuery),
    responses(
        (status = 200, description = "Paginated list of sellers", body = PagedResponse<SellerResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_sellers(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<SellerListQuery>,
) -> AppResult<Json<PagedResponse<SellerResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<SellerSortKey>()?;
    let sellers = state
        .services
        .sellers
        .list_sellers(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(sellers, &page)))
}

/// POST /api/v1/sellers - Create seller
#[utoipa::path(
    post,
    path = "/sellers",
    tag = CATALOG_TAG,
    request_body = CreateSellerRequest,
    responses(
        (status = 201, description = "Seller created", body = SellerResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Seller name already taken", body = ErrorResponse)
    )
)]
async fn create_seller(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSellerRequest>,
) -> AppResult<(StatusCode, Json<SellerResponse>)> {
    let seller = state
        .services
        .sellers
        .create_seller(payload.into_new_seller())
        .await?;
    Ok((StatusCode::CREATED, Json(SellerResponse::from(seller))))
}

/// GET /api/v1/sellers/{id} - Get seller by ID
#[utoipa::path(
    get,
    path = "/sellers/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Seller ID")),
    responses(
        (status = 200, description = "Seller found", body = SellerResponse),
        (status = 400, description = "Malformed or nil ID", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
async fn get_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SellerResponse>> {
    let seller = state.services.sellers.get_seller(id).await?;
    Ok(Json(SellerResponse::from(seller)))
}

/// GET /api/v1/sellers/name/{name} - Get seller by name
///
/// The lookup ignores case and surrounding whitespace.
#[utoipa::path(
    get,
    path = "/sellers/name/{name}",
    tag = CATALOG_TAG,
    params(("name" = String, Path, description = "Seller name")),
    responses(
        (status = 200, description = "Seller found", body = SellerResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
async fn get_seller_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<SellerResponse>> {
    let seller = state.services.sellers.get_seller_by_name(&name).await?;
    Ok(Json(SellerResponse::from(seller)))
}

/// PUT /api/v1/sellers/{id} - Update seller
#[utoipa::path(
    put,
    path = "/sellers/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Seller ID")),
    request_body = UpdateSellerRequest,
    responses(
        (status = 200, description = "Seller updated", body = SellerResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Seller not found", body = ErrorResponse),
        (status = 409, description = "Seller name already taken", body = ErrorResponse)
    )
)]
async fn update_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateSellerRequest>,
) -> AppResult<Json<SellerResponse>> {
    let seller = state
        .services
        .sellers
        .update_seller(id, payload.into_update_seller())
        .await?;
    Ok(Json(SellerResponse::from(seller)))
}

/// DELETE /api/v1/sellers/{id} - Soft-delete seller
#[utoipa::path(
    delete,
    path = "/sellers/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Seller ID")),
    responses(
        (status = 204, description = "Seller deleted"),
        (status = 404, description = "Seller not found", body = ErrorResponse)
    )
)]
async fn delete_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.sellers.delete_seller(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories
// ============================================================================

/// GET /api/v1/categories - List categories
///
/// Sort keys: `id`, `name`, `parent_id`, `created_date`.
#[utoipa::path(
    get,
    path = "/categories",
    tag = CATALOG_TAG,
    params(PaginationParams, CategoryListQuery),
    responses(
        (status = 200, description = "Paginated list of categories", body = PagedResponse<CategoryResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_categories(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<CategoryListQuery>,
) -> AppResult<Json<PagedResponse<CategoryResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<CategorySortKey>()?;
    let categories = state
        .services
        .categories
        .list_categories(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(categories, &page)))
}

/// POST /api/v1/categories - Create category
#[utoipa::path(
    post,
    path = "/categories",
    tag = CATALOG_TAG,
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request or unknown parent", body = ErrorResponse),
        (status = 409, description = "Category name already taken", body = ErrorResponse)
    )
)]
async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    let category = state
        .services
        .categories
        .create_category(payload.into_new_category())
        .await?;
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// GET /api/v1/categories/{id} - Get category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = CATALOG_TAG,
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<CategoryResponse>> {
    let category = state.services.categories.get_category(id).await?;
    Ok(Json(CategoryResponse::from(category)))
}

/// GET /api/v1/categories/{id}/children - List direct subcategories
#[utoipa::path(
    get,
    path = "/categories/{id}/children",
    tag = CATALOG_TAG,
    params(("id" = i32, Path, description = "Parent category ID")),
    responses(
        (status = 200, description = "Direct children ordered by name", body = Vec<CategoryResponse>),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
async fn list_category_children(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<CategoryResponse>>> {
    let children = state.services.categories.list_children(id).await?;
    Ok(Json(children.into_iter().map(CategoryResponse::from).collect()))
}

/// PUT /api/v1/categories/{id} - Update category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = CATALOG_TAG,
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid request or unknown parent", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category name already taken", body = ErrorResponse)
    )
)]
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> AppResult<Json<CategoryResponse>> {
    let category = state
        .services
        .categories
        .update_category(id, payload.into_update_category())
        .await?;
    Ok(Json(CategoryResponse::from(category)))
}

/// DELETE /api/v1/categories/{id} - Soft-delete category
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = CATALOG_TAG,
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.categories.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Products
// ============================================================================

/// GET /api/v1/products - List products
///
/// Sort keys: `id`, `name`, `price`, `status`, `created_date`.
#[utoipa::path(
    get,
    path = "/products",
    tag = CATALOG_TAG,
    params(PaginationParams, ProductListQuery),
    responses(
        (status = 200, description = "Paginated list of products", body = PagedResponse<ProductResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<ProductListQuery>,
) -> AppResult<Json<PagedResponse<ProductResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<ProductSortKey>()?;
    let products = state
        .services
        .products
        .list_products(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(products, &page)))
}

/// POST /api/v1/products - Create product
#[utoipa::path(
    post,
    path = "/products",
    tag = CATALOG_TAG,
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid request, unknown seller or category", body = ErrorResponse)
    )
)]
async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let product = state
        .services
        .products
        .create_product(payload.into_new_product())
        .await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// GET /api/v1/products/{id} - Get product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Malformed or nil ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductResponse>> {
    let product = state.services.products.get_product(id).await?;
    Ok(Json(ProductResponse::from(product)))
}

/// GET /api/v1/products/{id}/rating - Average review rating
#[utoipa::path(
    get,
    path = "/products/{id}/rating",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Rating summary", body = ProductRatingResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_product_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductRatingResponse>> {
    let summary = state.services.reviews.product_rating(id).await?;
    Ok(Json(ProductRatingResponse::new(id, summary)))
}

/// PUT /api/v1/products/{id} - Update product
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid request or unknown category", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .services
        .products
        .update_product(id, payload.into_update_product())
        .await?;
    Ok(Json(ProductResponse::from(product)))
}

/// DELETE /api/v1/products/{id} - Soft-delete product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Product variants
// ============================================================================

/// GET /api/v1/product-variants - List product variants
///
/// Sort keys: `id`, `sku`, `name`, `price`, `stock_quantity`, `created_date`.
#[utoipa::path(
    get,
    path = "/product-variants",
    tag = CATALOG_TAG,
    params(PaginationParams, ProductVariantListQuery),
    responses(
        (status = 200, description = "Paginated list of variants", body = PagedResponse<ProductVariantResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_variants(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<ProductVariantListQuery>,
) -> AppResult<Json<PagedResponse<ProductVariantResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<ProductVariantSortKey>()?;
    let variants = state
        .services
        .product_variants
        .list_variants(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(variants, &page)))
}

/// POST /api/v1/product-variants - Create product variant
#[utoipa::path(
    post,
    path = "/product-variants",
    tag = CATALOG_TAG,
    request_body = CreateProductVariantRequest,
    responses(
        (status = 201, description = "Variant created", body = ProductVariantResponse),
        (status = 400, description = "Invalid request or unknown product", body = ErrorResponse),
        (status = 409, description = "SKU already taken", body = ErrorResponse)
    )
)]
async fn create_variant(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductVariantRequest>,
) -> AppResult<(StatusCode, Json<ProductVariantResponse>)> {
    let variant = state
        .services
        .product_variants
        .create_variant(payload.into_new_variant())
        .await?;
    Ok((StatusCode::CREATED, Json(ProductVariantResponse::from(variant))))
}

/// GET /api/v1/product-variants/{id} - Get product variant by ID
#[utoipa::path(
    get,
    path = "/product-variants/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Variant ID")),
    responses(
        (status = 200, description = "Variant found", body = ProductVariantResponse),
        (status = 400, description = "Malformed or nil ID", body = ErrorResponse),
        (status = 404, description = "Variant not found", body = ErrorResponse)
    )
)]
async fn get_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductVariantResponse>> {
    let variant = state.services.product_variants.get_variant(id).await?;
    Ok(Json(ProductVariantResponse::from(variant)))
}

/// GET /api/v1/product-variants/sku/{sku} - Get product variant by SKU
#[utoipa::path(
    get,
    path = "/product-variants/sku/{sku}",
    tag = CATALOG_TAG,
    params(("sku" = String, Path, description = "Stock keeping unit")),
    responses(
        (status = 200, description = "Variant found", body = ProductVariantResponse),
        (status = 404, description = "Variant not found", body = ErrorResponse)
    )
)]
async fn get_variant_by_sku(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<ProductVariantResponse>> {
    let variant = state.services.product_variants.get_variant_by_sku(&sku).await?;
    Ok(Json(ProductVariantResponse::from(variant)))
}

/// PUT /api/v1/product-variants/{id} - Update product variant
#[utoipa::path(
    put,
    path = "/product-variants/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = UpdateProductVariantRequest,
    responses(
        (status = 200, description = "Variant updated", body = ProductVariantResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Variant not found", body = ErrorResponse),
        (status = 409, description = "SKU already taken", body = ErrorResponse)
    )
)]
async fn update_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductVariantRequest>,
) -> AppResult<Json<ProductVariantResponse>> {
    let variant = state
        .services
        .product_variants
        .update_variant(id, payload.into_update_variant())
        .await?;
    Ok(Json(ProductVariantResponse::from(variant)))
}

/// POST /api/v1/product-variants/{id}/stock - Adjust stock
///
/// Applies a relative change; stock never goes below zero.
#[utoipa::path(
    post,
    path = "/product-variants/{id}/stock",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ProductVariantResponse),
        (status = 400, description = "Zero delta", body = ErrorResponse),
        (status = 404, description = "Variant not found", body = ErrorResponse),
        (status = 422, description = "Not enough stock", body = ErrorResponse)
    )
)]
async fn adjust_variant_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AdjustStockRequest>,
) -> AppResult<Json<ProductVariantResponse>> {
    let variant = state
        .services
        .product_variants
        .adjust_stock(id, payload.delta)
        .await?;
    Ok(Json(ProductVariantResponse::from(variant)))
}

/// DELETE /api/v1/product-variants/{id} - Soft-delete product variant
#[utoipa::path(
    delete,
    path = "/product-variants/{id}",
    tag = CATALOG_TAG,
    params(("id" = Uuid, Path, description = "Variant ID")),
    responses(
        (status = 204, description = "Variant deleted"),
        (status = 404, description = "Variant not found", body = ErrorResponse)
    )
)]
async fn delete_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.product_variants.delete_variant(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
