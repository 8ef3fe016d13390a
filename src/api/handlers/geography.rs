//! Country, city and address handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::GEOGRAPHY_TAG;
use crate::api::dto::{
    AddressListQuery, AddressResponse, CityListQuery, CityResponse, CountryListQuery,
    CountryResponse, CreateAddressRequest, CreateCityRequest, CreateCountryRequest,
    ErrorResponse, PagedResponse, PaginationParams, UpdateAddressRequest, UpdateCityRequest,
    UpdateCountryRequest,
};
use crate::error::AppResult;
use crate::repositories::{AddressSortKey, CitySortKey, CountrySortKey};
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Routes:
/// - GET/POST /countries, GET/PUT/DELETE /countries/{id}, GET /countries/iso/{code}
/// - GET/POST /cities, GET/PUT/DELETE /cities/{id}
/// - GET/POST /addresses, GET/PUT/DELETE /addresses/{id}
pub fn geography_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_countries, create_country))
        .routes(routes!(get_country, update_country, delete_country))
        .routes(routes!(get_country_by_iso_code))
        .routes(routes!(list_cities, create_city))
        .routes(routes!(get_city, update_city, delete_city))
        .routes(routes!(list_addresses, create_address))
        .routes(routes!(get_address, update_address, delete_address))
}

// ============================================================================
// Countries
// ============================================================================

/// GET /api/v1/countries - List countries
///
/// Sort keys: `id`, `name`, `iso_code`, `created_date`.
#[utoipa::path(
    get,
    path = "/countries",
    tag = GEOGRAPHY_TAG,
    params(PaginationParams, CountryListQuery),
    responses(
        (status = 200, description = "Paginated list of countries", body = PagedResponse<CountryResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_countries(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<CountryListQuery>,
) -> AppResult<Json<PagedResponse<CountryResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<CountrySortKey>()?;
    let countries = state
        .services
        .countries
        .list_countries(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(countries, &page)))
}

/// POST /api/v1/countries - Create country
#[utoipa::path(
    post,
    path = "/countries",
    tag = GEOGRAPHY_TAG,
    request_body = CreateCountryRequest,
    responses(
        (status = 201, description = "Country created", body = CountryResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Name or ISO code already taken", body = ErrorResponse)
    )
)]
async fn create_country(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCountryRequest>,
) -> AppResult<(StatusCode, Json<CountryResponse>)> {
    let country = state
        .services
        .countries
        .create_country(payload.into_new_country())
        .await?;
    Ok((StatusCode::CREATED, Json(CountryResponse::from(country))))
}

/// GET /api/v1/countries/{id} - Get country by ID
#[utoipa::path(
    get,
    path = "/countries/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = i32, Path, description = "Country ID")),
    responses(
        (status = 200, description = "Country found", body = CountryResponse),
        (status = 404, description = "Country not found", body = ErrorResponse)
    )
)]
async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<CountryResponse>> {
    let country = state.services.countries.get_country(id).await?;
    Ok(Json(CountryResponse::from(country)))
}

/// GET /api/v1/countries/iso/{code} - Get country by ISO code
#[utoipa::path(
    get,
    path = "/countries/iso/{code}",
    tag = GEOGRAPHY_TAG,
    params(("code" = String, Path, description = "ISO 3166-1 alpha-2 code")),
    responses(
        (status = 200, description = "Country found", body = CountryResponse),
        (status = 404, description = "Country not found", body = ErrorResponse)
    )
)]
async fn get_country_by_iso_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<CountryResponse>> {
    let country = state.services.countries.get_country_by_iso_code(&code).await?;
    Ok(Json(CountryResponse::from(country)))
}

/// PUT /api/v1/countries/{id} - Update country
#[utoipa::path(
    put,
    path = "/countries/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = i32, Path, description = "Country ID")),
    request_body = UpdateCountryRequest,
    responses(
        (status = 200, description = "Country updated", body = CountryResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Country not found", body = ErrorResponse),
        (status = 409, description = "Name or ISO code already taken", body = ErrorResponse)
    )
)]
async fn update_country(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCountryRequest>,
) -> AppResult<Json<CountryResponse>> {
    let country = state
        .services
        .countries
        .update_country(id, payload.into_update_country())
        .await?;
    Ok(Json(CountryResponse::from(country)))
}

/// DELETE /api/v1/countries/{id} - Delete country
///
/// Fails with 400 while cities still reference the country.
#[utoipa::path(
    delete,
    path = "/countries/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = i32, Path, description = "Country ID")),
    responses(
        (status = 204, description = "Country deleted"),
        (status = 400, description = "Country still referenced", body = ErrorResponse),
        (status = 404, description = "Country not found", body = ErrorResponse)
    )
)]
async fn delete_country(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.countries.delete_country(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Cities
// ============================================================================

/// GET /api/v1/cities - List cities
///
/// Sort keys: `id`, `name`, `country_id`, `created_date`.
#[utoipa::path(
    get,
    path = "/cities",
    tag = GEOGRAPHY_TAG,
    params(PaginationParams, CityListQuery),
    responses(
        (status = 200, description = "Paginated list of cities", body = PagedResponse<CityResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_cities(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<CityListQuery>,
) -> AppResult<Json<PagedResponse<CityResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<CitySortKey>()?;
    let cities = state
        .services
        .cities
        .list_cities(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(cities, &page)))
}

/// POST /api/v1/cities - Create city
#[utoipa::path(
    post,
    path = "/cities",
    tag = GEOGRAPHY_TAG,
    request_body = CreateCityRequest,
    responses(
        (status = 201, description = "City created", body = CityResponse),
        (status = 400, description = "Invalid request or unknown country", body = ErrorResponse),
        (status = 409, description = "City already exists in the country", body = ErrorResponse)
    )
)]
async fn create_city(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCityRequest>,
) -> AppResult<(StatusCode, Json<CityResponse>)> {
    let city = state
        .services
        .cities
        .create_city(payload.into_new_city())
        .await?;
    Ok((StatusCode::CREATED, Json(CityResponse::from(city))))
}

/// GET /api/v1/cities/{id} - Get city by ID
#[utoipa::path(
    get,
    path = "/cities/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = i32, Path, description = "City ID")),
    responses(
        (status = 200, description = "City found", body = CityResponse),
        (status = 404, description = "City not found", body = ErrorResponse)
    )
)]
async fn get_city(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<CityResponse>> {
    let city = state.services.cities.get_city(id).await?;
    Ok(Json(CityResponse::from(city)))
}

/// PUT /api/v1/cities/{id} - Update city
#[utoipa::path(
    put,
    path = "/cities/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = i32, Path, description = "City ID")),
    request_body = UpdateCityRequest,
    responses(
        (status = 200, description = "City updated", body = CityResponse),
        (status = 400, description = "Invalid request or unknown country", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
        (status = 409, description = "City already exists in the country", body = ErrorResponse)
    )
)]
async fn update_city(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCityRequest>,
) -> AppResult<Json<CityResponse>> {
    let city = state
        .services
        .cities
        .update_city(id, payload.into_update_city())
        .await?;
    Ok(Json(CityResponse::from(city)))
}

/// DELETE /api/v1/cities/{id} - Delete city
#[utoipa::path(
    delete,
    path = "/cities/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = i32, Path, description = "City ID")),
    responses(
        (status = 204, description = "City deleted"),
        (status = 400, description = "City still referenced", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse)
    )
)]
async fn delete_city(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.cities.delete_city(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Addresses
// ============================================================================

/// GET /api/v1/addresses - List addresses
///
/// Sort keys: `id`, `street`, `postal_code`, `created_date`.
#[utoipa::path(
    get,
    path = "/addresses",
    tag = GEOGRAPHY_TAG,
    params(PaginationParams, AddressListQuery),
    responses(
        (status = 200, description = "Paginated list of addresses", body = PagedResponse<AddressResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_addresses(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<AddressListQuery>,
) -> AppResult<Json<PagedResponse<AddressResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<AddressSortKey>()?;
    let addresses = state
        .services
        .addresses
        .list_addresses(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(addresses, &page)))
}

/// POST /api/v1/addresses - Create address
#[utoipa::path(
    post,
    path = "/addresses",
    tag = GEOGRAPHY_TAG,
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address created", body = AddressResponse),
        (status = 400, description = "Invalid request or unknown city", body = ErrorResponse)
    )
)]
async fn create_address(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAddressRequest>,
) -> AppResult<(StatusCode, Json<AddressResponse>)> {
    let address = state
        .services
        .addresses
        .create_address(payload.into_new_address())
        .await?;
    Ok((StatusCode::CREATED, Json(AddressResponse::from(address))))
}

/// GET /api/v1/addresses/{id} - Get address by ID
#[utoipa::path(
    get,
    path = "/addresses/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address found", body = AddressResponse),
        (status = 400, description = "Malformed or nil ID", body = ErrorResponse),
        (status = 404, description = "Address not found", body = ErrorResponse)
    )
)]
async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AddressResponse>> {
    let address = state.services.addresses.get_address(id).await?;
    Ok(Json(AddressResponse::from(address)))
}

/// PUT /api/v1/addresses/{id} - Update address
#[utoipa::path(
    put,
    path = "/addresses/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Address updated", body = AddressResponse),
        (status = 400, description = "Invalid request or unknown city", body = ErrorResponse),
        (status = 404, description = "Address not found", body = ErrorResponse)
    )
)]
async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAddressRequest>,
) -> AppResult<Json<AddressResponse>> {
    let address = state
        .services
        .addresses
        .update_address(id, payload.into_update_address())
        .await?;
    Ok(Json(AddressResponse::from(address)))
}

/// DELETE /api/v1/addresses/{id} - Soft-delete address
#[utoipa::path(
    delete,
    path = "/addresses/{id}",
    tag = GEOGRAPHY_TAG,
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 404, description = "Address not found", body = ErrorResponse)
    )
)]
async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.addresses.delete_address(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
