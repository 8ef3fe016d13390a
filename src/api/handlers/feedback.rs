//! Review and complaint handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::FEEDBACK_TAG;
use crate::api::dto::{
    ComplaintListQuery, ComplaintResponse, CreateComplaintRequest, CreateReviewRequest,
    ErrorResponse, PagedResponse, PaginationParams, ResolveComplaintRequest, ReviewListQuery,
    ReviewResponse, UpdateComplaintRequest, UpdateReviewRequest,
};
use crate::error::AppResult;
use crate::repositories::{ComplaintSortKey, ReviewSortKey};
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Routes:
/// - GET/POST /reviews, GET/PUT/DELETE /reviews/{id}
/// - GET/POST /complaints, GET/PUT/DELETE /complaints/{id}, POST /complaints/{id}/resolve
pub fn feedback_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_reviews, create_review))
        .routes(routes!(get_review, update_review, delete_review))
        .routes(routes!(list_complaints, create_complaint))
        .routes(routes!(get_complaint, update_complaint, delete_complaint))
        .routes(routes!(resolve_complaint))
}

// ============================================================================
// Reviews
// ============================================================================

/// GET /api/v1/reviews - List reviews
///
/// Sort keys: `id`, `rating`, `created_date`.
#[utoipa::path(
    get,
    path = "/reviews",
    tag = FEEDBACK_TAG,
    params(PaginationParams, ReviewListQuery),
    responses(
        (status = 200, description = "Paginated list of reviews", body = PagedResponse<ReviewResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_reviews(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<ReviewListQuery>,
) -> AppResult<Json<PagedResponse<ReviewResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<ReviewSortKey>()?;
    let reviews = state
        .services
        .reviews
        .list_reviews(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(reviews, &page)))
}

/// POST /api/v1/reviews - Create review
#[utoipa::path(
    post,
    path = "/reviews",
    tag = FEEDBACK_TAG,
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid request or unknown product", body = ErrorResponse)
    )
)]
async fn create_review(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    let review = state
        .services
        .reviews
        .create_review(payload.into_new_review())
        .await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

/// GET /api/v1/reviews/{id} - Get review by ID
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    tag = FEEDBACK_TAG,
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review found", body = ReviewResponse),
        (status = 400, description = "Malformed or nil ID", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state.services.reviews.get_review(id).await?;
    Ok(Json(ReviewResponse::from(review)))
}

/// PUT /api/v1/reviews/{id} - Update review
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = FEEDBACK_TAG,
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state
        .services
        .reviews
        .update_review(id, payload.into_update_review())
        .await?;
    Ok(Json(ReviewResponse::from(review)))
}

/// DELETE /api/v1/reviews/{id} - Soft-delete review
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = FEEDBACK_TAG,
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Complaints
// ============================================================================

/// GET /api/v1/complaints - List complaints
///
/// Sort keys: `id`, `created_date`, `status`.
#[utoipa::path(
    get,
    path = "/complaints",
    tag = FEEDBACK_TAG,
    params(PaginationParams, ComplaintListQuery),
    responses(
        (status = 200, description = "Paginated list of complaints", body = PagedResponse<ComplaintResponse>),
        (status = 400, description = "Invalid paging, sort key or filter", body = ErrorResponse)
    )
)]
async fn list_complaints(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<ComplaintListQuery>,
) -> AppResult<Json<PagedResponse<ComplaintResponse>>> {
    let page = params.page_request(&state.pagination)?;
    let sort = params.sort_key::<ComplaintSortKey>()?;
    let complaints = state
        .services
        .complaints
        .list_complaints(&query.into(), sort, page)
        .await?;
    Ok(Json(PagedResponse::from_page(complaints, &page)))
}

/// POST /api/v1/complaints - File complaint
#[utoipa::path(
    post,
    path = "/complaints",
    tag = FEEDBACK_TAG,
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint filed", body = ComplaintResponse),
        (status = 400, description = "Invalid request, unknown seller or product", body = ErrorResponse)
    )
)]
async fn create_complaint(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateComplaintRequest>,
) -> AppResult<(StatusCode, Json<ComplaintResponse>)> {
    let complaint = state
        .services
        .complaints
        .create_complaint(payload.into_new_complaint())
        .await?;
    Ok((StatusCode::CREATED, Json(ComplaintResponse::from(complaint))))
}

/// GET /api/v1/complaints/{id} - Get complaint by ID
#[utoipa::path(
    get,
    path = "/complaints/{id}",
    tag = FEEDBACK_TAG,
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint found", body = ComplaintResponse),
        (status = 400, description = "Malformed or nil ID", body = ErrorResponse),
        (status = 404, description = "Complaint not found", body = ErrorResponse)
    )
)]
async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ComplaintResponse>> {
    let complaint = state.services.complaints.get_complaint(id).await?;
    Ok(Json(ComplaintResponse::from(complaint)))
}

/// PUT /api/v1/complaints/{id} - Edit complaint
#[utoipa::path(
    put,
    path = "/complaints/{id}",
    tag = FEEDBACK_TAG,
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateComplaintRequest,
    responses(
        (status = 200, description = "Complaint updated", body = ComplaintResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Complaint not found", body = ErrorResponse),
        (status = 422, description = "Complaint already closed", body = ErrorResponse)
    )
)]
async fn update_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateComplaintRequest>,
) -> AppResult<Json<ComplaintResponse>> {
    let complaint = state
        .services
        .complaints
        .update_complaint(id, payload.into_update_complaint())
        .await?;
    Ok(Json(ComplaintResponse::from(complaint)))
}

/// POST /api/v1/complaints/{id}/resolve - Move complaint forward
///
/// `resolved` and `rejected` close the complaint and set its resolution date.
#[utoipa::path(
    post,
    path = "/complaints/{id}/resolve",
    tag = FEEDBACK_TAG,
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = ResolveComplaintRequest,
    responses(
        (status = 200, description = "Status changed", body = ComplaintResponse),
        (status = 400, description = "Status cannot be open", body = ErrorResponse),
        (status = 404, description = "Complaint not found", body = ErrorResponse),
        (status = 422, description = "Complaint already closed", body = ErrorResponse)
    )
)]
async fn resolve_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ResolveComplaintRequest>,
) -> AppResult<Json<ComplaintResponse>> {
    let complaint = state
        .services
        .complaints
        .resolve_complaint(id, payload.status)
        .await?;
    Ok(Json(ComplaintResponse::from(complaint)))
}

/// DELETE /api/v1/complaints/{id} - Delete complaint
#[utoipa::path(
    delete,
    path = "/complaints/{id}",
    tag = FEEDBACK_TAG,
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 204, description = "Complaint deleted"),
        (status = 404, description = "Complaint not found", body = ErrorResponse)
    )
)]
async fn delete_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.complaints.delete_complaint(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
