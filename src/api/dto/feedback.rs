//! Review and complaint DTOs.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{optional_timestamp, timestamp};
use crate::models::{
    Complaint, ComplaintStatus, NewComplaint, NewReview, Review, UpdateComplaint, UpdateReview,
};
use crate::repositories::{ComplaintFilter, RatingSummary, ReviewFilter};

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateReviewRequest {
    pub product_id: Uuid,
    pub customer_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5, example = 4)]
    pub rating: i16,
    #[validate(length(max = 4000, message = "Comment must be at most 4000 characters"))]
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn into_new_review(self) -> NewReview {
        NewReview {
            id: Uuid::new_v4(),
            product_id: self.product_id,
            customer_id: self.customer_id,
            rating: self.rating,
            comment: self.comment,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5)]
    pub rating: Option<i16>,
    #[validate(length(max = 4000, message = "Comment must be at most 4000 characters"))]
    pub comment: Option<String>,
}

impl UpdateReviewRequest {
    pub fn into_update_review(self) -> UpdateReview {
        UpdateReview {
            rating: self.rating,
            comment: self.comment,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    pub product_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    /// Lowest rating to include
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[param(minimum = 1, maximum = 5)]
    pub min_rating: Option<i16>,
    /// List soft-deleted reviews instead of live ones
    pub is_deleted: Option<bool>,
}

impl From<ReviewListQuery> for ReviewFilter {
    fn from(query: ReviewListQuery) -> Self {
        ReviewFilter {
            product_id: query.product_id,
            customer_id: query.customer_id,
            min_rating: query.min_rating,
            is_deleted: query.is_deleted,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub is_deleted: bool,
    pub created_date: String,
    pub updated_date: Option<String>,
    pub deleted_date: Option<String>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            product_id: review.product_id,
            customer_id: review.customer_id,
            rating: review.rating,
            comment: review.comment,
            is_deleted: review.is_deleted,
            created_date: timestamp(&review.created_date),
            updated_date: optional_timestamp(review.updated_date.as_ref()),
            deleted_date: optional_timestamp(review.deleted_date.as_ref()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRatingResponse {
    pub product_id: Uuid,
    /// Mean rating rounded to two decimals; absent without reviews
    #[schema(value_type = Option<String>, example = "4.25")]
    pub average_rating: Option<BigDecimal>,
    #[schema(example = 12)]
    pub review_count: i64,
}

impl ProductRatingResponse {
    pub fn new(product_id: Uuid, summary: RatingSummary) -> Self {
        Self {
            product_id,
            average_rating: summary.average,
            review_count: summary.count,
        }
    }
}

// ============================================================================
// Complaints
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateComplaintRequest {
    pub customer_id: Uuid,
    /// At least one of `seller_id` and `product_id` is required
    pub seller_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    #[schema(example = "Parcel arrived damaged")]
    pub subject: String,
    #[validate(length(min = 1, max = 8000, message = "Body must be between 1 and 8000 characters"))]
    pub body: String,
}

impl CreateComplaintRequest {
    pub fn into_new_complaint(self) -> NewComplaint {
        NewComplaint {
            id: Uuid::new_v4(),
            customer_id: self.customer_id,
            seller_id: self.seller_id,
            product_id: self.product_id,
            subject: self.subject,
            body: self.body,
            status: ComplaintStatus::Open,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateComplaintRequest {
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 8000, message = "Body must be between 1 and 8000 characters"))]
    pub body: Option<String>,
}

impl UpdateComplaintRequest {
    pub fn into_update_complaint(self) -> UpdateComplaint {
        UpdateComplaint {
            subject: self.subject,
            body: self.body,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ResolveComplaintRequest {
    /// `in_review`, `resolved` or `rejected`
    pub status: ComplaintStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ComplaintListQuery {
    pub customer_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub status: Option<ComplaintStatus>,
}

impl From<ComplaintListQuery> for ComplaintFilter {
    fn from(query: ComplaintListQuery) -> Self {
        ComplaintFilter {
            customer_id: query.customer_id,
            seller_id: query.seller_id,
            product_id: query.product_id,
            status: query.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComplaintResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub status: ComplaintStatus,
    pub created_date: String,
    pub updated_date: Option<String>,
    pub resolved_date: Option<String>,
}

impl From<Complaint> for ComplaintResponse {
    fn from(complaint: Complaint) -> Self {
        Self {
            id: complaint.id,
            customer_id: complaint.customer_id,
            seller_id: complaint.seller_id,
            product_id: complaint.product_id,
            subject: complaint.subject,
            body: complaint.body,
            status: complaint.status,
            created_date: timestamp(&complaint.created_date),
            updated_date: optional_timestamp(complaint.updated_date.as_ref()),
            resolved_date: optional_timestamp(complaint.resolved_date.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_outside_range_is_rejected() {
        for rating in [0, 6] {
            let request = CreateReviewRequest {
                product_id: Uuid::new_v4(),
                customer_id: Uuid::new_v4(),
                rating,
                comment: None,
            };
            assert!(request.validate().is_err(), "rating {} accepted", rating);
        }
    }

    #[test]
    fn test_new_complaint_starts_open() {
        let request = CreateComplaintRequest {
            customer_id: Uuid::new_v4(),
            seller_id: None,
            product_id: Some(Uuid::new_v4()),
            subject: "Broken".to_string(),
            body: "Arrived in pieces".to_string(),
        };
        assert_eq!(request.into_new_complaint().status, ComplaintStatus::Open);
    }
}
