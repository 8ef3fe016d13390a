//! Product reviews and customer complaints.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Complaint, ComplaintStatus, NewComplaint, NewReview, Review, UpdateComplaint, UpdateReview,
};
use crate::repositories::{
    ComplaintFilter, ComplaintRepository, ComplaintSortKey, Page, PageRequest, ProductRepository,
    RatingSummary, ReviewFilter, ReviewRepository, ReviewSortKey, SellerRepository,
};

#[derive(Clone)]
pub struct ReviewService {
    repo: ReviewRepository,
    products: ProductRepository,
}

impl ReviewService {
    pub fn new(repo: ReviewRepository, products: ProductRepository) -> Self {
        Self { repo, products }
    }

    pub async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        sort: ReviewSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Review>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_review(&self, id: Uuid) -> AppResult<Review> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("review", "id", id))
    }

    pub async fn create_review(&self, new_review: NewReview) -> AppResult<Review> {
        if !self.products.exists(new_review.product_id).await? {
            return Err(AppError::validation(
                "product_id",
                format!("Product {} does not exist", new_review.product_id),
            ));
        }
        self.repo.create(new_review).await
    }

    pub async fn update_review(&self, id: Uuid, changes: UpdateReview) -> AppResult<Review> {
        self.get_review(id).await?;
        self.repo.update(id, changes).await
    }

    pub async fn delete_review(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }

    /// Average rating of an existing product.
    pub async fn product_rating(&self, product_id: Uuid) -> AppResult<RatingSummary> {
        if !self.products.exists(product_id).await? {
            return Err(AppError::not_found("product", "id", product_id));
        }
        self.repo.average_rating(product_id).await
    }
}

#[derive(Clone)]
pub struct ComplaintService {
    repo: ComplaintRepository,
    sellers: SellerRepository,
    products: ProductRepository,
}

impl ComplaintService {
    pub fn new(
        repo: ComplaintRepository,
        sellers: SellerRepository,
        products: ProductRepository,
    ) -> Self {
        Self {
            repo,
            sellers,
            products,
        }
    }

    pub async fn list_complaints(
        &self,
        filter: &ComplaintFilter,
        sort: ComplaintSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Complaint>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_complaint(&self, id: Uuid) -> AppResult<Complaint> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("complaint", "id", id))
    }

    /// Files a complaint against a seller, a product, or both.
    pub async fn create_complaint(&self, new_complaint: NewComplaint) -> AppResult<Complaint> {
        if new_complaint.seller_id.is_none() && new_complaint.product_id.is_none() {
            return Err(AppError::validation(
                "seller_id",
                "A complaint must name a seller or a product",
            ));
        }
        if let Some(seller_id) = new_complaint.seller_id {
            if !self.sellers.exists(seller_id).await? {
                return Err(AppError::validation(
                    "seller_id",
                    format!("Seller {} does not exist", seller_id),
                ));
            }
        }
        if let Some(product_id) = new_complaint.product_id {
            if !self.products.exists(product_id).await? {
                return Err(AppError::validation(
                    "product_id",
                    format!("Product {} does not exist", product_id),
                ));
            }
        }
        self.repo.create(new_complaint).await
    }

    pub async fn update_complaint(
        &self,
        id: Uuid,
        changes: UpdateComplaint,
    ) -> AppResult<Complaint> {
        let current = self.get_complaint(id).await?;
        if current.status.is_terminal() {
            return Err(AppError::unprocessable(format!(
                "Complaint {} is {} and can no longer be edited",
                id, current.status
            )));
        }
        self.repo.update(id, changes).await
    }

    pub async fn resolve_complaint(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> AppResult<Complaint> {
        if status == ComplaintStatus::Open {
            return Err(AppError::validation(
                "status",
                "A complaint cannot be moved back to open",
            ));
        }
        let resolved = self.repo.resolve(id, status).await?;
        tracing::info!(complaint_id = %id, status = %resolved.status, "Complaint status changed");
        Ok(resolved)
    }

    pub async fn delete_complaint(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }
}
