use bigdecimal::BigDecimal;
use diesel::dsl::{avg, count_star, now};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewReview, Review, UpdateReview};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, ensure_uuid, order_by, sort_keys,
};
use crate::schema::reviews;

sort_keys! {
    pub enum ReviewSortKey {
        #[default]
        Id => "id",
        Rating => "rating",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub product_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub min_rating: Option<i16>,
    pub is_deleted: Option<bool>,
}

/// Mean rating of a product over its visible reviews.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSummary {
    /// `None` when the product has no reviews
    pub average: Option<BigDecimal>,
    pub count: i64,
}

#[derive(Clone)]
pub struct ReviewRepository {
    db: QueryExecutor,
}

impl ReviewRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &ReviewFilter) -> reviews::BoxedQuery<'static, Pg> {
        let mut query = reviews::table
            .filter(reviews::is_deleted.eq(filter.is_deleted.unwrap_or(false)))
            .into_boxed();
        if let Some(product) = filter.product_id {
            query = query.filter(reviews::product_id.eq(product));
        }
        if let Some(customer) = filter.customer_id {
            query = query.filter(reviews::customer_id.eq(customer));
        }
        if let Some(min) = filter.min_rating {
            query = query.filter(reviews::rating.ge(min));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &ReviewFilter,
        sort: ReviewSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Review>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    ReviewSortKey::Id => order_by!(query, page.direction, reviews::id, reviews::id),
                    ReviewSortKey::Rating => {
                        order_by!(query, page.direction, reviews::rating, reviews::id)
                    }
                    ReviewSortKey::CreatedDate => {
                        order_by!(query, page.direction, reviews::created_date, reviews::id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(Review::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list reviews", page_query).await
    }

    pub async fn find_by_id(&self, review_id: Uuid) -> AppResult<Option<Review>> {
        ensure_uuid("review", review_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find review", async {
                reviews::table
                    .find(review_id)
                    .filter(reviews::is_deleted.eq(false))
                    .select(Review::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn average_rating(&self, product_id: Uuid) -> AppResult<RatingSummary> {
        ensure_uuid("product", product_id)?;
        let mut conn = self.db.connection().await?;

        let (average, count) = self
            .db
            .run(
                "average product rating",
                reviews::table
                    .filter(reviews::product_id.eq(product_id))
                    .filter(reviews::is_deleted.eq(false))
                    .select((avg(reviews::rating), count_star()))
                    .get_result::<(Option<BigDecimal>, i64)>(&mut conn),
            )
            .await?;

        Ok(RatingSummary {
            average: average.map(|value| value.round(2)),
            count,
        })
    }

    pub async fn create(&self, new_review: NewReview) -> AppResult<Review> {
        ensure_uuid("review", new_review.id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert review",
                diesel::insert_into(reviews::table)
                    .values(&new_review)
                    .returning(Review::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(&self, review_id: Uuid, changes: UpdateReview) -> AppResult<Review> {
        ensure_uuid("review", review_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("update review", async {
                diesel::update(
                    reviews::table
                        .find(review_id)
                        .filter(reviews::is_deleted.eq(false)),
                )
                .set((&changes, reviews::updated_date.eq(now)))
                .returning(Review::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("review", "id", review_id))
    }

    pub async fn delete(&self, review_id: Uuid) -> AppResult<()> {
        ensure_uuid("review", review_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete review",
                diesel::update(
                    reviews::table
                        .find(review_id)
                        .filter(reviews::is_deleted.eq(false)),
                )
                .set((reviews::is_deleted.eq(true), reviews::deleted_date.eq(now)))
                .execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("review", "id", review_id));
        }
        Ok(())
    }

    pub async fn exists(&self, review_id: Uuid) -> AppResult<bool> {
        ensure_uuid("review", review_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check review exists",
                diesel::select(diesel::dsl::exists(
                    reviews::table
                        .find(review_id)
                        .filter(reviews::is_deleted.eq(false)),
                ))
                .get_result::<bool>(&mut conn),
            )
            .await
    }
}
