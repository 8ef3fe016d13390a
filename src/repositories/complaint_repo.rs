use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Complaint, ComplaintStatus, NewComplaint, UpdateComplaint};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, db_error, ensure_uuid, order_by, sort_keys,
};
use crate::schema::complaints;

sort_keys! {
    pub enum ComplaintSortKey {
        #[default]
        Id => "id",
        CreatedDate => "created_date",
        Status => "status",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub customer_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub status: Option<ComplaintStatus>,
}

#[derive(Clone)]
pub struct ComplaintRepository {
    db: QueryExecutor,
}

impl ComplaintRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &ComplaintFilter) -> complaints::BoxedQuery<'static, Pg> {
        let mut query = complaints::table.into_boxed();
        if let Some(customer) = filter.customer_id {
            query = query.filter(complaints::customer_id.eq(customer));
        }
        if let Some(seller) = filter.seller_id {
            query = query.filter(complaints::seller_id.eq(seller));
        }
        if let Some(product) = filter.product_id {
            query = query.filter(complaints::product_id.eq(product));
        }
        if let Some(status) = filter.status {
            query = query.filter(complaints::status.eq(status));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &ComplaintFilter,
        sort: ComplaintSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Complaint>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    ComplaintSortKey::Id => {
                        order_by!(query, page.direction, complaints::id, complaints::id)
                    }
                    ComplaintSortKey::CreatedDate => {
                        order_by!(query, page.direction, complaints::created_date, complaints::id)
                    }
                    ComplaintSortKey::Status => {
                        order_by!(query, page.direction, complaints::status, complaints::id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(Complaint::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list complaints", page_query).await
    }

    pub async fn find_by_id(&self, complaint_id: Uuid) -> AppResult<Option<Complaint>> {
        ensure_uuid("complaint", complaint_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find complaint", async {
                complaints::table
                    .find(complaint_id)
                    .select(Complaint::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, new_complaint: NewComplaint) -> AppResult<Complaint> {
        ensure_uuid("complaint", new_complaint.id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert complaint",
                diesel::insert_into(complaints::table)
                    .values(&new_complaint)
                    .returning(Complaint::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(
        &self,
        complaint_id: Uuid,
        changes: UpdateComplaint,
    ) -> AppResult<Complaint> {
        ensure_uuid("complaint", complaint_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("update complaint", async {
                diesel::update(complaints::table.find(complaint_id))
                    .set((&changes, complaints::updated_date.eq(now)))
                    .returning(Complaint::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("complaint", "id", complaint_id))
    }

    /// Moves the complaint to `status`. Resolved and rejected complaints are
    /// closed: they get a `resolved_date` and accept no further changes.
    pub async fn resolve(
        &self,
        complaint_id: Uuid,
        status: ComplaintStatus,
    ) -> AppResult<Complaint> {
        ensure_uuid("complaint", complaint_id)?;

        let mut conn = self.db.connection().await?;
        let transaction = conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let current = complaints::table
                    .find(complaint_id)
                    .select(complaints::status)
                    .for_update()
                    .first::<ComplaintStatus>(conn)
                    .await
                    .optional()
                    .map_err(db_error("lock complaint"))?
                    .ok_or_else(|| AppError::not_found("complaint", "id", complaint_id))?;

                if current.is_terminal() {
                    return Err(AppError::unprocessable(format!(
                        "Complaint {} is already {}",
                        complaint_id, current
                    )));
                }

                let target = complaints::table.find(complaint_id);
                let updated = if status.is_terminal() {
                    diesel::update(target)
                        .set((
                            complaints::status.eq(status),
                            complaints::updated_date.eq(now),
                            complaints::resolved_date.eq(now),
                        ))
                        .returning(Complaint::as_returning())
                        .get_result(conn)
                        .await
                } else {
                    diesel::update(target)
                        .set((
                            complaints::status.eq(status),
                            complaints::updated_date.eq(now),
                        ))
                        .returning(Complaint::as_returning())
                        .get_result(conn)
                        .await
                };
                updated.map_err(db_error("update complaint status"))
            }
            .scope_boxed()
        });

        self.db.run_unit("resolve complaint", transaction).await
    }

    pub async fn delete(&self, complaint_id: Uuid) -> AppResult<()> {
        ensure_uuid("complaint", complaint_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete complaint",
                diesel::delete(complaints::table.find(complaint_id)).execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("complaint", "id", complaint_id));
        }
        Ok(())
    }

    pub async fn exists(&self, complaint_id: Uuid) -> AppResult<bool> {
        ensure_uuid("complaint", complaint_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check complaint exists",
                diesel::select(diesel::dsl::exists(complaints::table.find(complaint_id)))
                    .get_result::<bool>(&mut conn),
            )
            .await
    }
}
