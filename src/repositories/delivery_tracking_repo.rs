use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::error::AppResult;
use crate::models::{DeliveryStatus, DeliveryTracking, NewDeliveryTracking};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, ensure_positive, order_by, sort_keys,
};
use crate::schema::delivery_tracking_history;

sort_keys! {
    pub enum DeliveryTrackingSortKey {
        #[default]
        Id => "id",
        CreatedDate => "created_date",
        Status => "status",
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryTrackingFilter {
    pub delivery_order_id: Option<i64>,
    pub status: Option<DeliveryStatus>,
}

/// Append-only history of delivery status changes.
#[derive(Clone)]
pub struct DeliveryTrackingRepository {
    db: QueryExecutor,
}

impl DeliveryTrackingRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(
        filter: &DeliveryTrackingFilter,
    ) -> delivery_tracking_history::BoxedQuery<'static, Pg> {
        let mut query = delivery_tracking_history::table.into_boxed();
        if let Some(order) = filter.delivery_order_id {
            query = query.filter(delivery_tracking_history::delivery_order_id.eq(order));
        }
        if let Some(status) = filter.status {
            query = query.filter(delivery_tracking_history::status.eq(status));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &DeliveryTrackingFilter,
        sort: DeliveryTrackingSortKey,
        page: PageRequest,
    ) -> AppResult<Page<DeliveryTracking>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    DeliveryTrackingSortKey::Id => {
                        order_by!(
                            query,
                            page.direction,
                            delivery_tracking_history::id,
                            delivery_tracking_history::id
                        )
                    }
                    DeliveryTrackingSortKey::CreatedDate => {
                        order_by!(
                            query,
                            page.direction,
                            delivery_tracking_history::created_date,
                            delivery_tracking_history::id
                        )
                    }
                    DeliveryTrackingSortKey::Status => {
                        order_by!(
                            query,
                            page.direction,
                            delivery_tracking_history::status,
                            delivery_tracking_history::id
                        )
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(DeliveryTracking::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list delivery tracking", page_query).await
    }

    /// History of one order, oldest entry first unless the page asks otherwise.
    pub async fn list_for_order(
        &self,
        order_id: i64,
        page: PageRequest,
    ) -> AppResult<Page<DeliveryTracking>> {
        ensure_positive("delivery order", "id", order_id)?;
        let filter = DeliveryTrackingFilter {
            delivery_order_id: Some(order_id),
            status: None,
        };
        self.list(&filter, DeliveryTrackingSortKey::CreatedDate, page)
            .await
    }

    pub async fn find_by_id(&self, tracking_id: i64) -> AppResult<Option<DeliveryTracking>> {
        ensure_positive("delivery tracking", "id", tracking_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find delivery tracking", async {
                delivery_tracking_history::table
                    .find(tracking_id)
                    .select(DeliveryTracking::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, entry: NewDeliveryTracking) -> AppResult<DeliveryTracking> {
        ensure_positive("delivery order", "id", entry.delivery_order_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert delivery tracking",
                diesel::insert_into(delivery_tracking_history::table)
                    .values(&entry)
                    .returning(DeliveryTracking::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn exists(&self, tracking_id: i64) -> AppResult<bool> {
        ensure_positive("delivery tracking", "id", tracking_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check delivery tracking exists",
                diesel::select(diesel::dsl::exists(
                    delivery_tracking_history::table.find(tracking_id),
                ))
                .get_result::<bool>(&mut conn),
            )
            .await
    }
}
