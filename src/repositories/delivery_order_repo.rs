use bigdecimal::BigDecimal;
use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    DeliveryOrder, DeliveryStatus, DeliveryTariff, NewDeliveryOrder, NewDeliveryTracking,
    UpdateDeliveryOrder,
};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, db_error, ensure_positive, ensure_uuid, order_by, sort_keys,
};
use crate::schema::{delivery_orders, delivery_tariffs, delivery_tracking_history};

sort_keys! {
    pub enum DeliveryOrderSortKey {
        #[default]
        Id => "id",
        CreatedDate => "created_date",
        Status => "status",
        TotalPrice => "total_price",
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryOrderFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<DeliveryStatus>,
    pub tariff_id: Option<i32>,
}

/// Input of [`DeliveryOrderRepository::create`]; the price is derived from
/// the tariff.
#[derive(Debug, Clone)]
pub struct PlaceDeliveryOrder {
    pub address_id: Uuid,
    pub tariff_id: i32,
    pub customer_id: Uuid,
    pub weight_kg: BigDecimal,
}

/// A requested status transition with its tracking details.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: DeliveryStatus,
    pub location: Option<String>,
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct DeliveryOrderRepository {
    db: QueryExecutor,
}

impl DeliveryOrderRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &DeliveryOrderFilter) -> delivery_orders::BoxedQuery<'static, Pg> {
        let mut query = delivery_orders::table.into_boxed();
        if let Some(customer) = filter.customer_id {
            query = query.filter(delivery_orders::customer_id.eq(customer));
        }
        if let Some(status) = filter.status {
            query = query.filter(delivery_orders::status.eq(status));
        }
        if let Some(tariff) = filter.tariff_id {
            query = query.filter(delivery_orders::tariff_id.eq(tariff));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &DeliveryOrderFilter,
        sort: DeliveryOrderSortKey,
        page: PageRequest,
    ) -> AppResult<Page<DeliveryOrder>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    DeliveryOrderSortKey::Id => {
                        order_by!(query, page.direction, delivery_orders::id, delivery_orders::id)
                    }
                    DeliveryOrderSortKey::CreatedDate => order_by!(
                        query,
                        page.direction,
                        delivery_orders::created_date,
                        delivery_orders::id
                    ),
                    DeliveryOrderSortKey::Status => {
                        order_by!(query, page.direction, delivery_orders::status, delivery_orders::id)
                    }
                    DeliveryOrderSortKey::TotalPrice => order_by!(
                        query,
                        page.direction,
                        delivery_orders::total_price,
                        delivery_orders::id
                    ),
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(DeliveryOrder::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list delivery orders", page_query).await
    }

    pub async fn find_by_id(&self, order_id: i64) -> AppResult<Option<DeliveryOrder>> {
        ensure_positive("delivery order", "id", order_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find delivery order", async {
                delivery_orders::table
                    .find(order_id)
                    .select(DeliveryOrder::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    /// Prices the order from its tariff and records the initial `created`
    /// tracking entry, both in one transaction.
    ///
    /// # Errors
    ///
    /// `Validation` on `tariff_id` when the tariff does not exist,
    /// `UnprocessableContent` when it is inactive.
    pub async fn create(&self, order: PlaceDeliveryOrder) -> AppResult<DeliveryOrder> {
        ensure_uuid("address", order.address_id)?;
        ensure_uuid("customer", order.customer_id)?;
        ensure_positive("delivery tariff", "tariff_id", order.tariff_id.into())?;
        if order.weight_kg <= BigDecimal::from(0) {
            return Err(AppError::validation("weight_kg", "Weight must be positive"));
        }

        let mut conn = self.db.connection().await?;
        let transaction = conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let tariff = delivery_tariffs::table
                    .find(order.tariff_id)
                    .select(DeliveryTariff::as_select())
                    .first(conn)
                    .await
                    .optional()
                    .map_err(db_error("load delivery tariff"))?
                    .ok_or_else(|| {
                        AppError::validation(
                            "tariff_id",
                            format!("Delivery tariff {} does not exist", order.tariff_id),
                        )
                    })?;

                if !tariff.is_active {
                    return Err(AppError::unprocessable(format!(
                        "Delivery tariff '{}' is not active",
                        tariff.name
                    )));
                }

                let created = diesel::insert_into(delivery_orders::table)
                    .values(&NewDeliveryOrder {
                        address_id: order.address_id,
                        tariff_id: tariff.id,
                        customer_id: order.customer_id,
                        status: DeliveryStatus::Created,
                        total_price: tariff.quote(&order.weight_kg),
                        weight_kg: order.weight_kg,
                    })
                    .returning(DeliveryOrder::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(db_error("insert delivery order"))?;

                diesel::insert_into(delivery_tracking_history::table)
                    .values(&NewDeliveryTracking {
                        delivery_order_id: created.id,
                        status: DeliveryStatus::Created,
                        location: None,
                        note: None,
                    })
                    .execute(conn)
                    .await
                    .map_err(db_error("insert delivery tracking"))?;

                Ok(created)
            }
            .scope_boxed()
        });

        self.db.run_unit("create delivery order", transaction).await
    }

    /// Moves the order to `change.status` and appends a tracking row.
    ///
    /// Orders already `delivered` or `cancelled` are final, and an order never
    /// moves back to `created`. Repeating `in_transit` records a checkpoint
    /// and needs a location.
    pub async fn change_status(
        &self,
        order_id: i64,
        change: StatusChange,
    ) -> AppResult<DeliveryOrder> {
        ensure_positive("delivery order", "id", order_id)?;

        let mut conn = self.db.connection().await?;
        let transaction = conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let current = delivery_orders::table
                    .find(order_id)
                    .select(delivery_orders::status)
                    .for_update()
                    .first::<DeliveryStatus>(conn)
                    .await
                    .optional()
                    .map_err(db_error("lock delivery order"))?
                    .ok_or_else(|| AppError::not_found("delivery order", "id", order_id))?;

                if current.is_terminal() {
                    return Err(AppError::unprocessable(format!(
                        "Delivery order {} is already {} and cannot become {}",
                        order_id, current, change.status
                    )));
                }
                if !current.can_transition_to(change.status) {
                    return Err(AppError::unprocessable(format!(
                        "Delivery order {} cannot move from {} to {}",
                        order_id, current, change.status
                    )));
                }
                if current == change.status && change.location.is_none() {
                    return Err(AppError::unprocessable(format!(
                        "Delivery order {} is already {}; a checkpoint needs a location",
                        order_id, current
                    )));
                }

                let target = delivery_orders::table.find(order_id);
                let updated = if change.status == DeliveryStatus::Delivered {
                    diesel::update(target)
                        .set((
                            delivery_orders::status.eq(change.status),
                            delivery_orders::updated_date.eq(now),
                            delivery_orders::delivered_date.eq(now),
                        ))
                        .returning(DeliveryOrder::as_returning())
                        .get_result(conn)
                        .await
                } else {
                    diesel::update(target)
                        .set((
                            delivery_orders::status.eq(change.status),
                            delivery_orders::updated_date.eq(now),
                        ))
                        .returning(DeliveryOrder::as_returning())
                        .get_result(conn)
                        .await
                }
                .map_err(db_error("update delivery order status"))?;

                diesel::insert_into(delivery_tracking_history::table)
                    .values(&NewDeliveryTracking {
                        delivery_order_id: order_id,
                        status: change.status,
                        location: change.location,
                        note: change.note,
                    })
                    .execute(conn)
                    .await
                    .map_err(db_error("insert delivery tracking"))?;

                Ok(updated)
            }
            .scope_boxed()
        });

        self.db
            .run_unit("change delivery order status", transaction)
            .await
    }

    pub async fn update(
        &self,
        order_id: i64,
        changes: UpdateDeliveryOrder,
    ) -> AppResult<DeliveryOrder> {
        ensure_positive("delivery order", "id", order_id)?;
        if let Some(address) = changes.address_id {
            ensure_uuid("address", address)?;
        }
        let mut conn = self.db.connection().await?;

        self.db
            .run("update delivery order", async {
                diesel::update(delivery_orders::table.find(order_id))
                    .set((&changes, delivery_orders::updated_date.eq(now)))
                    .returning(DeliveryOrder::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("delivery order", "id", order_id))
    }

    /// Hard delete; the tracking history goes with it.
    pub async fn delete(&self, order_id: i64) -> AppResult<()> {
        ensure_positive("delivery order", "id", order_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete delivery order",
                diesel::delete(delivery_orders::table.find(order_id)).execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("delivery order", "id", order_id));
        }
        Ok(())
    }

    pub async fn exists(&self, order_id: i64) -> AppResult<bool> {
        ensure_positive("delivery order", "id", order_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check delivery order exists",
                diesel::select(diesel::dsl::exists(delivery_orders::table.find(order_id)))
                    .get_result::<bool>(&mut conn),
            )
            .await
    }
}
