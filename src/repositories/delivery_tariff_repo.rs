use bigdecimal::BigDecimal;
use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::error::{AppError, AppResult};
use crate::models::{DeliveryTariff, NewDeliveryTariff, UpdateDeliveryTariff};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, contains_pattern, ensure_positive, order_by, sort_keys,
};
use crate::schema::delivery_tariffs;

sort_keys! {
    pub enum DeliveryTariffSortKey {
        #[default]
        Id => "id",
        Name => "name",
        BasePrice => "base_price",
        PricePerKg => "price_per_kg",
        MinDays => "min_days",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryTariffFilter {
    pub is_active: Option<bool>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct DeliveryTariffRepository {
    db: QueryExecutor,
}

impl DeliveryTariffRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &DeliveryTariffFilter) -> delivery_tariffs::BoxedQuery<'static, Pg> {
        let mut query = delivery_tariffs::table.into_boxed();
        if let Some(active) = filter.is_active {
            query = query.filter(delivery_tariffs::is_active.eq(active));
        }
        if let Some(name) = &filter.name {
            query = query.filter(delivery_tariffs::name.ilike(contains_pattern(name)));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &DeliveryTariffFilter,
        sort: DeliveryTariffSortKey,
        page: PageRequest,
    ) -> AppResult<Page<DeliveryTariff>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    DeliveryTariffSortKey::Id => {
                        order_by!(query, page.direction, delivery_tariffs::id, delivery_tariffs::id)
                    }
                    DeliveryTariffSortKey::Name => {
                        order_by!(query, page.direction, delivery_tariffs::name, delivery_tariffs::id)
                    }
                    DeliveryTariffSortKey::BasePrice => {
                        order_by!(query, page.direction, delivery_tariffs::base_price, delivery_tariffs::id)
                    }
                    DeliveryTariffSortKey::PricePerKg => {
                        order_by!(
                            query,
                            page.direction,
                            delivery_tariffs::price_per_kg,
                            delivery_tariffs::id
                        )
                    }
                    DeliveryTariffSortKey::MinDays => {
                        order_by!(query, page.direction, delivery_tariffs::min_days, delivery_tariffs::id)
                    }
                    DeliveryTariffSortKey::CreatedDate => {
                        order_by!(
                            query,
                            page.direction,
                            delivery_tariffs::created_date,
                            delivery_tariffs::id
                        )
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(DeliveryTariff::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list delivery tariffs", page_query).await
    }

    pub async fn find_by_id(&self, tariff_id: i32) -> AppResult<Option<DeliveryTariff>> {
        ensure_positive("delivery tariff", "id", tariff_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find delivery tariff", async {
                delivery_tariffs::table
                    .find(tariff_id)
                    .select(DeliveryTariff::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    /// Price of shipping `weight_kg` with the given tariff.
    pub async fn quote(&self, tariff_id: i32, weight_kg: &BigDecimal) -> AppResult<BigDecimal> {
        if *weight_kg <= BigDecimal::from(0) {
            return Err(AppError::validation("weight_kg", "Weight must be positive"));
        }

        let tariff = self
            .find_by_id(tariff_id)
            .await?
            .ok_or_else(|| AppError::not_found("delivery tariff", "id", tariff_id))?;

        Ok(tariff.quote(weight_kg))
    }

    pub async fn create(&self, new_tariff: NewDeliveryTariff) -> AppResult<DeliveryTariff> {
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert delivery tariff",
                diesel::insert_into(delivery_tariffs::table)
                    .values(&new_tariff)
                    .returning(DeliveryTariff::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(
        &self,
        tariff_id: i32,
        changes: UpdateDeliveryTariff,
    ) -> AppResult<DeliveryTariff> {
        ensure_positive("delivery tariff", "id", tariff_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("update delivery tariff", async {
                diesel::update(delivery_tariffs::table.find(tariff_id))
                    .set((&changes, delivery_tariffs::updated_date.eq(now)))
                    .returning(DeliveryTariff::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("delivery tariff", "id", tariff_id))
    }

    pub async fn delete(&self, tariff_id: i32) -> AppResult<()> {
        ensure_positive("delivery tariff", "id", tariff_id.into())?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete delivery tariff",
                diesel::delete(delivery_tariffs::table.find(tariff_id)).execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("delivery tariff", "id", tariff_id));
        }
        Ok(())
    }

    pub async fn exists(&self, tariff_id: i32) -> AppResult<bool> {
        ensure_positive("delivery tariff", "id", tariff_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check delivery tariff exists",
                diesel::select(diesel::dsl::exists(delivery_tariffs::table.find(tariff_id)))
                    .get_result::<bool>(&mut conn),
            )
            .await
    }
}
