use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewProductVariant, ProductVariant, UpdateProductVariant};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, contains_pattern, ensure_uuid, order_by, sort_keys,
};
use crate::schema::product_variants;

sort_keys! {
    pub enum ProductVariantSortKey {
        #[default]
        Id => "id",
        Sku => "sku",
        Name => "name",
        Price => "price",
        StockQuantity => "stock_quantity",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductVariantFilter {
    pub product_id: Option<Uuid>,
    pub name: Option<String>,
    /// Only variants with stock left
    pub in_stock: Option<bool>,
    pub is_deleted: Option<bool>,
}

#[derive(Clone)]
pub struct ProductVariantRepository {
    db: QueryExecutor,
}

impl ProductVariantRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &ProductVariantFilter) -> product_variants::BoxedQuery<'static, Pg> {
        let mut query = product_variants::table
            .filter(product_variants::is_deleted.eq(filter.is_deleted.unwrap_or(false)))
            .into_boxed();
        if let Some(product) = filter.product_id {
            query = query.filter(product_variants::product_id.eq(product));
        }
        if let Some(name) = &filter.name {
            query = query.filter(product_variants::name.ilike(contains_pattern(name)));
        }
        match filter.in_stock {
            Some(true) => query = query.filter(product_variants::stock_quantity.gt(0)),
            Some(false) => query = query.filter(product_variants::stock_quantity.eq(0)),
            None => {}
        }
        query
    }

    pub async fn list(
        &self,
        filter: &ProductVariantFilter,
        sort: ProductVariantSortKey,
        page: PageRequest,
    ) -> AppResult<Page<ProductVariant>> {
        use crate::schema::product_variants::dsl::*;
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    ProductVariantSortKey::Id => order_by!(query, page.direction, id, id),
                    ProductVariantSortKey::Sku => order_by!(query, page.direction, sku, id),
                    ProductVariantSortKey::Name => order_by!(query, page.direction, name, id),
                    ProductVariantSortKey::Price => order_by!(query, page.direction, price, id),
                    ProductVariantSortKey::StockQuantity => {
                        order_by!(query, page.direction, stock_quantity, id)
                    }
                    ProductVariantSortKey::CreatedDate => {
                        order_by!(query, page.direction, created_date, id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(ProductVariant::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list product variants", page_query).await
    }

    pub async fn find_by_id(&self, variant_id: Uuid) -> AppResult<Option<ProductVariant>> {
        ensure_uuid("product variant", variant_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find product variant", async {
                product_variants::table
                    .find(variant_id)
                    .filter(product_variants::is_deleted.eq(false))
                    .select(ProductVariant::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    /// SKUs are unique among live variants; a deleted variant releases its SKU.
    pub async fn find_by_sku(&self, sku: &str) -> AppResult<Option<ProductVariant>> {
        let sku = sku.trim();
        let mut conn = self.db.connection().await?;

        self.db
            .run("find product variant by sku", async {
                product_variants::table
                    .filter(product_variants::sku.eq(sku))
                    .filter(product_variants::is_deleted.eq(false))
                    .select(ProductVariant::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, new_variant: NewProductVariant) -> AppResult<ProductVariant> {
        ensure_uuid("product variant", new_variant.id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert product variant",
                diesel::insert_into(product_variants::table)
                    .values(&new_variant)
                    .returning(ProductVariant::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(
        &self,
        variant_id: Uuid,
        changes: UpdateProductVariant,
    ) -> AppResult<ProductVariant> {
        ensure_uuid("product variant", variant_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("update product variant", async {
                diesel::update(
                    product_variants::table
                        .find(variant_id)
                        .filter(product_variants::is_deleted.eq(false)),
                )
                .set((&changes, product_variants::updated_date.eq(now)))
                .returning(ProductVariant::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("product variant", "id", variant_id))
    }

    /// Adds `delta` (possibly negative) to the stock in a single statement.
    ///
    /// # Errors
    ///
    /// `UnprocessableContent` when the stock would drop below zero,
    /// `NotFound` when the variant does not exist.
    pub async fn adjust_stock(&self, variant_id: Uuid, delta: i32) -> AppResult<ProductVariant> {
        use crate::schema::product_variants::dsl::*;
        ensure_uuid("product variant", variant_id)?;
        let mut conn = self.db.connection().await?;

        let updated = self
            .db
            .run("adjust product variant stock", async {
                diesel::update(
                    product_variants
                        .find(variant_id)
                        .filter(is_deleted.eq(false))
                        .filter((stock_quantity + delta).ge(0)),
                )
                .set((
                    stock_quantity.eq(stock_quantity + delta),
                    updated_date.eq(now),
                ))
                .returning(ProductVariant::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
            })
            .await?;

        if let Some(variant) = updated {
            return Ok(variant);
        }

        let current = self
            .db
            .run("find product variant stock", async {
                product_variants
                    .find(variant_id)
                    .filter(is_deleted.eq(false))
                    .select(stock_quantity)
                    .first::<i32>(&mut conn)
                    .await
                    .optional()
            })
            .await?;

        match current {
            Some(available) => Err(AppError::unprocessable(format!(
                "Insufficient stock: {} available, change of {} requested",
                available, delta
            ))),
            None => Err(AppError::not_found("product variant", "id", variant_id)),
        }
    }

    pub async fn delete(&self, variant_id: Uuid) -> AppResult<()> {
        ensure_uuid("product variant", variant_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete product variant",
                diesel::update(
                    product_variants::table
                        .find(variant_id)
                        .filter(product_variants::is_deleted.eq(false)),
                )
                .set((
                    product_variants::is_deleted.eq(true),
                    product_variants::deleted_date.eq(now),
                ))
                .execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("product variant", "id", variant_id));
        }
        Ok(())
    }

    pub async fn exists(&self, variant_id: Uuid) -> AppResult<bool> {
        ensure_uuid("product variant", variant_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check product variant exists",
                diesel::select(diesel::dsl::exists(
                    product_variants::table
                        .find(variant_id)
                        .filter(product_variants::is_deleted.eq(false)),
                ))
                .get_result::<bool>(&mut conn),
            )
            .await
    }
}
