use bigdecimal::BigDecimal;
use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewProduct, Product, ProductStatus, UpdateProduct, normalize_name};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, contains_pattern, ensure_uuid, order_by, sort_keys,
};
use crate::schema::products;

sort_keys! {
    pub enum ProductSortKey {
        #[default]
        Id => "id",
        Name => "name",
        Price => "price",
        Status => "status",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub seller_id: Option<Uuid>,
    pub category_id: Option<i32>,
    pub status: Option<ProductStatus>,
    pub name: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub is_deleted: Option<bool>,
}

#[derive(Clone)]
pub struct ProductRepository {
    db: QueryExecutor,
}

impl ProductRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
        let mut query = products::table
            .filter(products::is_deleted.eq(filter.is_deleted.unwrap_or(false)))
            .into_boxed();
        if let Some(seller) = filter.seller_id {
            query = query.filter(products::seller_id.eq(seller));
        }
        if let Some(category) = filter.category_id {
            query = query.filter(products::category_id.eq(category));
        }
        if let Some(status) = filter.status {
            query = query.filter(products::status.eq(status));
        }
        if let Some(name) = &filter.name {
            query = query.filter(products::name.ilike(contains_pattern(name)));
        }
        if let Some(min) = &filter.min_price {
            query = query.filter(products::price.ge(min.clone()));
        }
        if let Some(max) = &filter.max_price {
            query = query.filter(products::price.le(max.clone()));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Product>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    ProductSortKey::Id => order_by!(query, page.direction, products::id, products::id),
                    ProductSortKey::Name => {
                        order_by!(query, page.direction, products::name, products::id)
                    }
                    ProductSortKey::Price => {
                        order_by!(query, page.direction, products::price, products::id)
                    }
                    ProductSortKey::Status => {
                        order_by!(query, page.direction, products::status, products::id)
                    }
                    ProductSortKey::CreatedDate => {
                        order_by!(query, page.direction, products::created_date, products::id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(Product::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list products", page_query).await
    }

    pub async fn find_by_id(&self, product_id: Uuid) -> AppResult<Option<Product>> {
        ensure_uuid("product", product_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find product", async {
                products::table
                    .find(product_id)
                    .filter(products::is_deleted.eq(false))
                    .select(Product::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, new_product: NewProduct) -> AppResult<Product> {
        ensure_uuid("product", new_product.id)?;
        let new_product = NewProduct {
            normalized_name: normalize_name(&new_product.name),
            ..new_product
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert product",
                diesel::insert_into(products::table)
                    .values(&new_product)
                    .returning(Product::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(&self, product_id: Uuid, changes: UpdateProduct) -> AppResult<Product> {
        ensure_uuid("product", product_id)?;
        let changes = UpdateProduct {
            normalized_name: changes.name.as_deref().map(normalize_name),
            ..changes
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run("update product", async {
                diesel::update(
                    products::table
                        .find(product_id)
                        .filter(products::is_deleted.eq(false)),
                )
                .set((&changes, products::updated_date.eq(now)))
                .returning(Product::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("product", "id", product_id))
    }

    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        ensure_uuid("product", product_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete product",
                diesel::update(
                    products::table
                        .find(product_id)
                        .filter(products::is_deleted.eq(false)),
                )
                .set((
                    products::is_deleted.eq(true),
                    products::deleted_date.eq(now),
                ))
                .execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("product", "id", product_id));
        }
        Ok(())
    }

    pub async fn exists(&self, product_id: Uuid) -> AppResult<bool> {
        ensure_uuid("product", product_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check product exists",
                diesel::select(diesel::dsl::exists(
                    products::table
                        .find(product_id)
                        .filter(products::is_deleted.eq(false)),
                ))
                .get_result::<bool>(&mut conn),
            )
            .await
    }
}
