use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewSeller, Seller, UpdateSeller, normalize_name};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, contains_pattern, ensure_uuid, order_by, sort_keys,
};
use crate::schema::sellers;

sort_keys! {
    pub enum SellerSortKey {
        #[default]
        Id => "id",
        Name => "name",
        Email => "email",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct SellerFilter {
    pub name: Option<String>,
    pub is_verified: Option<bool>,
    pub is_deleted: Option<bool>,
}

#[derive(Clone)]
pub struct SellerRepository {
    db: QueryExecutor,
}

impl SellerRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &SellerFilter) -> sellers::BoxedQuery<'static, Pg> {
        let mut query = sellers::table
            .filter(sellers::is_deleted.eq(filter.is_deleted.unwrap_or(false)))
            .into_boxed();
        if let Some(name) = &filter.name {
            query = query.filter(sellers::name.ilike(contains_pattern(name)));
        }
        if let Some(verified) = filter.is_verified {
            query = query.filter(sellers::is_verified.eq(verified));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &SellerFilter,
        sort: SellerSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Seller>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    SellerSortKey::Id => order_by!(query, page.direction, sellers::id, sellers::id),
                    SellerSortKey::Name => order_by!(query, page.direction, sellers::name, sellers::id),
                    SellerSortKey::Email => order_by!(query, page.direction, sellers::email, sellers::id),
                    SellerSortKey::CreatedDate => {
                        order_by!(query, page.direction, sellers::created_date, sellers::id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(Seller::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list sellers", page_query).await
    }

    pub async fn find_by_id(&self, seller_id: Uuid) -> AppResult<Option<Seller>> {
        ensure_uuid("seller", seller_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find seller", async {
                sellers::table
                    .find(seller_id)
                    .filter(sellers::is_deleted.eq(false))
                    .select(Seller::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    /// Exact lookup on the normalized form of `name`.
    pub async fn find_by_normalized_name(&self, name: &str) -> AppResult<Option<Seller>> {
        let normalized = normalize_name(name);
        let mut conn = self.db.connection().await?;

        self.db
            .run("find seller by name", async {
                sellers::table
                    .filter(sellers::normalized_name.eq(&normalized))
                    .filter(sellers::is_deleted.eq(false))
                    .select(Seller::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, new_seller: NewSeller) -> AppResult<Seller> {
        ensure_uuid("seller", new_seller.id)?;
        let new_seller = NewSeller {
            normalized_name: normalize_name(&new_seller.name),
            ..new_seller
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert seller",
                diesel::insert_into(sellers::table)
                    .values(&new_seller)
                    .returning(Seller::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(&self, seller_id: Uuid, changes: UpdateSeller) -> AppResult<Seller> {
        ensure_uuid("seller", seller_id)?;
        let changes = UpdateSeller {
            normalized_name: changes.name.as_deref().map(normalize_name),
            ..changes
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run("update seller", async {
                diesel::update(
                    sellers::table
                        .find(seller_id)
                        .filter(sellers::is_deleted.eq(false)),
                )
                .set((&changes, sellers::updated_date.eq(now)))
                .returning(Seller::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("seller", "id", seller_id))
    }

    pub async fn delete(&self, seller_id: Uuid) -> AppResult<()> {
        ensure_uuid("seller", seller_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete seller",
                diesel::update(
                    sellers::table
                        .find(seller_id)
                        .filter(sellers::is_deleted.eq(false)),
                )
                .set((sellers::is_deleted.eq(true), sellers::deleted_date.eq(now)))
                .execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("seller", "id", seller_id));
        }
        Ok(())
    }

    pub async fn exists(&self, seller_id: Uuid) -> AppResult<bool> {
        ensure_uuid("seller", seller_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check seller exists",
                diesel::select(diesel::dsl::exists(
                    sellers::table
                        .find(seller_id)
                        .filter(sellers::is_deleted.eq(false)),
                ))
                .get_result::<bool>(&mut conn),
            )
            .await
    }
}
