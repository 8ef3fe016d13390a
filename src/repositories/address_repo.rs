use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Address, NewAddress, UpdateAddress};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, contains_pattern, ensure_uuid, order_by, sort_keys,
};
use crate::schema::addresses;

sort_keys! {
    pub enum AddressSortKey {
        #[default]
        Id => "id",
        Street => "street",
        PostalCode => "postal_code",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddressFilter {
    pub city_id: Option<i32>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    /// `Some(true)` lists soft-deleted rows instead of live ones
    pub is_deleted: Option<bool>,
}

#[derive(Clone)]
pub struct AddressRepository {
    db: QueryExecutor,
}

impl AddressRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &AddressFilter) -> addresses::BoxedQuery<'static, Pg> {
        let mut query = addresses::table
            .filter(addresses::is_deleted.eq(filter.is_deleted.unwrap_or(false)))
            .into_boxed();
        if let Some(city) = filter.city_id {
            query = query.filter(addresses::city_id.eq(city));
        }
        if let Some(postal_code) = &filter.postal_code {
            query = query.filter(addresses::postal_code.eq(postal_code.trim().to_string()));
        }
        if let Some(street) = &filter.street {
            query = query.filter(addresses::street.ilike(contains_pattern(street)));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &AddressFilter,
        sort: AddressSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Address>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    AddressSortKey::Id => order_by!(query, page.direction, addresses::id, addresses::id),
                    AddressSortKey::Street => {
                        order_by!(query, page.direction, addresses::street, addresses::id)
                    }
                    AddressSortKey::PostalCode => {
                        order_by!(query, page.direction, addresses::postal_code, addresses::id)
                    }
                    AddressSortKey::CreatedDate => {
                        order_by!(query, page.direction, addresses::created_date, addresses::id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(Address::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list addresses", page_query).await
    }

    pub async fn find_by_id(&self, address_id: Uuid) -> AppResult<Option<Address>> {
        ensure_uuid("address", address_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find address", async {
                addresses::table
                    .find(address_id)
                    .filter(addresses::is_deleted.eq(false))
                    .select(Address::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, new_address: NewAddress) -> AppResult<Address> {
        ensure_uuid("address", new_address.id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert address",
                diesel::insert_into(addresses::table)
                    .values(&new_address)
                    .returning(Address::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(&self, address_id: Uuid, changes: UpdateAddress) -> AppResult<Address> {
        ensure_uuid("address", address_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("update address", async {
                diesel::update(
                    addresses::table
                        .find(address_id)
                        .filter(addresses::is_deleted.eq(false)),
                )
                .set((&changes, addresses::updated_date.eq(now)))
                .returning(Address::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("address", "id", address_id))
    }

    /// Soft delete: the row stays for delivery orders that reference it.
    pub async fn delete(&self, address_id: Uuid) -> AppResult<()> {
        ensure_uuid("address", address_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete address",
                diesel::update(
                    addresses::table
                        .find(address_id)
                        .filter(addresses::is_deleted.eq(false)),
                )
                .set((
                    addresses::is_deleted.eq(true),
                    addresses::deleted_date.eq(now),
                ))
                .execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("address", "id", address_id));
        }
        Ok(())
    }

    pub async fn exists(&self, address_id: Uuid) -> AppResult<bool> {
        ensure_uuid("address", address_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check address exists",
                diesel::select(diesel::dsl::exists(
                    addresses::table
                        .find(address_id)
                        .filter(addresses::is_deleted.eq(false)),
                ))
                .get_result::<bool>(&mut conn),
            )
            .await
    }
}
