use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::error::{AppError, AppResult};
use crate::models::{City, NewCity, UpdateCity, normalize_name};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, contains_pattern, ensure_positive, order_by, sort_keys,
};
use crate::schema::cities;

sort_keys! {
    pub enum CitySortKey {
        #[default]
        Id => "id",
        Name => "name",
        CountryId => "country_id",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct CityFilter {
    pub country_id: Option<i32>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct CityRepository {
    db: QueryExecutor,
}

impl CityRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &CityFilter) -> cities::BoxedQuery<'static, Pg> {
        let mut query = cities::table.into_boxed();
        if let Some(country) = filter.country_id {
            query = query.filter(cities::country_id.eq(country));
        }
        if let Some(name) = &filter.name {
            query = query.filter(cities::name.ilike(contains_pattern(name)));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &CityFilter,
        sort: CitySortKey,
        page: PageRequest,
    ) -> AppResult<Page<City>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    CitySortKey::Id => order_by!(query, page.direction, cities::id, cities::id),
                    CitySortKey::Name => order_by!(query, page.direction, cities::name, cities::id),
                    CitySortKey::CountryId => {
                        order_by!(query, page.direction, cities::country_id, cities::id)
                    }
                    CitySortKey::CreatedDate => {
                        order_by!(query, page.direction, cities::created_date, cities::id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(City::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list cities", page_query).await
    }

    pub async fn find_by_id(&self, city_id: i32) -> AppResult<Option<City>> {
        ensure_positive("city", "id", city_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find city", async {
                cities::table
                    .find(city_id)
                    .select(City::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, new_city: NewCity) -> AppResult<City> {
        let new_city = NewCity {
            normalized_name: normalize_name(&new_city.name),
            ..new_city
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert city",
                diesel::insert_into(cities::table)
                    .values(&new_city)
                    .returning(City::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(&self, city_id: i32, changes: UpdateCity) -> AppResult<City> {
        ensure_positive("city", "id", city_id.into())?;
        let changes = UpdateCity {
            normalized_name: changes.name.as_deref().map(normalize_name),
            ..changes
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run("update city", async {
                diesel::update(cities::table.find(city_id))
                    .set((&changes, cities::updated_date.eq(now)))
                    .returning(City::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("city", "id", city_id))
    }

    pub async fn delete(&self, city_id: i32) -> AppResult<()> {
        ensure_positive("city", "id", city_id.into())?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete city",
                diesel::delete(cities::table.find(city_id)).execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("city", "id", city_id));
        }
        Ok(())
    }

    pub async fn exists(&self, city_id: i32) -> AppResult<bool> {
        ensure_positive("city", "id", city_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check city exists",
                diesel::select(diesel::dsl::exists(cities::table.find(city_id)))
                    .get_result::<bool>(&mut conn),
            )
            .await
    }
}
