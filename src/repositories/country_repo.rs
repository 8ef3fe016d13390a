use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::error::{AppError, AppResult};
use crate::models::{Country, NewCountry, UpdateCountry, normalize_name};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, contains_pattern, ensure_positive, order_by, sort_keys,
};
use crate::schema::countries;

sort_keys! {
    pub enum CountrySortKey {
        #[default]
        Id => "id",
        Name => "name",
        IsoCode => "iso_code",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountryFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub iso_code: Option<String>,
}

#[derive(Clone)]
pub struct CountryRepository {
    db: QueryExecutor,
}

impl CountryRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &CountryFilter) -> countries::BoxedQuery<'static, Pg> {
        let mut query = countries::table.into_boxed();
        if let Some(name) = &filter.name {
            query = query.filter(countries::name.ilike(contains_pattern(name)));
        }
        if let Some(code) = &filter.iso_code {
            query = query.filter(countries::iso_code.eq(code.trim().to_uppercase()));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &CountryFilter,
        sort: CountrySortKey,
        page: PageRequest,
    ) -> AppResult<Page<Country>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    CountrySortKey::Id => order_by!(query, page.direction, countries::id, countries::id),
                    CountrySortKey::Name => {
                        order_by!(query, page.direction, countries::name, countries::id)
                    }
                    CountrySortKey::IsoCode => {
                        order_by!(query, page.direction, countries::iso_code, countries::id)
                    }
                    CountrySortKey::CreatedDate => {
                        order_by!(query, page.direction, countries::created_date, countries::id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(Country::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list countries", page_query).await
    }

    pub async fn find_by_id(&self, country_id: i32) -> AppResult<Option<Country>> {
        ensure_positive("country", "id", country_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find country", async {
                countries::table
                    .find(country_id)
                    .select(Country::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn find_by_iso_code(&self, code: &str) -> AppResult<Option<Country>> {
        let code = code.trim().to_uppercase();
        let mut conn = self.db.connection().await?;

        self.db
            .run("find country by iso code", async {
                countries::table
                    .filter(countries::iso_code.eq(&code))
                    .select(Country::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, new_country: NewCountry) -> AppResult<Country> {
        let new_country = NewCountry {
            normalized_name: normalize_name(&new_country.name),
            iso_code: new_country.iso_code.trim().to_uppercase(),
            ..new_country
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert country",
                diesel::insert_into(countries::table)
                    .values(&new_country)
                    .returning(Country::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(&self, country_id: i32, changes: UpdateCountry) -> AppResult<Country> {
        ensure_positive("country", "id", country_id.into())?;
        let changes = UpdateCountry {
            normalized_name: changes.name.as_deref().map(normalize_name),
            iso_code: changes.iso_code.map(|c| c.trim().to_uppercase()),
            ..changes
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run("update country", async {
                diesel::update(countries::table.find(country_id))
                    .set((&changes, countries::updated_date.eq(now)))
                    .returning(Country::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("country", "id", country_id))
    }

    /// Hard delete; cities still referencing the country block it.
    pub async fn delete(&self, country_id: i32) -> AppResult<()> {
        ensure_positive("country", "id", country_id.into())?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete country",
                diesel::delete(countries::table.find(country_id)).execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("country", "id", country_id));
        }
        Ok(())
    }

    pub async fn exists(&self, country_id: i32) -> AppResult<bool> {
        ensure_positive("country", "id", country_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check country exists",
                diesel::select(diesel::dsl::exists(countries::table.find(country_id)))
                    .get_result::<bool>(&mut conn),
            )
            .await
    }
}
