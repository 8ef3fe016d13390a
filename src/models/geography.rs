use diesel::prelude::*;
use jiff_diesel::DateTime;
use uuid::Uuid;

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Country {
    pub id: i32,
    pub name: String,
    pub normalized_name: String,
    pub iso_code: String,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::countries)]
pub struct NewCountry {
    pub name: String,
    pub normalized_name: String,
    pub iso_code: String,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::countries)]
pub struct UpdateCountry {
    pub name: Option<String>,
    pub normalized_name: Option<String>,
    pub iso_code: Option<String>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::cities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct City {
    pub id: i32,
    pub country_id: i32,
    pub name: String,
    pub normalized_name: String,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::cities)]
pub struct NewCity {
    pub country_id: i32,
    pub name: String,
    pub normalized_name: String,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::cities)]
pub struct UpdateCity {
    pub country_id: Option<i32>,
    pub name: Option<String>,
    pub normalized_name: Option<String>,
}

/// Delivery address. Soft-deletable.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Address {
    pub id: Uuid,
    pub city_id: i32,
    pub street: String,
    pub building: String,
    pub apartment: Option<String>,
    pub postal_code: String,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
    pub deleted_date: Option<DateTime>,
    pub is_deleted: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::addresses)]
pub struct NewAddress {
    pub id: Uuid,
    pub city_id: i32,
    pub street: String,
    pub building: String,
    pub apartment: Option<String>,
    pub postal_code: String,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::addresses)]
pub struct UpdateAddress {
    pub city_id: Option<i32>,
    pub street: Option<String>,
    pub building: Option<String>,
    pub apartment: Option<String>,
    pub postal_code: Option<String>,
}
