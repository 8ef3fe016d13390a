//! Product reviews and customer complaints.

use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ComplaintStatus")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    InReview,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Rejected)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplaintStatus::Open => write!(f, "open"),
            ComplaintStatus::InReview => write!(f, "in_review"),
            ComplaintStatus::Resolved => write!(f, "resolved"),
            ComplaintStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
    pub deleted_date: Option<DateTime>,
    pub is_deleted: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::reviews)]
pub struct NewReview {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::reviews)]
pub struct UpdateReview {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::complaints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Complaint {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub status: ComplaintStatus,
    pub created_date: DateTime,
    pub updated_date: Option<DateTime>,
    pub resolved_date: Option<DateTime>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::complaints)]
pub struct NewComplaint {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub status: ComplaintStatus,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::complaints)]
pub struct UpdateComplaint {
    pub subject: Option<String>,
    pub body: Option<String>,
}
