//! Shared listing conventions for every repository.
//!
//! A listing is a page request (1-based page, page size, direction), an
//! optional sort key taken from a per-entity whitelist, and a set of
//! optional filters. The primary key is always appended as a tie-breaker so
//! that page boundaries stay stable between requests. The count and the page
//! are read inside one read-only `REPEATABLE READ` transaction, so `total`
//! and `items` come from the same snapshot.

use std::future::Future;
use std::time::Duration;

use diesel::QueryResult;
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::PooledConnection;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};

/// Upper bound for `page_size`; larger requests are clamped.
pub const MAX_PAGE_SIZE: i64 = 1000;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Command timeout applied to every query unless configured otherwise.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
    pub direction: SortDirection,
}

impl PageRequest {
    /// Validates and normalizes a page request against [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// `AppError::Validation` on field `page` when `page < 1`, and on field
    /// `page_size` when `page_size < 1`.
    pub fn new(page: i64, page_size: i64, descending: bool) -> AppResult<Self> {
        Self::with_max_page_size(page, page_size, descending, MAX_PAGE_SIZE)
    }

    /// Same as [`PageRequest::new`] with a configured page size ceiling.
    pub fn with_max_page_size(
        page: i64,
        page_size: i64,
        descending: bool,
        max_page_size: i64,
    ) -> AppResult<Self> {
        if page < 1 {
            return Err(AppError::validation("page", "Page must be at least 1"));
        }
        if page_size < 1 {
            return Err(AppError::validation(
                "page_size",
                "Page size must be at least 1",
            ));
        }

        Ok(Self {
            page,
            page_size: page_size.min(max_page_size.clamp(1, MAX_PAGE_SIZE)),
            direction: SortDirection::from_descending(descending),
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            direction: SortDirection::Asc,
        }
    }
}

/// One page of rows plus the number of rows matching the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Whitelisted sort keys of one entity.
///
/// Implemented through [`sort_keys!`]; each key maps to a literal column.
pub trait SortKey: Sized + Copy + Default {
    /// Accepted wire names, in declaration order.
    const ACCEPTED: &'static [&'static str];

    fn from_key(key: &str) -> Option<Self>;

    fn column(self) -> &'static str;

    /// Parses an optional `sort_by` value; absent or blank means the default key.
    fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Self::default()),
            Some(key) => Self::from_key(key).ok_or_else(|| {
                AppError::validation(
                    "sort_by",
                    format!(
                        "Unknown sort key '{}'. Accepted keys: {}",
                        key,
                        Self::ACCEPTED.join(", ")
                    ),
                )
            }),
        }
    }
}

/// Declares a sort-key enum with its column mapping. The first variant is the
/// default.
macro_rules! sort_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            #[default]
            $default:ident => $default_column:literal,
            $($variant:ident => $column:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        $vis enum $name {
            #[default]
            $default,
            $($variant),*
        }

        impl $crate::repositories::query::SortKey for $name {
            const ACCEPTED: &'static [&'static str] = &[$default_column, $($column),*];

            fn from_key(key: &str) -> Option<Self> {
                match key {
                    $default_column => Some($name::$default),
                    $($column => Some($name::$variant),)*
                    _ => None,
                }
            }

            fn column(self) -> &'static str {
                match self {
                    $name::$default => $default_column,
                    $($name::$variant => $column,)*
                }
            }
        }
    };
}
pub(crate) use sort_keys;

/// Orders a boxed query by `$column` in `$direction`, then by `$tie` in the
/// same direction.
macro_rules! order_by {
    ($query:expr, $direction:expr, $column:expr, $tie:expr) => {
        match $direction {
            $crate::repositories::query::SortDirection::Asc => {
                $query.order(($column.asc(), $tie.asc()))
            }
            $crate::repositories::query::SortDirection::Desc => {
                $query.order(($column.desc(), $tie.desc()))
            }
        }
    };
}
pub(crate) use order_by;

/// Escapes `%`, `_` and `\` and wraps the term for a substring `ILIKE`.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Rejects the nil GUID before any I/O.
pub fn ensure_uuid(entity: &str, id: Uuid) -> AppResult<()> {
    if id.is_nil() {
        return Err(AppError::validation(
            "id",
            format!("{} id must not be empty", entity),
        ));
    }
    Ok(())
}

/// Rejects non-positive integer ids before any I/O.
pub fn ensure_positive(entity: &str, field: &str, id: i64) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::validation(
            field,
            format!("{} {} must be positive, got {}", entity, field, id),
        ));
    }
    Ok(())
}

/// Error mapper for statements awaited inside a transaction body.
pub fn db_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> AppError {
    move |error| DatabaseErrorConverter::convert_diesel_error(error, operation)
}

/// Runs `future` under `timeout`.
///
/// Expiry drops the in-flight query and yields `AppError::Database`.
pub async fn with_timeout<T, F>(operation: &str, timeout: Duration, future: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout_ms = timeout.as_millis() as u64, "Query timed out");
            Err(AppError::Database {
                operation: operation.to_string(),
                source: anyhow::anyhow!("query timed out after {:?}", timeout),
            })
        }
    }
}

/// Pool handle shared by all repositories, carrying the query timeout.
#[derive(Clone)]
pub struct QueryExecutor {
    pool: AsyncDbPool,
    timeout: Duration,
}

impl QueryExecutor {
    pub fn new(pool: AsyncDbPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub async fn connection(&self) -> AppResult<PooledConnection<'_, AsyncPgConnection>> {
        self.pool.get().await.map_err(AppError::from)
    }

    /// Awaits a single Diesel query under the timeout, converting its error.
    pub async fn run<T, F>(&self, operation: &str, query: F) -> AppResult<T>
    where
        F: Future<Output = QueryResult<T>>,
    {
        with_timeout(operation, self.timeout, async {
            query
                .await
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, operation))
        })
        .await
    }

    /// Awaits a multi-statement unit (usually a transaction) under the timeout.
    pub async fn run_unit<T, F>(&self, operation: &str, unit: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        with_timeout(operation, self.timeout, unit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    sort_keys! {
        enum SampleSortKey {
            #[default]
            Id => "id",
            Name => "name",
            CreatedDate => "created_date",
        }
    }

    #[test]
    fn test_page_request_offset_and_limit() {
        let page = PageRequest::new(3, 25, false).unwrap();
        assert_eq!(page.offset(), 50);
        assert_eq!(page.limit(), 25);
        assert_eq!(page.direction, SortDirection::Asc);
    }

    #[test]
    fn test_first_page_has_zero_offset() {
        let page = PageRequest::new(1, 10, true).unwrap();
        assert_eq!(page.offset(), 0);
        assert_eq!(page.direction, SortDirection::Desc);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let page = PageRequest::new(2, 5000, false).unwrap();
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_configured_ceiling_never_exceeds_hard_limit() {
        let page = PageRequest::with_max_page_size(1, 800, false, 100).unwrap();
        assert_eq!(page.page_size, 100);

        let page = PageRequest::with_max_page_size(1, 5000, false, 10_000).unwrap();
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_below_one_is_rejected() {
        match PageRequest::new(0, 10, false) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "page"),
            other => panic!("Expected page validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_page_size_below_one_is_rejected() {
        match PageRequest::new(1, 0, false) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "page_size"),
            other => panic!("Expected page_size validation error, got {:?}", other),
        }
        assert!(PageRequest::new(1, -5, false).is_err());
    }

    #[test]
    fn test_sort_key_defaults_to_first_variant() {
        assert_eq!(SampleSortKey::parse(None).unwrap(), SampleSortKey::Id);
        assert_eq!(SampleSortKey::parse(Some("  ")).unwrap(), SampleSortKey::Id);
    }

    #[test]
    fn test_every_declared_sort_key_parses() {
        for key in SampleSortKey::ACCEPTED {
            let parsed = SampleSortKey::parse(Some(key)).unwrap();
            assert_eq!(parsed.column(), *key);
        }
    }

    #[test]
    fn test_unknown_sort_key_lists_accepted_keys() {
        match SampleSortKey::parse(Some("password")) {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "sort_by");
                assert!(reason.contains("password"));
                assert!(reason.contains("id, name, created_date"));
            }
            other => panic!("Expected sort_by validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("shoe"), "%shoe%");
        assert_eq!(contains_pattern(" 100%_off "), "%100\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_ensure_uuid_rejects_nil() {
        assert!(ensure_uuid("seller", Uuid::nil()).is_err());
        assert!(ensure_uuid("seller", Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("country", "id", 0).is_err());
        assert!(ensure_positive("country", "id", -1).is_err());
        assert!(ensure_positive("country", "id", 1).is_ok());
    }

    #[test]
    fn test_page_map_keeps_total() {
        let page = Page {
            items: vec![1, 2, 3],
            total: 42,
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.total, 42);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let result = with_timeout("noop", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_timeout_expiry_is_database_error() {
        let result: AppResult<()> = with_timeout("slow query", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        match result {
            Err(AppError::Database { operation, .. }) => assert_eq!(operation, "slow query"),
            other => panic!("Expected Database error, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_offset_is_previous_pages(page in 1i64..10_000, size in 1i64..5_000) {
            let request = PageRequest::new(page, size, false).unwrap();
            prop_assert!(request.page_size <= MAX_PAGE_SIZE);
            prop_assert_eq!(request.offset(), (page - 1) * request.page_size);
        }

        #[test]
        fn prop_non_positive_page_always_rejected(page in i64::MIN..1, size in 1i64..100) {
            prop_assert!(PageRequest::new(page, size, false).is_err());
        }
    }
}
