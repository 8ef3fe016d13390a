//! Pagination-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::config::PaginationConfig;
use crate::error::AppResult;
use crate::repositories::{Page, PageRequest, SortKey};

/// Paging and ordering parameters shared by every list endpoint.
///
/// Range checks happen in [`PageRequest`], so a bad `page` reports the same
/// validation error no matter which endpoint received it.
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    #[param(minimum = 1, example = 1)]
    pub page: i64,

    /// Number of items per page; larger values are clamped to the maximum
    #[param(minimum = 1, maximum = 1000, example = 20)]
    pub page_size: Option<i64>,

    /// Column to order by; each endpoint documents its accepted keys
    #[param(example = "created_date")]
    pub sort_by: Option<String>,

    /// Sort descending instead of ascending
    #[serde(default)]
    pub descending: bool,
}

impl PaginationParams {
    /// Builds the page request, falling back to the configured page size.
    pub fn page_request(&self, config: &PaginationConfig) -> AppResult<PageRequest> {
        PageRequest::with_max_page_size(
            self.page,
            self.page_size.unwrap_or(config.default_page_size),
            self.descending,
            config.max_page_size,
        )
    }

    pub fn sort_key<K: SortKey>(&self) -> AppResult<K> {
        K::parse(self.sort_by.as_deref())
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: None,
            sort_by: None,
            descending: false,
        }
    }
}

fn default_page() -> i64 {
    1
}

/// Generic paged response wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct PagedResponse<T> {
    /// The data items for this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number (1-based)
    #[schema(example = 1)]
    pub page: i64,

    /// Number of items per page
    #[schema(example = 20)]
    pub page_size: i64,

    /// Total number of items across all pages
    #[schema(example = 100)]
    pub total_items: i64,

    /// Total number of pages
    #[schema(example = 5)]
    pub total_pages: i64,

    /// Whether there is a next page
    #[schema(example = true)]
    pub has_next: bool,

    /// Whether there is a previous page
    #[schema(example = false)]
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(request: &PageRequest, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        let total_pages = (total_items + request.page_size - 1) / request.page_size;

        Self {
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

impl<T> PagedResponse<T> {
    /// Converts a repository page into the response shape.
    pub fn from_page<R>(page: Page<R>, request: &PageRequest) -> Self
    where
        T: From<R>,
    {
        let pagination = PaginationMeta::new(request, page.total);
        Self {
            data: page.map(T::from).items,
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repositories::CountrySortKey;
    use proptest::prelude::*;

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_page_size: 20,
            max_page_size: 1000,
        }
    }

    fn request(page: i64, page_size: i64) -> PageRequest {
        PageRequest::new(page, page_size, false).unwrap()
    }

    #[test]
    fn test_defaults_come_from_config() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        let page = params.page_request(&config()).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 20);
        assert!(!params.descending);
    }

    #[test]
    fn test_page_size_is_clamped_to_configured_maximum() {
        let params = PaginationParams {
            page_size: Some(5000),
            ..Default::default()
        };
        let limited = PaginationConfig {
            default_page_size: 10,
            max_page_size: 50,
        };
        assert_eq!(params.page_request(&limited).unwrap().page_size, 50);
        assert_eq!(params.page_request(&config()).unwrap().page_size, 1000);
    }

    #[test]
    fn test_page_zero_is_rejected() {
        let params = PaginationParams {
            page: 0,
            ..Default::default()
        };
        match params.page_request(&config()) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "page"),
            other => panic!("Expected page validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_sort_key_lists_accepted_keys() {
        let params = PaginationParams {
            sort_by: Some("password".to_string()),
            ..Default::default()
        };
        match params.sort_key::<CountrySortKey>() {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "sort_by");
                assert!(reason.contains("name"));
            }
            other => panic!("Expected sort_by validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_meta_for_empty_result() {
        let meta = PaginationMeta::new(&request(1, 20), 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_meta_middle_page() {
        let meta = PaginationMeta::new(&request(2, 10), 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_from_page_converts_items() {
        let page = Page {
            items: vec![1_i32, 2, 3],
            total: 3,
        };
        let response: PagedResponse<i64> = PagedResponse::from_page(page, &request(1, 20));
        assert_eq!(response.data, vec![1_i64, 2, 3]);
        assert_eq!(response.pagination.total_items, 3);
    }

    proptest! {
        #[test]
        fn prop_total_pages_covers_every_item(total in 0_i64..100_000, page_size in 1_i64..=1000) {
            let meta = PaginationMeta::new(&request(1, page_size), total);
            prop_assert!(meta.total_pages * page_size >= total);
            prop_assert!((meta.total_pages - 1).max(0) * page_size < total.max(1));
        }
    }
}
