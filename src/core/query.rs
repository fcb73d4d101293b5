//! Query parameters and pagination utilities

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters accepted by list and export endpoints
///
/// # Example
/// ```text
/// GET /views/payments/rows?page=2&limit=10
/// GET /views/payments/rows?search=doe&status=scheduled
/// GET /views/disputes/rows?sort=balance&direction=desc&from=2024-01-01&to=2024-03-31
/// ```
///
/// `sort` and `direction` are only honoured by views that keep their sort
/// in the URL; other views use the stored session preference.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct QueryParams {
    /// Page number (starts at 1)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: usize,

    /// Number of items per page, the view default when absent
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,

    /// Free-text search term
    #[validate(length(max = 255))]
    pub search: Option<String>,

    /// Logical sort column
    pub sort: Option<String>,

    /// `asc`/`desc` or a boolean-like flag (`true` = ascending)
    pub direction: Option<String>,

    /// Status filter
    pub status: Option<String>,

    /// Inclusive lower date bound
    pub from: Option<NaiveDate>,

    /// Inclusive upper date bound
    pub to: Option<NaiveDate>,
}

fn default_page() -> usize {
    1
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: None,
            search: None,
            sort: None,
            direction: None,
            status: None,
            from: None,
            to: None,
        }
    }
}

impl QueryParams {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }
}

/// One page of results
///
/// Produced by the query service and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ResultPage<T> {
    /// The paginated rows
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> ResultPage<T> {
    /// Convert every row, keeping the pagination metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ResultPage<U> {
        ResultPage {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    /// Convert every row with a fallible conversion
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<ResultPage<U>, E> {
        Ok(ResultPage {
            data: self.data.into_iter().map(f).collect::<Result<_, _>>()?,
            pagination: self.pagination,
        })
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        // Ensure limit and page are at least 1 to avoid division by zero and underflow
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }

    /// Index of the first row of the page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}
