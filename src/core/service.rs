//! Service traits for tenant-scoped listing

use crate::core::filter::FilterParameters;
use crate::core::query::{PaginationMeta, ResultPage};
use crate::core::row::Listable;
use crate::core::sort::SortDirection;
use anyhow::Result;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Tenant-scoped data store backing a list view
///
/// Implementations should only return rows of the given tenant (and
/// sub-client, when set), but the query service re-checks ownership of
/// every row anyway.
#[async_trait]
pub trait RecordSource<T: Listable>: Send + Sync {
    async fn rows_for_tenant(&self, tenant_id: &Uuid, subclient_id: Option<&Uuid>)
    -> Result<Vec<T>>;
}

/// Service producing filtered, sorted and paginated rows
#[async_trait]
pub trait ListingService<T: Listable>: Send + Sync {
    /// One page of rows
    async fn fetch_page(&self, params: &FilterParameters) -> Result<ResultPage<T>>;

    /// Every matching row, in page order, used by exports
    async fn fetch_all(&self, params: &FilterParameters) -> Result<Vec<T>>;
}

/// Default [`ListingService`] over any [`RecordSource`]
pub struct QueryService<T: Listable> {
    source: Arc<dyn RecordSource<T>>,
    _row: PhantomData<fn() -> T>,
}

impl<T: Listable> Clone for QueryService<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            _row: PhantomData,
        }
    }
}

impl<T: Listable> QueryService<T> {
    pub fn new(source: impl RecordSource<T> + 'static) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<dyn RecordSource<T>>) -> Self {
        Self {
            source,
            _row: PhantomData,
        }
    }

    /// Whether a row passes the tenant, search, status and date filters
    pub fn matches(row: &T, params: &FilterParameters) -> bool {
        if row.tenant_id() != params.tenant_id || row.is_deleted() {
            return false;
        }
        if let Some(subclient_id) = params.subclient_id {
            if row.subclient_id() != Some(subclient_id) {
                return false;
            }
        }
        if let Some(term) = &params.search_term {
            let found = params
                .search_keys
                .iter()
                .any(|key| row.column(key).matches_search(term));
            if !found {
                return false;
            }
        }
        if let Some(status) = &params.status_filter {
            if !row.status().eq_ignore_ascii_case(status) {
                return false;
            }
        }
        params.date_range.contains(row.listed_on())
    }

    /// Order rows by the requested column, breaking ties by id
    pub fn sort_rows(rows: &mut [T], column: &str, direction: SortDirection) {
        rows.sort_by(|a, b| {
            let primary = a.column(column).compare(&b.column(column));
            let primary = match direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            match primary {
                Ordering::Equal => a.id().cmp(&b.id()),
                other => other,
            }
        });
    }

    async fn matching_rows(&self, params: &FilterParameters) -> Result<Vec<T>> {
        let mut rows: Vec<T> = self
            .source
            .rows_for_tenant(&params.tenant_id, params.subclient_id.as_ref())
            .await?
            .into_iter()
            .filter(|row| Self::matches(row, params))
            .collect();
        Self::sort_rows(&mut rows, &params.sort_column, params.sort_direction);
        Ok(rows)
    }
}

#[async_trait]
impl<T: Listable> ListingService<T> for QueryService<T> {
    async fn fetch_page(&self, params: &FilterParameters) -> Result<ResultPage<T>> {
        let rows = self.matching_rows(params).await?;
        let pagination = PaginationMeta::new(params.page, params.page_size, rows.len());
        let data: Vec<T> = rows
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .collect();

        tracing::debug!(
            tenant_id = %params.tenant_id,
            sort = %params.sort_column,
            page = pagination.page,
            total = pagination.total,
            "fetched page"
        );

        Ok(ResultPage { data, pagination })
    }

    async fn fetch_all(&self, params: &FilterParameters) -> Result<Vec<T>> {
        self.matching_rows(params).await
    }
}
