//! Filter/search composer
//!
//! [`compose`] turns the state of a list component plus the authenticated
//! principal into an immutable [`FilterParameters`] snapshot. It is a pure
//! function: the same inputs always give the same parameters.

use crate::core::auth::AuthContext;
use crate::core::error::RequestError;
use crate::core::query::QueryParams;
use crate::core::sort::{SortDirection, SortState};
use crate::core::view::{MAX_PAGE_SIZE, ViewDefinition};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inclusive date range, either bound optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Build a range, swapping the bounds if given in reverse
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        match (from, to) {
            (Some(f), Some(t)) if f > t => Self {
                from: Some(t),
                to: Some(f),
            },
            _ => Self { from, to },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Mutable state held by a list component between interactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListState {
    pub search: Option<String>,
    pub status: Option<String>,
    pub date_range: DateRange,
    pub page: usize,
    pub page_size: usize,
    pub sort: SortState,
}

impl ListState {
    /// Fresh state for a view, using its default sort and page size
    pub fn for_view(view: &ViewDefinition) -> Self {
        Self {
            search: None,
            status: None,
            date_range: DateRange::default(),
            page: 1,
            page_size: view.page_size,
            sort: view.default_sort(),
        }
    }

    /// Change the search term; a different term restarts at page 1
    pub fn set_search(&mut self, search: Option<String>) {
        if self.search != search {
            self.search = search;
            self.page = 1;
        }
    }

    /// Change the status filter; a different filter restarts at page 1
    pub fn set_status(&mut self, status: Option<String>) {
        if self.status != status {
            self.status = status;
            self.page = 1;
        }
    }

    /// Change the date range; a different range restarts at page 1
    pub fn set_date_range(&mut self, range: DateRange) {
        if self.date_range != range {
            self.date_range = range;
            self.page = 1;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Apply request query parameters
    ///
    /// The URL sort is only taken for views that keep their sort in the
    /// URL; an unparsable direction keeps the current one.
    pub fn apply_query(&mut self, query: &QueryParams, view: &ViewDefinition) {
        self.set_search(query.search.clone());
        self.set_status(query.status.clone());
        self.set_date_range(DateRange::new(query.from, query.to));
        if let Some(limit) = query.limit {
            self.page_size = limit.clamp(1, MAX_PAGE_SIZE);
        }

        if view.persist_to_url {
            if let Some(column) = &query.sort {
                self.sort.column = column.clone();
            }
            if let Some(direction) = query.direction.as_deref().and_then(SortDirection::parse) {
                self.sort.ascending = direction.is_ascending();
            }
            self.sort = view.normalize_sort(self.sort.clone());
        }

        self.set_page(query.page());
    }
}

/// Immutable snapshot of everything the query service filters on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterParameters {
    pub search_term: Option<String>,
    /// Always the principal's tenant
    pub tenant_id: Uuid,
    pub subclient_id: Option<Uuid>,
    pub user_id: Uuid,
    pub status_filter: Option<String>,
    pub date_range: DateRange,
    /// Physical sort key
    pub sort_column: String,
    /// Logical sort column the physical key was resolved from
    pub sort_logical: String,
    pub sort_direction: SortDirection,
    /// Physical keys the search term is matched against
    pub search_keys: Vec<String>,
    pub page: usize,
    pub page_size: usize,
}

/// Assemble filter parameters from component state and the principal
///
/// Tenant scoping comes exclusively from `principal`; a principal without a
/// tenant is rejected. Unknown logical sort columns resolve to the view's
/// default column.
pub fn compose(
    state: &ListState,
    principal: &AuthContext,
    view: &ViewDefinition,
) -> Result<FilterParameters, RequestError> {
    let (user_id, tenant_id) = principal.require_tenant()?;

    let search_term = state
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let status_filter = state
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let sort_logical = view.columns.normalize(&state.sort.column).to_string();
    let sort_column = view.columns.resolve(&sort_logical).to_string();
    let sort_direction = if sort_logical == state.sort.column {
        state.sort.direction()
    } else {
        view.default_sort().direction()
    };

    Ok(FilterParameters {
        search_term,
        tenant_id,
        subclient_id: principal.subclient_id(),
        user_id,
        status_filter,
        date_range: state.date_range,
        sort_column,
        sort_logical,
        sort_direction,
        search_keys: view.search_keys.clone(),
        page: state.page.max(1),
        page_size: state.page_size.clamp(1, MAX_PAGE_SIZE),
    })
}
