//! View definitions: column lookup tables, defaults and export layout

use crate::core::auth::AuthPolicy;
use crate::core::sort::SortState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maximum rows per page
pub const MAX_PAGE_SIZE: usize = 100;

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Static lookup from logical sort columns to physical row keys
///
/// The map always holds its default entry, so resolution is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    entries: IndexMap<String, String>,
    default: String,
}

impl ColumnMap {
    /// Create a map whose default logical column is `default_logical`
    pub fn new(default_logical: impl Into<String>, default_physical: impl Into<String>) -> Self {
        let default = default_logical.into();
        let mut entries = IndexMap::new();
        entries.insert(default.clone(), default_physical.into());
        Self { entries, default }
    }

    pub fn with(mut self, logical: impl Into<String>, physical: impl Into<String>) -> Self {
        self.entries.insert(logical.into(), physical.into());
        self
    }

    pub fn contains(&self, logical: &str) -> bool {
        self.entries.contains_key(logical)
    }

    pub fn default_column(&self) -> &str {
        &self.default
    }

    /// The logical column actually used for `logical`
    pub fn normalize<'a>(&'a self, logical: &'a str) -> &'a str {
        if self.contains(logical) {
            logical
        } else {
            &self.default
        }
    }

    /// Physical key for a logical column, unknown columns yield the default
    pub fn resolve(&self, logical: &str) -> &str {
        self.entries
            .get(self.normalize(logical))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn logical_columns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One column of an export, in header order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportColumn {
    pub header: String,
    pub key: String,
}

impl ExportColumn {
    pub fn new(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
        }
    }
}

/// Everything the listing pipeline needs to know about one dashboard view
#[derive(Debug, Clone)]
pub struct ViewDefinition {
    pub identifier: String,
    pub report_type: String,
    pub columns: ColumnMap,
    pub default_ascending: bool,
    pub persist_to_url: bool,
    /// Physical keys searched by the free-text term
    pub search_keys: Vec<String>,
    pub export_columns: Vec<ExportColumn>,
    pub page_size: usize,
    pub record_history: bool,
    /// Who may list and sort the view
    pub list_policy: AuthPolicy,
    /// Who may export the view
    pub export_policy: AuthPolicy,
}

impl ViewDefinition {
    /// Start a definition; the report type defaults to the identifier
    pub fn new(identifier: impl Into<String>, columns: ColumnMap) -> Self {
        let identifier = identifier.into();
        Self {
            report_type: identifier.clone(),
            identifier,
            columns,
            default_ascending: false,
            persist_to_url: false,
            search_keys: Vec::new(),
            export_columns: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            record_history: true,
            list_policy: AuthPolicy::Authenticated,
            export_policy: AuthPolicy::Authenticated,
        }
    }

    pub fn report_type(mut self, report_type: impl Into<String>) -> Self {
        self.report_type = report_type.into();
        self
    }

    pub fn default_ascending(mut self, ascending: bool) -> Self {
        self.default_ascending = ascending;
        self
    }

    pub fn persist_to_url(mut self, persist: bool) -> Self {
        self.persist_to_url = persist;
        self
    }

    pub fn search_on<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn export_column(mut self, header: impl Into<String>, key: impl Into<String>) -> Self {
        self.export_columns.push(ExportColumn::new(header, key));
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn list_policy(mut self, policy: AuthPolicy) -> Self {
        self.list_policy = policy;
        self
    }

    pub fn export_policy(mut self, policy: AuthPolicy) -> Self {
        self.export_policy = policy;
        self
    }

    /// The sort a user sees before choosing one
    pub fn default_sort(&self) -> SortState {
        SortState::new(self.columns.default_column(), self.default_ascending)
            .persisted_to_url(self.persist_to_url)
    }

    /// Replace an unknown logical column in `sort` with the default column
    pub fn normalize_sort(&self, sort: SortState) -> SortState {
        if self.columns.contains(&sort.column) {
            sort
        } else {
            self.default_sort()
        }
    }
}
