//! Sort state for list views
//!
//! A view's sort is a two-state toggle per column: clicking the active
//! column flips the direction, clicking another column selects it in
//! descending order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn is_ascending(self) -> bool {
        matches!(self, SortDirection::Asc)
    }

    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Parse a boolean-like direction from a query string
    ///
    /// `true` and `1` mean ascending, mirroring the `direction` flag
    /// written by URL-persisted views.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "true" | "1" => Some(SortDirection::Asc),
            "desc" | "false" | "0" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted shape of a sort choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortPreference {
    pub sort_col: String,
    pub sort_asc: bool,
}

/// Current sort of a list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Logical column name
    pub column: String,
    pub ascending: bool,
    /// Whether the sort lives in the URL query string instead of the session
    #[serde(default)]
    pub persist_to_url: bool,
}

impl SortState {
    pub fn new(column: impl Into<String>, ascending: bool) -> Self {
        Self {
            column: column.into(),
            ascending,
            persist_to_url: false,
        }
    }

    pub fn persisted_to_url(mut self, persist_to_url: bool) -> Self {
        self.persist_to_url = persist_to_url;
        self
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::from_ascending(self.ascending)
    }

    /// Apply a click on a column header
    pub fn on_column_clicked(&mut self, column: &str) {
        if self.column == column {
            self.ascending = !self.ascending;
        } else {
            self.column = column.to_string();
            self.ascending = false;
        }
    }

    pub fn preference(&self) -> SortPreference {
        SortPreference {
            sort_col: self.column.clone(),
            sort_asc: self.ascending,
        }
    }

    pub fn from_preference(preference: SortPreference, persist_to_url: bool) -> Self {
        Self {
            column: preference.sort_col,
            ascending: preference.sort_asc,
            persist_to_url,
        }
    }

    /// Query string pairs for URL-persisted views
    pub fn to_query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("sort", self.column.clone()),
            ("direction", self.direction().as_str().to_string()),
        ]
    }
}
