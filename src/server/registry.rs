//! View registry: type-erased access to every registered list view

use crate::core::auth::AuthContext;
use crate::core::export::ExportOutcome;
use crate::core::listing::SortableList;
use crate::core::query::{QueryParams, ResultPage};
use crate::core::row::Listable;
use crate::core::sort::SortState;
use crate::core::view::ViewDefinition;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A rendered page, rows already serialized
#[derive(Debug, Clone, Serialize)]
pub struct ViewPage {
    #[serde(flatten)]
    pub page: ResultPage<Value>,
    pub sort: SortState,
}

/// Outcome of a column click
#[derive(Debug, Clone, Serialize)]
pub struct SortChange {
    pub sort: SortState,
    /// Query pairs to put in the URL, for URL-persisted views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<BTreeMap<String, String>>,
}

/// Summary of a view for discovery
#[derive(Debug, Clone, Serialize)]
pub struct ViewSummary {
    pub identifier: String,
    pub report_type: String,
    pub columns: Vec<String>,
    pub default_sort: SortState,
    pub page_size: usize,
}

impl From<&ViewDefinition> for ViewSummary {
    fn from(view: &ViewDefinition) -> Self {
        Self {
            identifier: view.identifier.clone(),
            report_type: view.report_type.clone(),
            columns: view.columns.logical_columns().map(str::to_string).collect(),
            default_sort: view.default_sort(),
            page_size: view.page_size,
        }
    }
}

/// Row-type independent handle on a list view
///
/// Implemented for every [`SortableList`], so views over different row
/// types can live in one registry.
#[async_trait]
pub trait ViewHandle: Send + Sync {
    fn definition(&self) -> &ViewDefinition;

    /// Mount with `query` and render the requested page
    async fn rows(&self, principal: &AuthContext, query: &QueryParams) -> Result<ViewPage>;

    /// Mount with `query` and apply a click on `column`
    async fn click(
        &self,
        principal: &AuthContext,
        query: &QueryParams,
        column: &str,
    ) -> Result<SortChange>;

    /// Mount with `query` and export every matching row
    async fn export(&self, principal: &AuthContext, query: &QueryParams) -> Result<ExportOutcome>;
}

#[async_trait]
impl<T: Listable> ViewHandle for SortableList<T> {
    fn definition(&self) -> &ViewDefinition {
        self.view()
    }

    async fn rows(&self, principal: &AuthContext, query: &QueryParams) -> Result<ViewPage> {
        let state = self.mount(principal, query).await?;
        let page = self.render(principal, &state).await?;
        Ok(ViewPage {
            page: page.try_map(serde_json::to_value)?,
            sort: state.sort,
        })
    }

    async fn click(
        &self,
        principal: &AuthContext,
        query: &QueryParams,
        column: &str,
    ) -> Result<SortChange> {
        let mut state = self.mount(principal, query).await?;
        self.click_column(principal, &mut state, column).await?;
        let query = state.sort.persist_to_url.then(|| {
            state
                .sort
                .to_query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect()
        });
        Ok(SortChange {
            sort: state.sort,
            query,
        })
    }

    async fn export(&self, principal: &AuthContext, query: &QueryParams) -> Result<ExportOutcome> {
        let state = self.mount(principal, query).await?;
        SortableList::export(self, principal, &state).await
    }
}

/// Registry of all views exposed by the server
#[derive(Default, Clone)]
pub struct ViewRegistry {
    views: BTreeMap<String, Arc<dyn ViewHandle>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view under its identifier, replacing any previous one
    pub fn register(&mut self, view: Arc<dyn ViewHandle>) {
        let identifier = view.definition().identifier.clone();
        if self.views.insert(identifier.clone(), view).is_some() {
            tracing::warn!(view = %identifier, "view registered twice, keeping the last one");
        }
    }

    pub fn get(&self, identifier: &str) -> Option<Arc<dyn ViewHandle>> {
        self.views.get(identifier).cloned()
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<&str> {
        self.views.keys().map(String::as_str).collect()
    }

    pub fn summaries(&self) -> Vec<ViewSummary> {
        self.views
            .values()
            .map(|v| ViewSummary::from(v.definition()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::ReportArchive;
    use crate::core::service::QueryService;
    use crate::entities::{PaymentRow, disputes_view, payments_view};
    use crate::storage::{
        InMemoryArtifactSink, InMemoryRecordSource, InMemoryReportHistoryStore,
        InMemorySortStateStore,
    };

    fn list(view: ViewDefinition) -> Arc<dyn ViewHandle> {
        let archive = ReportArchive::new(
            Arc::new(InMemoryArtifactSink::new()),
            Arc::new(InMemoryReportHistoryStore::new()),
        );
        Arc::new(SortableList::<PaymentRow>::new(
            view,
            QueryService::new(InMemoryRecordSource::new()),
            Arc::new(InMemorySortStateStore::new()),
            archive,
        ))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ViewRegistry::new();
        registry.register(list(payments_view()));
        registry.register(list(disputes_view()));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.identifiers(), vec!["disputes", "payments"]);
        assert!(registry.get("payments").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_register_replaces_same_identifier() {
        let mut registry = ViewRegistry::new();
        registry.register(list(payments_view()));
        registry.register(list(payments_view().page_size(5)));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.summaries()[0].page_size, 5);
    }

    #[tokio::test]
    async fn test_click_on_url_view_returns_query() {
        let view = list(disputes_view());
        let principal = AuthContext::user(uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        let change = view
            .click(&principal, &QueryParams::default(), "reason")
            .await
            .unwrap();
        assert_eq!(change.sort.column, "reason");
        assert!(!change.sort.ascending);

        let query = change.query.unwrap();
        assert_eq!(query["sort"], "reason");
        assert_eq!(query["direction"], "desc");
    }

    #[tokio::test]
    async fn test_click_on_session_view_has_no_query() {
        let view = list(payments_view());
        let principal = AuthContext::user(uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        let change = view
            .click(&principal, &QueryParams::default(), "amount")
            .await
            .unwrap();
        assert!(change.query.is_none());
    }
}
