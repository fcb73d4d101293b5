//! Generic sortable, paginated, tenant-scoped list component
//!
//! [`SortableList`] is what a dashboard view is built from: it restores the
//! user's sort on mount, applies column clicks, renders pages and runs
//! exports, all scoped to the principal's tenant.
//!
//! # Example
//!
//! ```rust,ignore
//! let list = SortableList::new(view, QueryService::new(source), sort_store, archive);
//!
//! let mut state = list.mount(&principal, &QueryParams::default()).await?;
//! list.click_column(&principal, &mut state, "consumer-name").await?;
//! let page = list.render(&principal, &state).await?;
//! ```

use crate::core::auth::AuthContext;
use crate::core::export::{ArtifactNamer, ExportOutcome, Exporter, ReportArchive};
use crate::core::filter::{ListState, compose};
use crate::core::query::{QueryParams, ResultPage};
use crate::core::row::Listable;
use crate::core::service::ListingService;
use crate::core::session::{SessionKey, SortStateStore};
use crate::core::sort::SortState;
use crate::core::view::ViewDefinition;
use anyhow::Result;
use std::sync::Arc;

/// A list view over rows of type `T`
pub struct SortableList<T: Listable> {
    view: Arc<ViewDefinition>,
    service: Arc<dyn ListingService<T>>,
    sort_store: Arc<dyn SortStateStore>,
    exporter: Exporter<T>,
}

impl<T: Listable> Clone for SortableList<T> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            service: self.service.clone(),
            sort_store: self.sort_store.clone(),
            exporter: self.exporter.clone(),
        }
    }
}

impl<T: Listable> SortableList<T> {
    pub fn new(
        view: ViewDefinition,
        service: impl ListingService<T> + 'static,
        sort_store: Arc<dyn SortStateStore>,
        archive: ReportArchive,
    ) -> Self {
        let service: Arc<dyn ListingService<T>> = Arc::new(service);
        Self {
            view: Arc::new(view),
            exporter: Exporter::new(service.clone(), archive),
            service,
            sort_store,
        }
    }

    /// Use a custom artifact namer for exports
    pub fn with_namer(mut self, namer: ArtifactNamer) -> Self {
        self.exporter = self.exporter.with_namer(namer);
        self
    }

    pub fn view(&self) -> &ViewDefinition {
        &self.view
    }

    fn session_key(&self, principal: &AuthContext) -> Option<SessionKey> {
        principal
            .user_id()
            .map(|user_id| SessionKey::new(user_id, self.view.identifier.clone()))
    }

    /// Build the initial state for a request
    ///
    /// Session views restore the stored sort (falling back to the view
    /// default); URL views take it from `query`.
    pub async fn mount(&self, principal: &AuthContext, query: &QueryParams) -> Result<ListState> {
        self.view.list_policy.enforce(principal, "list this view")?;

        let mut state = ListState::for_view(&self.view);
        if !self.view.persist_to_url {
            if let Some(key) = self.session_key(principal) {
                if let Some(preference) = self.sort_store.load(&key).await? {
                    state.sort = self
                        .view
                        .normalize_sort(SortState::from_preference(preference, false));
                }
            }
        }
        state.apply_query(query, &self.view);
        Ok(state)
    }

    /// Apply a click on a column header and persist the new sort
    ///
    /// An unknown column puts the view back on its default sort.
    pub async fn click_column(
        &self,
        principal: &AuthContext,
        state: &mut ListState,
        column: &str,
    ) -> Result<()> {
        self.view.list_policy.enforce(principal, "sort this view")?;

        if self.view.columns.contains(column) {
            state.sort.on_column_clicked(column);
        } else {
            tracing::debug!(view = %self.view.identifier, column, "unknown sort column");
            state.sort = self.view.default_sort();
        }
        state.set_page(1);

        if !self.view.persist_to_url {
            if let Some(key) = self.session_key(principal) {
                self.sort_store.save(&key, state.sort.preference()).await?;
            }
        }

        tracing::debug!(
            view = %self.view.identifier,
            column = %state.sort.column,
            ascending = state.sort.ascending,
            "sort changed"
        );
        Ok(())
    }

    /// Drop the stored sort and go back to the view default
    pub async fn reset_sort(&self, principal: &AuthContext, state: &mut ListState) -> Result<()> {
        state.sort = self.view.default_sort();
        state.set_page(1);
        if let Some(key) = self.session_key(principal) {
            self.sort_store.forget(&key).await?;
        }
        Ok(())
    }

    /// Fetch the page described by `state`
    pub async fn render(&self, principal: &AuthContext, state: &ListState) -> Result<ResultPage<T>> {
        self.view.list_policy.enforce(principal, "list this view")?;
        let params = compose(state, principal, &self.view)?;
        self.service.fetch_page(&params).await
    }

    /// Export every row matching `state`
    pub async fn export(&self, principal: &AuthContext, state: &ListState) -> Result<ExportOutcome> {
        self.view.export_policy.enforce(principal, "export this view")?;
        let params = compose(state, principal, &self.view)?;
        self.exporter.export(&params, &self.view).await
    }
}
