//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::registry::{ViewHandle, ViewRegistry};
use super::router::build_listing_routes;
use crate::config::DeskConfig;
use crate::core::auth::{AuthProvider, HeaderAuthProvider};
use crate::core::export::{ArtifactNamer, ReportArchive};
use crate::core::listing::SortableList;
use crate::core::row::Listable;
use crate::core::service::{QueryService, RecordSource};
use crate::core::session::SortStateStore;
use crate::core::view::ViewDefinition;
use crate::storage::{
    FsArtifactSink, InMemoryArtifactSink, InMemoryReportHistoryStore, InMemorySortStateStore,
};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared pieces every view is built from, resolved at build time
struct Components {
    config: DeskConfig,
    sort_store: Arc<dyn SortStateStore>,
    archive: ReportArchive,
    namer: ArtifactNamer,
}

type PendingView = Box<dyn FnOnce(&Components) -> Arc<dyn ViewHandle> + Send>;

/// Builder for creating HTTP servers exposing list views
///
/// Stores default to in-memory implementations. Views may be registered
/// before or after the stores are set.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(DeskConfig::from_yaml_file("desk.yaml")?)
///     .register_view(payments_view(), payments_source)
///     .register_view(disputes_view(), disputes_source)
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: DeskConfig,
    sort_store: Option<Arc<dyn SortStateStore>>,
    archive: Option<ReportArchive>,
    auth: Option<Arc<dyn AuthProvider>>,
    pending: Vec<PendingView>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: DeskConfig::default(),
            sort_store: None,
            archive: None,
            auth: None,
            pending: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Use a configuration: view overrides, export naming and artifact root
    pub fn with_config(mut self, config: DeskConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sort_store(mut self, store: impl SortStateStore + 'static) -> Self {
        self.sort_store = Some(Arc::new(store));
        self
    }

    /// Set the artifact sink and report history shared by all views
    pub fn with_archive(mut self, archive: ReportArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Set how principals are extracted from requests
    ///
    /// Defaults to [`HeaderAuthProvider`].
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register a view over rows from `source`
    ///
    /// Configuration overrides for the view's identifier are applied when
    /// the server is built.
    pub fn register_view<T: Listable>(
        mut self,
        view: ViewDefinition,
        source: impl RecordSource<T> + 'static,
    ) -> Self {
        self.pending.push(Box::new(move |components: &Components| {
            let view = components.config.apply_overrides(view);
            let list = SortableList::new(
                view,
                QueryService::new(source),
                components.sort_store.clone(),
                components.archive.clone(),
            )
            .with_namer(components.namer.clone());
            Arc::new(list) as Arc<dyn ViewHandle>
        }));
        self
    }

    /// Register an already assembled list as is
    pub fn register_list<T: Listable>(mut self, list: SortableList<T>) -> Self {
        self.pending
            .push(Box::new(move |_: &Components| Arc::new(list) as Arc<dyn ViewHandle>));
        self
    }

    fn components(&mut self) -> Result<Components> {
        let namer = self.config.export.namer()?;
        let archive = match self.archive.take() {
            Some(archive) => archive,
            None => {
                let history = Arc::new(InMemoryReportHistoryStore::new());
                match &self.config.export.root_dir {
                    Some(root) => ReportArchive::new(Arc::new(FsArtifactSink::new(root)), history),
                    None => ReportArchive::new(Arc::new(InMemoryArtifactSink::new()), history),
                }
            }
        };
        let sort_store = self
            .sort_store
            .take()
            .unwrap_or_else(|| Arc::new(InMemorySortStateStore::new()));

        Ok(Components {
            config: std::mem::take(&mut self.config),
            sort_store,
            archive,
            namer,
        })
    }

    /// Build the final router
    ///
    /// This generates the listing routes for every registered view, merges
    /// custom routes and adds request tracing and CORS.
    pub fn build(mut self) -> Result<Router> {
        let components = self.components()?;

        let mut registry = ViewRegistry::new();
        for pending in self.pending.drain(..) {
            registry.register(pending(&components));
        }
        if registry.is_empty() {
            tracing::warn!("building a server without any view");
        }
        tracing::debug!(views = ?registry.identifiers(), "views registered");

        let state = AppState {
            views: Arc::new(registry),
            archive: components.archive,
            auth: self
                .auth
                .take()
                .unwrap_or_else(|| Arc::new(HeaderAuthProvider)),
        };

        let mut app = build_listing_routes(state);
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
