//! # CreditDesk
//!
//! Sortable, paginated, filterable list views for multi-tenant creditor
//! dashboards, with CSV export and report history.
//!
//! ## Features
//!
//! - **Tenant Isolation**: Every query is scoped to the principal's tenant, never to client input
//! - **Sort Persistence**: Column sorts survive reloads, per user and view, in the session or the URL
//! - **Unified Filters**: Search, status and date range composed into one set of parameters
//! - **CSV Export**: Full result sets exported, stored and recorded in a report history
//! - **Configuration-Based**: Views and their defaults declared or overridden in YAML
//! - **Macro-Based Rows**: One macro declares a row and its `Listable` implementation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use creditdesk::prelude::*;
//!
//! impl_listable_row!(
//!     RecallRow,
//!     listed_on: recalled_on,
//!     {
//!         consumer_name: String,
//!         recalled_on: NaiveDate,
//!     }
//! );
//!
//! let view = ViewDefinition::new(
//!     "recalls",
//!     ColumnMap::new("date", "recalled_on").with("consumer-name", "consumer_name"),
//! )
//! .search_on(["consumer_name"])
//! .export_column("Consumer", "consumer_name");
//!
//! ServerBuilder::new()
//!     .register_view(view, InMemoryRecordSource::<RecallRow>::new())
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        auth::{AuthContext, AuthPolicy, AuthProvider, HeaderAuthProvider},
        export::{ArtifactSink, ReportHistoryStore},
        field::FieldValue,
        row::Listable,
        service::{ListingService, RecordSource},
        session::SortStateStore,
    };

    // === Listing ===
    pub use crate::core::{
        ColumnMap, DateRange, ExportOutcome, FilterParameters, ListState, PaginationMeta,
        QueryParams, QueryService, ReportArchive, ResultPage, SortDirection, SortState,
        SortableList, ViewDefinition,
    };

    // === Errors ===
    pub use crate::core::error::{DeskError, DeskResult};

    // === Macros ===
    pub use crate::impl_listable_row;

    // === Rows ===
    pub use crate::entities::{
        DisputeRow, NegotiationRow, PaymentRow, disputes_view, open_negotiations_view,
        payments_view,
    };

    // === Storage ===
    pub use crate::storage::{
        FsArtifactSink, InMemoryArtifactSink, InMemoryRecordSource, InMemoryReportHistoryStore,
        InMemorySortStateStore,
    };

    // === Config ===
    pub use crate::config::{DeskConfig, ViewConfig};

    // === Server ===
    pub use crate::server::{ServerBuilder, ViewHandle, ViewRegistry};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
