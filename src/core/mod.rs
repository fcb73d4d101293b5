//! Core module containing the listing traits and types

pub mod auth;
pub mod error;
pub mod export;
pub mod field;
pub mod filter;
pub mod listing;
pub mod query;
pub mod row;
pub mod service;
pub mod session;
pub mod sort;
pub mod view;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, HeaderAuthProvider};
pub use error::{DeskError, DeskResult};
pub use export::{
    ArtifactSink, EmptyResultNotice, ExportArtifact, ExportOutcome, ReportArchive,
    ReportHistoryRecord, ReportHistoryStore,
};
pub use field::FieldValue;
pub use filter::{DateRange, FilterParameters, ListState, compose};
pub use listing::SortableList;
pub use query::{PaginationMeta, QueryParams, ResultPage};
pub use row::Listable;
pub use service::{ListingService, QueryService, RecordSource};
pub use session::{SessionKey, SortStateStore};
pub use sort::{SortDirection, SortPreference, SortState};
pub use view::{ColumnMap, ExportColumn, ViewDefinition};
