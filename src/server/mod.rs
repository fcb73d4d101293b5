//! Server module for building HTTP servers exposing list views
//!
//! This module provides a `ServerBuilder` that registers:
//! - Row, sort and export routes for every registered view
//! - Report history routes shared by all views
//! - Discovery and health routes

pub mod builder;
pub mod handlers;
pub mod registry;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use registry::{SortChange, ViewHandle, ViewPage, ViewRegistry, ViewSummary};
