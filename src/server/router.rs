//! Router builder utilities for listing routes

use crate::server::handlers::{
    AppState, click_column, download_report, export_view, health_check, list_rows, list_views,
    report_history,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build the listing routes
///
/// These routes are generic and work for every registered view:
/// - GET /views - Registered views and their columns
/// - GET /views/{view}/rows - One page of rows
/// - POST /views/{view}/sort/{column} - Column header click
/// - GET /views/{view}/export - CSV export of every matching row
/// - GET /reports/history - Export history of the caller's tenant
/// - GET /reports/history/{id}/download - Download a past export again
pub fn build_listing_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/views", get(list_views))
        .route("/views/{view}/rows", get(list_rows))
        .route("/views/{view}/sort/{column}", post(click_column))
        .route("/views/{view}/export", get(export_view))
        .route("/reports/history", get(report_history))
        .route("/reports/history/{id}/download", get(download_report))
        .with_state(state)
}
