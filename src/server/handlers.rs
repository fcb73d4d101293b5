//! HTTP handlers for list views and report history
//!
//! Handlers are view-agnostic: they resolve the view from the path, the
//! principal from the headers, and delegate to the [`ViewHandle`].

use crate::core::auth::{AuthContext, AuthProvider};
use crate::core::error::{DeskError, ListingError};
use crate::core::export::{ExportArtifact, ExportOutcome, ReportArchive};
use crate::core::query::QueryParams;
use crate::server::registry::{ViewHandle, ViewRegistry};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub views: Arc<ViewRegistry>,
    pub archive: ReportArchive,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    async fn principal(&self, headers: &HeaderMap) -> Result<AuthContext, DeskError> {
        Ok(self.auth.extract_context(headers).await?)
    }

    fn view(&self, identifier: &str) -> Result<Arc<dyn ViewHandle>, DeskError> {
        self.views.get(identifier).ok_or_else(|| {
            ListingError::ViewNotFound {
                view: identifier.to_string(),
            }
            .into()
        })
    }
}

fn attachment(artifact: ExportArtifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    let mut response = (StatusCode::OK, artifact.bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(artifact.content_type),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// GET /views
pub async fn list_views(State(state): State<AppState>) -> Json<serde_json::Value> {
    let views = state.views.summaries();
    Json(json!({
        "count": views.len(),
        "views": views,
    }))
}

/// GET /views/{view}/rows
pub async fn list_rows(
    State(state): State<AppState>,
    Path(view): Path<String>,
    headers: HeaderMap,
    Query(query): Query<QueryParams>,
) -> Result<Response, DeskError> {
    query.validate()?;
    let view = state.view(&view)?;
    let principal = state.principal(&headers).await?;

    let page = view.rows(&principal, &query).await?;
    Ok(Json(page).into_response())
}

/// POST /views/{view}/sort/{column}
pub async fn click_column(
    State(state): State<AppState>,
    Path((view, column)): Path<(String, String)>,
    headers: HeaderMap,
    Query(query): Query<QueryParams>,
) -> Result<Response, DeskError> {
    query.validate()?;
    let view = state.view(&view)?;
    let principal = state.principal(&headers).await?;

    let change = view.click(&principal, &query, &column).await?;
    Ok(Json(change).into_response())
}

/// GET /views/{view}/export
///
/// Responds with the CSV as an attachment, or with a JSON notice when
/// nothing matched.
pub async fn export_view(
    State(state): State<AppState>,
    Path(view): Path<String>,
    headers: HeaderMap,
    Query(query): Query<QueryParams>,
) -> Result<Response, DeskError> {
    query.validate()?;
    let view = state.view(&view)?;
    let principal = state.principal(&headers).await?;

    match view.export(&principal, &query).await? {
        ExportOutcome::Artifact(artifact) => Ok(attachment(artifact)),
        ExportOutcome::Empty(notice) => Ok(Json(json!({ "notice": notice })).into_response()),
    }
}

/// GET /reports/history
pub async fn report_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, DeskError> {
    let principal = state.principal(&headers).await?;
    let (_, tenant_id) = principal.require_tenant()?;
    let subclient_id = principal.subclient_id();

    let records = state
        .archive
        .history(&tenant_id, subclient_id.as_ref())
        .await?;
    Ok(Json(json!({
        "count": records.len(),
        "data": records,
    }))
    .into_response())
}

/// GET /reports/history/{id}/download
pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, DeskError> {
    let principal = state.principal(&headers).await?;
    let (_, tenant_id) = principal.require_tenant()?;
    let subclient_id = principal.subclient_id();

    let artifact = state
        .archive
        .redownload(&tenant_id, subclient_id.as_ref(), &id)
        .await?;
    Ok(attachment(artifact))
}

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "creditdesk"
    }))
}
