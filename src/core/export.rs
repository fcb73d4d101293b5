//! Export pipeline: CSV artifacts and report history
//!
//! An export re-runs the list filter without pagination, writes the rows as
//! CSV with the view's fixed header order and, for views that keep history,
//! records a [`ReportHistoryRecord`] so the file can be downloaded again.
//! A filter matching nothing yields an [`EmptyResultNotice`] and writes no
//! file.

use crate::core::error::{ExportError, ListingError};
use crate::core::filter::{DateRange, FilterParameters};
use crate::core::row::Listable;
use crate::core::service::ListingService;
use crate::core::view::{ExportColumn, ViewDefinition};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tera::{Context, Tera};
use uuid::Uuid;

/// Default storage path of an export artifact
pub const DEFAULT_PATH_TEMPLATE: &str =
    "download-report/{{ report_type }}/{{ user_id }}_{{ timestamp }}_{{ suffix }}.csv";

const PATH_TEMPLATE_NAME: &str = "export_path";

const FALLBACK_LABEL: &str = "report";

/// Content type of CSV artifacts
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// A produced export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Name offered to the browser
    pub filename: String,
    /// Location in the artifact sink
    pub path: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub record_count: usize,
}

/// Returned instead of an artifact when the filter matches no rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyResultNotice {
    pub report_type: String,
    pub message: String,
}

impl EmptyResultNotice {
    pub fn new(report_type: impl Into<String>) -> Self {
        Self {
            report_type: report_type.into(),
            message: "There are no records to export for the selected filters".to_string(),
        }
    }
}

/// Result of an export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Artifact(ExportArtifact),
    Empty(EmptyResultNotice),
}

impl ExportOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ExportOutcome::Empty(_))
    }

    pub fn artifact(&self) -> Option<&ExportArtifact> {
        match self {
            ExportOutcome::Artifact(artifact) => Some(artifact),
            ExportOutcome::Empty(_) => None,
        }
    }
}

/// Audit entry written after a successful export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub subclient_id: Option<Uuid>,
    pub report_type: String,
    pub record_count: usize,
    pub date_range: DateRange,
    pub filename: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence for report history records
#[async_trait]
pub trait ReportHistoryStore: Send + Sync {
    /// Store a record
    async fn record(&self, record: ReportHistoryRecord) -> Result<ReportHistoryRecord>;

    /// Records of a tenant, newest first
    ///
    /// When `subclient_id` is set only that sub-client's records are returned.
    async fn list_for_tenant(
        &self,
        tenant_id: &Uuid,
        subclient_id: Option<&Uuid>,
    ) -> Result<Vec<ReportHistoryRecord>>;

    /// A record, only if it belongs to `tenant_id`
    async fn get(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<ReportHistoryRecord>>;
}

/// Storage for export artifacts
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()>;

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Remove an artifact; a missing one is not an error
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Lowercase slug with runs of other characters collapsed to `-`
pub fn slugify(value: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let regex = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));
    regex
        .replace_all(&value.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Slug naming a view's artifacts
///
/// Falls back to the view identifier, then to `report`, when the report
/// type has no ASCII letters or digits.
pub fn artifact_label(view: &ViewDefinition) -> String {
    [view.report_type.as_str(), view.identifier.as_str()]
        .into_iter()
        .map(slugify)
        .find(|slug| !slug.is_empty())
        .unwrap_or_else(|| FALLBACK_LABEL.to_string())
}

/// Builds artifact filenames and storage paths
#[derive(Debug, Clone)]
pub struct ArtifactNamer {
    tera: Tera,
}

/// Filename and storage path of one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    pub filename: String,
    pub path: String,
}

impl ArtifactNamer {
    /// Create a namer from a tera path template
    ///
    /// The template sees `report_type` (slugified), `user_id`, `tenant_id`,
    /// `timestamp` and `suffix`.
    pub fn new(path_template: &str) -> Result<Self, ExportError> {
        let mut tera = Tera::default();
        tera.add_raw_template(PATH_TEMPLATE_NAME, path_template)?;
        Ok(Self { tera })
    }

    /// Name an artifact created now with a random suffix
    pub fn name(
        &self,
        report_type: &str,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<ArtifactName, ExportError> {
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_string();
        self.name_at(report_type, user_id, tenant_id, Utc::now(), &suffix)
    }

    /// Name an artifact for a given instant and suffix
    pub fn name_at(
        &self,
        report_type: &str,
        user_id: Uuid,
        tenant_id: Uuid,
        at: DateTime<Utc>,
        suffix: &str,
    ) -> Result<ArtifactName, ExportError> {
        let mut slug = slugify(report_type);
        if slug.is_empty() {
            slug = FALLBACK_LABEL.to_string();
        }
        let timestamp = at.format("%Y%m%d%H%M%S").to_string();

        let mut context = Context::new();
        context.insert("report_type", &slug);
        context.insert("user_id", &user_id.to_string());
        context.insert("tenant_id", &tenant_id.to_string());
        context.insert("timestamp", &timestamp);
        context.insert("suffix", suffix);
        let path = self.tera.render(PATH_TEMPLATE_NAME, &context)?;

        Ok(ArtifactName {
            filename: format!("{}_{}_{}.csv", slug, timestamp, suffix),
            path,
        })
    }
}

impl Default for ArtifactNamer {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_TEMPLATE).expect("default export path template is valid")
    }
}

/// Serialize rows as CSV with the given header order
pub fn write_csv<T: Listable>(rows: &[T], columns: &[ExportColumn]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|c| c.header.as_str()))?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| row.column(&c.key).to_cell()))?;
    }
    writer.into_inner().map_err(|e| ExportError::Csv {
        message: e.to_string(),
    })
}

/// Artifact sink and report history, shared by every view's exporter
#[derive(Clone)]
pub struct ReportArchive {
    sink: Arc<dyn ArtifactSink>,
    history: Arc<dyn ReportHistoryStore>,
}

impl ReportArchive {
    pub fn new(sink: Arc<dyn ArtifactSink>, history: Arc<dyn ReportHistoryStore>) -> Self {
        Self { sink, history }
    }

    /// History of a tenant, newest first
    pub async fn history(
        &self,
        tenant_id: &Uuid,
        subclient_id: Option<&Uuid>,
    ) -> Result<Vec<ReportHistoryRecord>> {
        self.history.list_for_tenant(tenant_id, subclient_id).await
    }

    /// Fetch a previously exported artifact of the given tenant
    ///
    /// Records of other tenants (or of another sub-client when
    /// `subclient_id` is set) are reported as not found.
    pub async fn redownload(
        &self,
        tenant_id: &Uuid,
        subclient_id: Option<&Uuid>,
        report_id: &Uuid,
    ) -> Result<ExportArtifact> {
        let record = self
            .history
            .get(tenant_id, report_id)
            .await?
            .filter(|r| subclient_id.is_none_or(|s| r.subclient_id.as_ref() == Some(s)))
            .ok_or(ListingError::ReportNotFound { id: *report_id })?;
        let bytes = self
            .sink
            .get(&record.path)
            .await?
            .ok_or_else(|| ExportError::ArtifactMissing {
                path: record.path.clone(),
            })?;

        Ok(ExportArtifact {
            filename: record.filename,
            path: record.path,
            content_type: CSV_CONTENT_TYPE,
            bytes,
            record_count: record.record_count,
        })
    }
}

/// Runs exports for one row type
pub struct Exporter<T: Listable> {
    service: Arc<dyn ListingService<T>>,
    archive: ReportArchive,
    namer: ArtifactNamer,
}

impl<T: Listable> Clone for Exporter<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            archive: self.archive.clone(),
            namer: self.namer.clone(),
        }
    }
}

impl<T: Listable> Exporter<T> {
    pub fn new(service: Arc<dyn ListingService<T>>, archive: ReportArchive) -> Self {
        Self {
            service,
            archive,
            namer: ArtifactNamer::default(),
        }
    }

    pub fn with_namer(mut self, namer: ArtifactNamer) -> Self {
        self.namer = namer;
        self
    }

    /// Export every row matching `params`
    pub async fn export(
        &self,
        params: &FilterParameters,
        view: &ViewDefinition,
    ) -> Result<ExportOutcome> {
        let rows = self.service.fetch_all(params).await?;
        if rows.is_empty() {
            tracing::info!(
                view = %view.identifier,
                tenant_id = %params.tenant_id,
                "export matched no rows"
            );
            return Ok(ExportOutcome::Empty(EmptyResultNotice::new(
                &view.report_type,
            )));
        }

        let bytes = write_csv(&rows, &view.export_columns)?;
        let name = self
            .namer
            .name(&artifact_label(view), params.user_id, params.tenant_id)?;
        self.archive.sink.put(&name.path, &bytes).await?;

        if view.record_history {
            let recorded = self
                .archive
                .history
                .record(ReportHistoryRecord {
                    id: Uuid::new_v4(),
                    user_id: params.user_id,
                    tenant_id: params.tenant_id,
                    subclient_id: params.subclient_id,
                    report_type: view.report_type.clone(),
                    record_count: rows.len(),
                    date_range: params.date_range,
                    filename: name.filename.clone(),
                    path: name.path.clone(),
                    created_at: Utc::now(),
                })
                .await;
            if let Err(err) = recorded {
                if let Err(cleanup) = self.archive.sink.delete(&name.path).await {
                    tracing::warn!(
                        path = %name.path,
                        error = %cleanup,
                        "failed to remove unrecorded artifact"
                    );
                }
                return Err(err);
            }
        }

        tracing::info!(
            view = %view.identifier,
            tenant_id = %params.tenant_id,
            rows = rows.len(),
            filename = %name.filename,
            "export written"
        );

        Ok(ExportOutcome::Artifact(ExportArtifact {
            filename: name.filename,
            path: name.path,
            content_type: CSV_CONTENT_TYPE,
            bytes,
            record_count: rows.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::AuthContext;
    use crate::core::filter::{ListState, compose};
    use crate::core::service::QueryService;
    use crate::core::view::ColumnMap;
    use crate::entities::{PaymentRow, payments_view};
    use crate::storage::{InMemoryArtifactSink, InMemoryRecordSource};
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Open Negotiations"), "open-negotiations");
        assert_eq!(slugify("payments__report!!"), "payments-report");
        assert_eq!(slugify("--Disputes--"), "disputes");
    }

    #[test]
    fn test_default_namer_layout() {
        let user_id = Uuid::nil();
        let at = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 5).unwrap();
        let name = ArtifactNamer::default()
            .name_at("Open Negotiations", user_id, Uuid::new_v4(), at, "a1b2c3d4")
            .unwrap();
        assert_eq!(name.filename, "open-negotiations_20240517093005_a1b2c3d4.csv");
        assert_eq!(
            name.path,
            format!(
                "download-report/open-negotiations/{}_20240517093005_a1b2c3d4.csv",
                user_id
            )
        );
    }

    #[test]
    fn test_custom_template() {
        let tenant_id = Uuid::new_v4();
        let namer = ArtifactNamer::new("{{ tenant_id }}/{{ report_type }}-{{ suffix }}.csv").unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let name = namer
            .name_at("payments", Uuid::new_v4(), tenant_id, at, "ffff0000")
            .unwrap();
        assert_eq!(name.path, format!("{}/payments-ffff0000.csv", tenant_id));
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        assert!(matches!(
            ArtifactNamer::new("{{ unclosed"),
            Err(ExportError::Template { .. })
        ));
    }

    #[test]
    fn test_random_suffixes_differ() {
        let namer = ArtifactNamer::default();
        let a = namer.name("payments", Uuid::nil(), Uuid::nil()).unwrap();
        let b = namer.name("payments", Uuid::nil(), Uuid::nil()).unwrap();
        assert_ne!(a.path, b.path);
    }

    #[test]
    fn test_label_falls_back_when_slug_is_empty() {
        let columns = || ColumnMap::new("date", "scheduled_on");
        let view = ViewDefinition::new("payments", columns()).report_type("Платежи");
        assert_eq!(artifact_label(&view), "payments");

        let view = ViewDefinition::new("платежи", columns()).report_type("!!!");
        assert_eq!(artifact_label(&view), "report");

        let view = ViewDefinition::new("payments", columns()).report_type("Payments");
        assert_eq!(artifact_label(&view), "payments");
    }

    #[test]
    fn test_namer_never_renders_an_empty_segment() {
        let at = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 5).unwrap();
        let name = ArtifactNamer::default()
            .name_at("収納", Uuid::nil(), Uuid::nil(), at, "a1b2c3d4")
            .unwrap();
        assert_eq!(name.filename, "report_20240517093005_a1b2c3d4.csv");
        assert!(!name.path.contains("//"));
    }

    struct RejectingHistory;

    #[async_trait]
    impl ReportHistoryStore for RejectingHistory {
        async fn record(&self, _record: ReportHistoryRecord) -> Result<ReportHistoryRecord> {
            Err(anyhow::anyhow!("history unavailable"))
        }

        async fn list_for_tenant(
            &self,
            _tenant_id: &Uuid,
            _subclient_id: Option<&Uuid>,
        ) -> Result<Vec<ReportHistoryRecord>> {
            Ok(Vec::new())
        }

        async fn get(&self, _tenant_id: &Uuid, _id: &Uuid) -> Result<Option<ReportHistoryRecord>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_failed_history_leaves_no_artifact() {
        let tenant_id = Uuid::new_v4();
        let source: InMemoryRecordSource<PaymentRow> = [PaymentRow::new(
            tenant_id,
            "paid".to_string(),
            "Alice".to_string(),
            "ACC-1".to_string(),
            10.0,
            "card".to_string(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            None,
        )]
        .into_iter()
        .collect();
        let sink = InMemoryArtifactSink::new();
        let exporter = Exporter::new(
            Arc::new(QueryService::new(source)),
            ReportArchive::new(Arc::new(sink.clone()), Arc::new(RejectingHistory)),
        );
        let view = payments_view();
        let principal = AuthContext::user(Uuid::new_v4(), tenant_id);
        let params = compose(&ListState::for_view(&view), &principal, &view).unwrap();

        let err = exporter.export(&params, &view).await.unwrap_err();
        assert_eq!(err.to_string(), "history unavailable");
        assert!(sink.paths().is_empty());
    }

    #[test]
    fn test_empty_notice_message() {
        let notice = EmptyResultNotice::new("disputes");
        assert_eq!(notice.report_type, "disputes");
        assert!(!notice.message.is_empty());
    }
}
