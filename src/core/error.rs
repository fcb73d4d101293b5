//! Typed error handling for creditdesk
//!
//! Service traits return `anyhow::Result`; at the HTTP boundary errors are
//! turned into [`DeskError`], which knows its status code and error code.
//!
//! # Error Categories
//!
//! - [`ListingError`]: unknown views, unknown report history entries
//! - [`ExportError`]: CSV serialization and artifact naming failures
//! - [`ConfigError`]: configuration parsing and validation
//! - [`StorageError`]: storage backends
//! - [`RequestError`]: malformed or unauthorized requests
//!
//! Two conditions are not errors: an export with no rows
//! (see [`crate::core::export::ExportOutcome::Empty`]) and an unknown sort
//! column (normalized to the view default).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for creditdesk
#[derive(Debug)]
pub enum DeskError {
    /// Listing-related errors
    Listing(ListingError),

    /// Export pipeline errors
    Export(ExportError),

    /// Configuration errors
    Config(ConfigError),

    /// Storage backend errors
    Storage(StorageError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for DeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeskError::Listing(e) => write!(f, "{}", e),
            DeskError::Export(e) => write!(f, "{}", e),
            DeskError::Config(e) => write!(f, "{}", e),
            DeskError::Storage(e) => write!(f, "{}", e),
            DeskError::Request(e) => write!(f, "{}", e),
            DeskError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeskError::Listing(e) => Some(e),
            DeskError::Export(e) => Some(e),
            DeskError::Config(e) => Some(e),
            DeskError::Storage(e) => Some(e),
            DeskError::Request(e) => Some(e),
            DeskError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl DeskError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeskError::Listing(e) => e.status_code(),
            DeskError::Export(ExportError::ArtifactMissing { .. }) => StatusCode::NOT_FOUND,
            DeskError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DeskError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DeskError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DeskError::Request(e) => e.status_code(),
            DeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DeskError::Listing(e) => e.error_code(),
            DeskError::Export(ExportError::ArtifactMissing { .. }) => "ARTIFACT_MISSING",
            DeskError::Export(_) => "EXPORT_ERROR",
            DeskError::Config(_) => "CONFIG_ERROR",
            DeskError::Storage(_) => "STORAGE_ERROR",
            DeskError::Request(e) => e.error_code(),
            DeskError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    ///
    /// Server-side failures are reported with a generic message; the
    /// detailed cause only goes to the logs.
    pub fn to_response(&self) -> ErrorResponse {
        let message = if self.status_code().is_server_error() {
            "Something went wrong, please try again later".to_string()
        } else {
            self.to_string()
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            DeskError::Listing(ListingError::ViewNotFound { view }) => {
                Some(serde_json::json!({ "view": view }))
            }
            DeskError::Listing(ListingError::ReportNotFound { id }) => {
                Some(serde_json::json!({ "report_id": id.to_string() }))
            }
            DeskError::Request(RequestError::InvalidQuery { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for DeskError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Listing Errors
// =============================================================================

/// Errors related to listing views and their report history
#[derive(Debug, Error)]
pub enum ListingError {
    /// No view registered under this identifier
    #[error("View '{view}' not found")]
    ViewNotFound { view: String },

    /// Report history entry missing or owned by another tenant
    #[error("Report '{id}' not found")]
    ReportNotFound { id: Uuid },
}

impl ListingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ListingError::ViewNotFound { .. } => StatusCode::NOT_FOUND,
            ListingError::ReportNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ListingError::ViewNotFound { .. } => "VIEW_NOT_FOUND",
            ListingError::ReportNotFound { .. } => "REPORT_NOT_FOUND",
        }
    }
}

impl From<ListingError> for DeskError {
    fn from(err: ListingError) -> Self {
        DeskError::Listing(err)
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors raised while producing an export artifact
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed
    #[error("Failed to write CSV: {message}")]
    Csv { message: String },

    /// The artifact path template could not be rendered
    #[error("Failed to render export path: {message}")]
    Template { message: String },

    /// A history record points at an artifact the sink no longer has
    #[error("Export artifact '{path}' is missing")]
    ArtifactMissing { path: String },
}

impl From<ExportError> for DeskError {
    fn from(err: ExportError) -> Self {
        DeskError::Export(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv {
            message: err.to_string(),
        }
    }
}

impl From<tera::Error> for ExportError {
    fn from(err: tera::Error) -> Self {
        ExportError::Template {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required configuration field
    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

impl From<ConfigError> for DeskError {
    fn from(err: ConfigError) -> Self {
        DeskError::Config(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// A lock guarding an in-memory store was poisoned
    #[error("Lock poisoned in {store}")]
    LockPoisoned { store: String },

    /// Filesystem failure
    #[error("Storage IO error: {message}")]
    Io { message: String },

    /// A path would escape the storage root
    #[error("Path '{path}' is outside the storage root")]
    PathOutsideRoot { path: String },
}

impl From<StorageError> for DeskError {
    fn from(err: StorageError) -> Self {
        DeskError::Storage(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// A header carried a malformed value
    #[error("Invalid value '{value}' for header {header}")]
    InvalidHeader { header: String, value: String },

    /// A query parameter failed validation
    #[error("Invalid query parameter '{field}': {message}")]
    InvalidQuery { field: String, message: String },

    /// No authenticated principal, or one without a tenant
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Principal lacks the required permission
    #[error("Forbidden: {message}")]
    Forbidden { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidHeader { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidHeader { .. } => "INVALID_HEADER",
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

impl From<RequestError> for DeskError {
    fn from(err: RequestError) -> Self {
        DeskError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<std::io::Error> for DeskError {
    fn from(err: std::io::Error) -> Self {
        DeskError::Storage(StorageError::Io {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for DeskError {
    fn from(err: serde_yaml::Error) -> Self {
        DeskError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        DeskError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for DeskError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        DeskError::Request(RequestError::InvalidQuery {
            field,
            message: err.to_string(),
        })
    }
}

/// Recover the typed error from an `anyhow::Error` raised by a service
impl From<anyhow::Error> for DeskError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<DeskError>() {
            Ok(desk) => return desk,
            Err(err) => err,
        };
        let err = match err.downcast::<RequestError>() {
            Ok(request) => return DeskError::Request(request),
            Err(err) => err,
        };
        let err = match err.downcast::<ListingError>() {
            Ok(listing) => return DeskError::Listing(listing),
            Err(err) => err,
        };
        let err = match err.downcast::<ExportError>() {
            Ok(export) => return DeskError::Export(export),
            Err(err) => err,
        };
        match err.downcast::<StorageError>() {
            Ok(storage) => DeskError::Storage(storage),
            Err(err) => DeskError::Internal(err.to_string()),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for creditdesk operations
pub type DeskResult<T> = Result<T, DeskError>;

// =============================================================================
// Tests
// =============================================================================
