//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted and hide server-side causes
//! - Error conversions work correctly, including through `anyhow`
//! - Service failures surface as typed errors

use axum::http::StatusCode;
use axum::response::IntoResponse;
use creditdesk::core::error::{
    ConfigError, ExportError, ListingError, RequestError, StorageError,
};
use creditdesk::prelude::*;
use std::sync::Arc;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_view_not_found_returns_404() {
        let err = DeskError::Listing(ListingError::ViewNotFound {
            view: "recalls".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_report_not_found_returns_404() {
        let err = DeskError::Listing(ListingError::ReportNotFound { id: Uuid::new_v4() });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_artifact_returns_404() {
        let err = DeskError::Export(ExportError::ArtifactMissing {
            path: "download-report/x.csv".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_csv_failure_returns_500() {
        let err = DeskError::Export(ExportError::Csv {
            message: "disk full".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_request_errors() {
        let cases = [
            (
                RequestError::InvalidHeader {
                    header: "x-tenant-id".to_string(),
                    value: "nope".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RequestError::InvalidQuery {
                    field: "limit".to_string(),
                    message: "too large".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RequestError::Unauthorized {
                    message: "no tenant".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                RequestError::Forbidden {
                    message: "not allowed".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(DeskError::Request(err).status_code(), status);
        }
    }

    #[test]
    fn test_storage_and_config_errors_return_500() {
        let storage = DeskError::Storage(StorageError::LockPoisoned {
            store: "report history".to_string(),
        });
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let config = DeskError::Config(ConfigError::ParseError {
            file: Some("desk.yaml".to_string()),
            message: "invalid syntax".to_string(),
        });
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Response Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_view_not_found_details() {
        let err = DeskError::Listing(ListingError::ViewNotFound {
            view: "recalls".to_string(),
        });
        let response = err.to_response();

        assert_eq!(response.code, "VIEW_NOT_FOUND");
        assert!(response.message.contains("recalls"));
        assert_eq!(response.details.unwrap()["view"], "recalls");
    }

    #[test]
    fn test_server_errors_hide_their_cause() {
        let err = DeskError::Storage(StorageError::Io {
            message: "/var/exports: permission denied".to_string(),
        });
        let response = err.to_response();

        assert_eq!(response.code, "STORAGE_ERROR");
        assert!(!response.message.contains("permission denied"));
        assert!(response.details.is_none());
    }

    #[test]
    fn test_invalid_query_names_the_field() {
        let err = DeskError::Request(RequestError::InvalidQuery {
            field: "limit".to_string(),
            message: "too large".to_string(),
        });
        assert_eq!(err.to_response().details.unwrap()["field"], "limit");
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_anyhow_keeps_typed_errors() {
        let err: anyhow::Error = RequestError::Unauthorized {
            message: "no tenant".to_string(),
        }
        .into();
        assert!(matches!(
            DeskError::from(err),
            DeskError::Request(RequestError::Unauthorized { .. })
        ));

        let err: anyhow::Error = ListingError::ReportNotFound { id: Uuid::new_v4() }.into();
        assert!(matches!(
            DeskError::from(err),
            DeskError::Listing(ListingError::ReportNotFound { .. })
        ));

        let err: anyhow::Error = StorageError::PathOutsideRoot {
            path: "../x".to_string(),
        }
        .into();
        assert!(matches!(DeskError::from(err), DeskError::Storage(_)));
    }

    #[test]
    fn test_anyhow_falls_back_to_internal() {
        let err = DeskError::from(anyhow::anyhow!("boom"));
        assert!(matches!(err, DeskError::Internal(ref message) if message == "boom"));
    }

    #[test]
    fn test_serde_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: DeskError = json_err.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_yaml_error_converts_to_config_error() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [b").unwrap_err();
        let err: DeskError = yaml_err.into();
        assert!(matches!(err, DeskError::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_io_error_converts_to_storage_error() {
        let io_err = std::io::Error::other("disk gone");
        let err: DeskError = io_err.into();
        assert!(matches!(err, DeskError::Storage(StorageError::Io { .. })));
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[test]
    fn test_desk_error_into_response_status() {
        let response = DeskError::Listing(ListingError::ViewNotFound {
            view: "recalls".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unauthorized_into_response_status() {
        let response = DeskError::Request(RequestError::Unauthorized {
            message: "no tenant".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

// =============================================================================
// Archive Error Tests
// =============================================================================

mod archive_error_tests {
    use super::*;
    use creditdesk::core::export::ReportHistoryRecord;

    fn record(tenant_id: Uuid, path: &str) -> ReportHistoryRecord {
        ReportHistoryRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tenant_id,
            subclient_id: None,
            report_type: "Payments".to_string(),
            record_count: 2,
            date_range: DateRange::default(),
            filename: "payments_20240101000000_abcd1234.csv".to_string(),
            path: path.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unknown_report_is_typed() {
        let archive = ReportArchive::new(
            Arc::new(InMemoryArtifactSink::new()),
            Arc::new(InMemoryReportHistoryStore::new()),
        );
        let err = archive
            .redownload(&Uuid::new_v4(), None, &Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(
            DeskError::from(err).error_code(),
            "REPORT_NOT_FOUND"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_typed() {
        let history = InMemoryReportHistoryStore::new();
        let tenant = Uuid::new_v4();
        let stored = history
            .record(record(tenant, "download-report/payments/gone.csv"))
            .await
            .unwrap();
        let archive = ReportArchive::new(Arc::new(InMemoryArtifactSink::new()), Arc::new(history));

        let err = archive.redownload(&tenant, None, &stored.id).await.unwrap_err();
        let err = DeskError::from(err);
        assert_eq!(err.error_code(), "ARTIFACT_MISSING");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_other_subclient_report_is_not_found() {
        let history = InMemoryReportHistoryStore::new();
        let sink = InMemoryArtifactSink::new();
        let tenant = Uuid::new_v4();
        let path = "download-report/payments/a.csv";
        sink.put(path, b"h\n1\n").await.unwrap();
        let mut owned = record(tenant, path);
        owned.subclient_id = Some(Uuid::new_v4());
        let stored = history.record(owned).await.unwrap();
        let archive = ReportArchive::new(Arc::new(sink), Arc::new(history));

        let other = Uuid::new_v4();
        assert!(archive.redownload(&tenant, Some(&other), &stored.id).await.is_err());
        assert!(archive.redownload(&tenant, None, &stored.id).await.is_ok());
    }
}
