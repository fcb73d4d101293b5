//! Configuration loading and management
//!
//! A YAML file can declare whole views or override the defaults of the
//! built-in ones:
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! export:
//!   root_dir: ./exports
//! views:
//!   - identifier: payments
//!     page_size: 50
//!     default_column: amount
//!     export_policy: "role:manager"
//! ```

use crate::core::auth::AuthPolicy;
use crate::core::error::ConfigError;
use crate::core::export::{ArtifactNamer, DEFAULT_PATH_TEMPLATE};
use crate::core::view::{ColumnMap, ExportColumn, ViewDefinition};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use validator::Validate;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "server.host".to_string(),
                value: self.host.clone(),
                message: e.to_string(),
            })
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Tera template of the artifact storage path
    #[serde(default = "default_path_template")]
    pub path_template: String,

    /// Directory artifacts are written to; in memory when absent
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
}

fn default_path_template() -> String {
    DEFAULT_PATH_TEMPLATE.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path_template: default_path_template(),
            root_dir: None,
        }
    }
}

impl ExportConfig {
    pub fn namer(&self) -> Result<ArtifactNamer, ConfigError> {
        ArtifactNamer::new(&self.path_template).map_err(|e| ConfigError::InvalidValue {
            field: "export.path_template".to_string(),
            value: self.path_template.clone(),
            message: e.to_string(),
        })
    }
}

/// One logical → physical column entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub logical: String,
    pub physical: String,
}

/// Declaration of, or overrides for, one view
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ViewConfig {
    #[validate(length(min = 1))]
    pub identifier: String,

    #[serde(default)]
    pub report_type: Option<String>,

    #[serde(default)]
    pub default_column: Option<String>,

    #[serde(default)]
    pub default_ascending: Option<bool>,

    #[serde(default)]
    pub persist_to_url: Option<bool>,

    #[serde(default)]
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<usize>,

    #[serde(default)]
    pub record_history: Option<bool>,

    /// Policy string, see [`AuthPolicy::parse_policy`]
    #[serde(default)]
    pub list_policy: Option<String>,

    #[serde(default)]
    pub export_policy: Option<String>,

    #[serde(default)]
    pub columns: Vec<ColumnConfig>,

    /// Physical keys searched by the free-text term
    #[serde(default)]
    pub search: Vec<String>,

    #[serde(default)]
    pub export: Vec<ExportColumn>,
}

impl ViewConfig {
    /// Build a complete view from this declaration
    pub fn into_definition(self) -> Result<ViewDefinition, ConfigError> {
        self.validate().map_err(|e| ConfigError::InvalidValue {
            field: "views".to_string(),
            value: self.identifier.clone(),
            message: e.to_string(),
        })?;

        let Some(first) = self.columns.first() else {
            return Err(ConfigError::MissingField {
                field: "columns".to_string(),
                context: format!("view '{}'", self.identifier),
            });
        };
        let default_logical = self
            .default_column
            .clone()
            .unwrap_or_else(|| first.logical.clone());
        let Some(default_entry) = self.columns.iter().find(|c| c.logical == default_logical)
        else {
            return Err(ConfigError::InvalidValue {
                field: "default_column".to_string(),
                value: default_logical,
                message: format!("not a column of view '{}'", self.identifier),
            });
        };

        let columns = self.columns.iter().fold(
            ColumnMap::new(&default_entry.logical, &default_entry.physical),
            |map, c| map.with(&c.logical, &c.physical),
        );

        let mut view = ViewDefinition::new(self.identifier.clone(), columns)
            .search_on(self.search.clone());
        view.export_columns = self.export.clone();
        Ok(self.apply_to(view))
    }

    /// Apply the overrides present in this config to `view`
    ///
    /// A default column the view does not know is ignored with a warning.
    pub fn apply_to(&self, mut view: ViewDefinition) -> ViewDefinition {
        if let Some(report_type) = &self.report_type {
            view.report_type = report_type.clone();
        }
        if let Some(column) = &self.default_column {
            if view.columns.contains(column) {
                let physical = view.columns.resolve(column).to_string();
                let mut columns = ColumnMap::new(column, physical);
                for logical in view.columns.logical_columns() {
                    columns = columns.with(logical, view.columns.resolve(logical));
                }
                view.columns = columns;
            } else {
                tracing::warn!(
                    view = %view.identifier,
                    column = %column,
                    "ignoring unknown default column"
                );
            }
        }
        if let Some(ascending) = self.default_ascending {
            view.default_ascending = ascending;
        }
        if let Some(persist) = self.persist_to_url {
            view.persist_to_url = persist;
        }
        if let Some(page_size) = self.page_size {
            view = view.page_size(page_size);
        }
        if let Some(record) = self.record_history {
            view.record_history = record;
        }
        if let Some(policy) = &self.list_policy {
            view.list_policy = AuthPolicy::parse_policy(policy);
        }
        if let Some(policy) = &self.export_policy {
            view.export_policy = AuthPolicy::parse_policy(policy);
        }
        view
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

impl DeskConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Find the config entry of a view
    pub fn view(&self, identifier: &str) -> Option<&ViewConfig> {
        self.views.iter().find(|v| v.identifier == identifier)
    }

    /// Apply configured overrides to a built-in view
    pub fn apply_overrides(&self, view: ViewDefinition) -> ViewDefinition {
        match self.view(&view.identifier) {
            Some(config) => config.apply_to(view),
            None => view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
server:
  port: 8088
views:
  - identifier: recalls
    report_type: Recalled Accounts
    default_column: date
    page_size: 15
    export_policy: "role:manager"
    columns:
      - logical: consumer-name
        physical: consumer_name
      - logical: date
        physical: recalled_on
    search: [consumer_name]
    export:
      - header: Consumer
        key: consumer_name
      - header: Recalled On
        key: recalled_on
  - identifier: payments
    page_size: 50
    default_ascending: true
"#;

    #[test]
    fn test_parse_yaml() {
        let config = DeskConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.export.path_template, DEFAULT_PATH_TEMPLATE);
        assert_eq!(config.views.len(), 2);
    }

    #[test]
    fn test_into_definition() {
        let config = DeskConfig::from_yaml_str(YAML).unwrap();
        let view = config.view("recalls").unwrap().clone().into_definition().unwrap();

        assert_eq!(view.report_type, "Recalled Accounts");
        assert_eq!(view.columns.default_column(), "date");
        assert_eq!(view.columns.resolve("date"), "recalled_on");
        assert_eq!(view.columns.resolve("consumer-name"), "consumer_name");
        assert_eq!(view.page_size, 15);
        assert_eq!(view.export_columns.len(), 2);
        assert!(matches!(view.export_policy, AuthPolicy::HasRole(_)));
    }

    #[test]
    fn test_into_definition_requires_columns() {
        let config = DeskConfig::from_yaml_str(YAML).unwrap();
        let err = config
            .view("payments")
            .unwrap()
            .clone()
            .into_definition()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }

    #[test]
    fn test_into_definition_rejects_unknown_default() {
        let mut view = DeskConfig::from_yaml_str(YAML).unwrap().views.remove(0);
        view.default_column = Some("ghost".to_string());
        assert!(matches!(
            view.into_definition(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_into_definition_validates_page_size() {
        let mut view = DeskConfig::from_yaml_str(YAML).unwrap().views.remove(0);
        view.page_size = Some(1000);
        assert!(view.into_definition().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let config = DeskConfig::from_yaml_str(YAML).unwrap();
        let builtin = ViewDefinition::new(
            "payments",
            ColumnMap::new("date", "scheduled_on").with("amount", "amount"),
        );
        let view = config.apply_overrides(builtin);
        assert_eq!(view.page_size, 50);
        assert!(view.default_ascending);

        let untouched = config.apply_overrides(ViewDefinition::new(
            "disputes",
            ColumnMap::new("date", "disputed_on"),
        ));
        assert_eq!(untouched.page_size, crate::core::view::DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_override_default_column_keeps_mapping() {
        let override_only = ViewConfig {
            identifier: "payments".to_string(),
            report_type: None,
            default_column: Some("amount".to_string()),
            default_ascending: None,
            persist_to_url: None,
            page_size: None,
            record_history: None,
            list_policy: None,
            export_policy: None,
            columns: Vec::new(),
            search: Vec::new(),
            export: Vec::new(),
        };
        let view = override_only.apply_to(ViewDefinition::new(
            "payments",
            ColumnMap::new("date", "scheduled_on").with("amount", "amount"),
        ));
        assert_eq!(view.columns.default_column(), "amount");
        assert_eq!(view.columns.resolve("date"), "scheduled_on");
        assert_eq!(view.columns.len(), 2);
    }

    #[test]
    fn test_yaml_serialization() {
        let config = DeskConfig::from_yaml_str(YAML).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = DeskConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.views.len(), config.views.len());
        assert_eq!(parsed.server.port, config.server.port);
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig::default();
        assert_eq!(server.socket_addr().unwrap().port(), 3000);

        let bad = ServerConfig {
            host: "not a host".to_string(),
            port: 1,
        };
        assert!(bad.socket_addr().is_err());
    }
}
