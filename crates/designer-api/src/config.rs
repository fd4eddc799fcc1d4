//! Configuration loading and typed config structures for the catalog service.
//!
//! The service reads `designer-config.yaml` (or the file named by
//! `DESIGNER_CONFIG`). Every section and key is optional; anything missing
//! takes the default listed on the field. A handful of environment
//! variables override the file after parsing.

use std::path::Path;
use std::time::Duration;

use designer_catalog::{CatalogOptions, MergeMode, SnapshotPolicy};
use designer_db::MongoConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Document store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Catalog behaviour switches.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load `path` if it exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides.
    ///
    /// `MONGODB_URI`, `MONGODB_DB_NAME`, `DESIGNER_PORT` and
    /// `DESIGNER_STORE` take precedence over the file. An unparseable
    /// port or backend is ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MONGODB_URI") {
            self.store.uri = val;
        }
        if let Ok(val) = std::env::var("MONGODB_DB_NAME") {
            self.store.database = val;
        }
        if let Some(port) = std::env::var("DESIGNER_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.server.port = port;
        }
        if let Some(backend) = std::env::var("DESIGNER_STORE")
            .ok()
            .and_then(|val| StoreBackend::parse(&val))
        {
            self.store.backend = backend;
        }
    }

    /// Repository options derived from the catalog section.
    pub const fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            merge_mode: MergeMode::from_strict(self.catalog.strict_spec_merge),
            layout_snapshots: SnapshotPolicy::from_keep(self.catalog.keep_module_snapshots),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Which [`DocumentStore`](designer_catalog::DocumentStore) backs the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `MongoDB` at `store.uri`.
    #[default]
    Mongodb,
    /// Process-local store; data is lost on exit.
    Memory,
}

impl StoreBackend {
    /// Parse a backend name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Some(Self::Mongodb),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreBackend,

    /// `MongoDB` connection string.
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Database name.
    #[serde(default = "default_database")]
    pub database: String,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Maximum pooled connections.
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
}

impl StoreConfig {
    /// Driver settings for the `mongodb` backend.
    pub fn mongo(&self) -> MongoConfig {
        MongoConfig::new(&self.uri, &self.database)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_max_pool_size(self.max_pool_size)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: default_uri(),
            database: default_database(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_pool_size: default_max_pool_size(),
        }
    }
}

/// Catalog behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// Reject conflicting spec rows instead of letting the last one win.
    #[serde(default)]
    pub strict_spec_merge: bool,

    /// Keep a module snapshot next to each reference when a layout is saved.
    /// Off by default: layouts store `module_id` references only.
    #[serde(default)]
    pub keep_module_snapshots: bool,

    /// Page size for list endpoints when the request names none.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            strict_spec_merge: false,
            keep_module_snapshots: false,
            default_list_limit: default_list_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_owned()]
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_owned()
}

fn default_database() -> String {
    "datacenter_designer".to_owned()
}

const fn default_connect_timeout_ms() -> u64 {
    5000
}

const fn default_max_pool_size() -> u32 {
    10
}

const fn default_list_limit() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9100
  allowed_origins:
    - "http://localhost:5173"
    - "https://designer.example.com"

store:
  backend: memory
  uri: "mongodb://db:27017"
  database: "designer_test"
  connect_timeout_ms: 1500
  max_pool_size: 4

catalog:
  strict_spec_merge: true
  keep_module_snapshots: true
  default_list_limit: 25

logging:
  level: "debug"
"#;
        let config = ServiceConfig::parse(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.allowed_origins.len(), 2);
        assert_eq!(config.store.connect_timeout_ms, 1500);
        assert_eq!(config.store.max_pool_size, 4);
        assert!(config.catalog.strict_spec_merge);
        assert!(config.catalog.keep_module_snapshots);
        assert_eq!(config.catalog.default_list_limit, 25);
        assert_eq!(config.logging.level, "debug");

        let options = config.catalog_options();
        assert_eq!(options.merge_mode, MergeMode::Strict);
        assert_eq!(options.layout_snapshots, SnapshotPolicy::KeepSnapshot);

        let mongo = config.store.mongo();
        assert_eq!(mongo.connect_timeout, Duration::from_millis(1500));
        assert_eq!(mongo.max_pool_size, 4);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "catalog:\n  strict_spec_merge: true\n";
        let config = ServiceConfig::parse(yaml).unwrap();

        assert!(config.catalog.strict_spec_merge);
        // Everything else uses defaults
        assert!(!config.catalog.keep_module_snapshots);
        assert_eq!(
            config.catalog_options().layout_snapshots,
            SnapshotPolicy::ReferenceOnly
        );
        assert_eq!(config.catalog.default_list_limit, 100);
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_empty_yaml() {
        let config = ServiceConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn rejects_malformed_yaml() {
        let config = ServiceConfig::parse("server: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ServiceConfig::load(Path::new("/nonexistent/designer-config.yaml"));
        assert!(config.is_ok());
        let options = config.unwrap().catalog_options();
        assert_eq!(options, CatalogOptions::default());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("designer-config.yaml");
        if path.exists() {
            let config = ServiceConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load config: {config:?}");
            let config = config.unwrap();
            assert_eq!(config.catalog.default_list_limit, 100);
            assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000"]);
        }
    }

    #[test]
    fn backend_names() {
        assert_eq!(StoreBackend::parse("Memory"), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("mongo"), Some(StoreBackend::Mongodb));
        assert_eq!(StoreBackend::parse("redis"), None);
    }
}
