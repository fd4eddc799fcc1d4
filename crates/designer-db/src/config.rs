//! `MongoDB` connection settings.

use std::time::Duration;

/// Default maximum number of pooled connections.
const DEFAULT_MAX_POOL_SIZE: u32 = 10;

/// Default connection timeout in milliseconds.
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Application name reported to the server.
const APP_NAME: &str = "datacenter-designer";

/// Configuration for the `MongoDB` client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    /// Connection string.
    ///
    /// Format: `mongodb://host:port` or `mongodb+srv://...`
    pub uri: String,
    /// Database holding the catalog collections.
    pub database: String,
    /// Connection and server selection timeout.
    pub connect_timeout: Duration,
    /// Maximum number of pooled connections.
    pub max_pool_size: u32,
    /// Name the client reports to the server.
    pub app_name: String,
}

impl MongoConfig {
    /// Create a configuration from a connection string and database name.
    pub fn new(uri: &str, database: &str) -> Self {
        Self {
            uri: uri.to_owned(),
            database: database.to_owned(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            app_name: APP_NAME.to_owned(),
        }
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum pool size.
    #[must_use]
    pub const fn with_max_pool_size(mut self, max: u32) -> Self {
        self.max_pool_size = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = MongoConfig::new("mongodb://localhost:27017", "designer")
            .with_connect_timeout(Duration::from_millis(250))
            .with_max_pool_size(3);
        assert_eq!(config.database, "designer");
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.max_pool_size, 3);
        assert_eq!(config.app_name, APP_NAME);
    }
}
