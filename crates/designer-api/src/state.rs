//! Shared application state for the catalog API server.

use designer_catalog::Catalog;

use crate::config::ServiceConfig;
use crate::store::Store;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// Repositories over the configured store.
    pub catalog: Catalog<Store>,
    /// Effective configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Build the catalog around `store` with the options in `config`.
    pub fn new(store: Store, config: ServiceConfig) -> Self {
        Self {
            catalog: Catalog::new(store, config.catalog_options()),
            config,
        }
    }

    /// Page size for list endpoints when the request names none.
    pub const fn default_limit(&self) -> u64 {
        self.config.catalog.default_list_limit
    }
}
