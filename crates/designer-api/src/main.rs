//! Catalog service entry point.
//!
//! Loads configuration, opens the configured document store, and serves
//! the catalog API until `Ctrl-C`.

use std::path::PathBuf;
use std::sync::Arc;

use designer_api::{AppState, ServiceConfig, Store, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "designer-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be parsed, the store
/// cannot be reached, or the server fails to bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("DESIGNER_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = ServiceConfig::load(&config_path)?;

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = %config_path.display(),
        backend = ?config.store.backend,
        database = config.store.database,
        strict_spec_merge = config.catalog.strict_spec_merge,
        keep_module_snapshots = config.catalog.keep_module_snapshots,
        "configuration loaded"
    );

    let store = Store::connect(&config.store).await?;
    info!(backend = store.backend(), "document store ready");

    let server = config.server.clone();
    let state = Arc::new(AppState::new(store, config));
    start_server(&server, state).await?;

    Ok(())
}
