//! HTTP API server for the Datacenter Designer catalog.
//!
//! A thin Axum layer over [`designer_catalog`]: every route pulls raw
//! identifiers and payloads out of the request and hands them to one
//! repository operation.
//!
//! # Modules
//!
//! - [`config`] -- YAML service configuration with environment overrides
//! - [`error`] -- API error type with HTTP status mapping
//! - [`store`] -- Store backend chosen at startup
//! - [`state`] -- Shared application state
//! - [`handlers`] -- Endpoint handlers, one module per resource
//! - [`router`] -- Axum router construction
//! - [`server`] -- Server startup

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod store;

pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
pub use store::Store;
