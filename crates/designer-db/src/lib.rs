//! `MongoDB` document store for the Datacenter Designer catalog.
//!
//! Implements [`designer_catalog::DocumentStore`] over one database. The
//! catalog speaks plain JSON documents and store-agnostic filters; this
//! crate translates both to BSON.
//!
//! # Modules
//!
//! - [`config`] -- Connection settings
//! - [`convert`] -- Document and filter translation
//! - [`store`] -- The [`MongoStore`] handle
//! - [`error`] -- Driver error wrapping

pub mod config;
pub mod convert;
pub mod error;
pub mod store;

pub use config::MongoConfig;
pub use error::DbError;
pub use store::MongoStore;
