//! Catalog core for the Datacenter Designer.
//!
//! Documents arrive in two field-naming generations and are addressed by
//! several kinds of identifier. This crate turns them into the canonical
//! records of [`designer_types`]:
//!
//! - [`resolver`] -- Ordered lookup plans over a collection's key spaces
//! - [`normalize`] -- Static rule tables folding legacy and modern fields
//! - [`merge`] -- Unit-scoped spec rows folded into composite specs
//! - [`reference`] -- Embedded vs. referenced modules inside placements
//! - [`repository`] -- One repository per entity kind over a [`DocumentStore`]
//! - [`import`] -- Bulk import row parsers
//!
//! The store itself sits behind the [`DocumentStore`] trait; [`MemoryStore`]
//! backs tests and local runs.

pub mod document;
pub mod error;
pub mod filter;
pub mod import;
pub mod memory;
pub mod merge;
pub mod normalize;
pub mod reference;
pub mod repository;
pub mod resolver;
pub mod store;

pub use document::Document;
pub use error::{CatalogError, StoreError};
pub use filter::Filter;
pub use import::ImportOutcome;
pub use memory::MemoryStore;
pub use merge::{CompositeSpecMerger, MergeMode};
pub use reference::{ModuleReferenceResolver, SnapshotPolicy};
pub use repository::{
    Catalog, CatalogOptions, CreatedDatacenter, DatacenterPage, DatacenterRepository,
    DeletedDatacenter, LayoutRequest, ModulePlacement, ModuleRepository, PlacedModuleRepository,
    PositionRepository, SpecRepository, StyleRepository,
};
pub use resolver::{EntityKind, IdentifierResolver};
pub use store::{Collection, DocumentStore, FindOptions, ReplaceOutcome, UpdateOutcome};
