//! Shared record types for the Datacenter Designer catalog.
//!
//! This crate is the single source of truth for the canonical shapes the
//! catalog hands to its callers. Types flow downstream to `TypeScript` via
//! `ts-rs` for the designer frontend.
//!
//! # Modules
//!
//! - [`enums`] -- Closed value sets (style focus)
//! - [`records`] -- Canonical entity records (modules, styles, specs, placement)

pub mod enums;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use enums::Focus;
pub use records::{
    CompositeDatacenterSpec, Coordinates, DEFAULT_DATACENTER_DIM, Datacenter, DatacenterStyle, Dim,
    Module, PlacedModule, Position, RawDatacenterSpec, Resources,
};
