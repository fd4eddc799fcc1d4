//! Schema normalization.
//!
//! Pure functions from stored documents of either naming generation to the
//! canonical records of `designer-types`. Nothing here touches a store and
//! nothing here fails on malformed input: unreadable fields are absent.
//!
//! Module, style and spec rows are driven by static rule tables (see
//! [`rules`]); placement records have fixed shapes and are read directly.
//!
//! Normalization is idempotent: feeding a canonical record (serialized back
//! into a document) through [`normalize`] returns it unchanged.

mod module;
mod placement;
pub mod rules;
mod spec;
mod style;

pub use module::{MODULE_RULES, module};
pub use placement::{datacenter, parse_timestamp, placed_module, position};
pub use spec::{SPEC_RULES, spec};
pub use style::{STYLE_RULES, style};

use crate::document::{Document, to_document};
use crate::resolver::EntityKind;

/// Normalize `raw` as `kind` and return the canonical record as a document.
pub fn normalize(kind: EntityKind, raw: &Document) -> Result<Document, serde_json::Error> {
    match kind {
        EntityKind::Module => to_document(&module(raw)),
        EntityKind::Style => to_document(&style(raw)),
        EntityKind::Spec => to_document(&spec(raw)),
        EntityKind::Datacenter => to_document(&datacenter(raw)),
        EntityKind::PlacedModule => to_document(&placed_module(raw)),
        EntityKind::Position => to_document(&position(raw)),
    }
}
