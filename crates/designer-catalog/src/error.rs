//! Error types for the catalog layer.
//!
//! Store failures travel upward unchanged as [`StoreError`]. Lookup misses
//! are not errors: repositories return `Option` for them. Malformed
//! identifiers never produce an error either; they only drop a step from
//! the lookup plan.

use crate::resolver::EntityKind;

/// Failures reported by a [`DocumentStore`](crate::store::DocumentStore).
///
/// The catalog never retries these.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A document could not be converted to or from the store format.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An atomic multi-document operation failed and was rolled back.
    #[error("transaction failed: {0}")]
    Transaction(String),
}

/// Errors surfaced by catalog repositories.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No document matched any lookup step.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind that was looked up.
        kind: EntityKind,
        /// Candidate identifier as supplied by the caller.
        id: String,
    },

    /// The caller supplied a payload the catalog cannot accept.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Two spec rows for one component derived the same field with
    /// different amounts (strict merge mode only).
    #[error("spec field {field} of {component} set to {previous} and {incoming}")]
    MergeFieldCollision {
        /// Component identifier being merged.
        component: String,
        /// Derived field name.
        field: String,
        /// Amount written by an earlier row.
        previous: i64,
        /// Amount written by the colliding row.
        incoming: i64,
    },

    /// The document store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// Build a [`CatalogError::NotFound`] for `kind` and `id`.
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_owned(),
        }
    }
}
