//! The document store seam.
//!
//! Repositories talk to storage only through [`DocumentStore`]. The trait
//! uses return-position `impl Future` so implementations can write plain
//! `async fn`s while callers still get `Send` futures; dispatch between
//! concrete stores is static (generics or an enum), never `dyn`.

use std::future::Future;

use crate::document::Document;
use crate::error::StoreError;
use crate::filter::Filter;

/// The collections the catalog uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Hardware modules.
    Modules,
    /// Datacenter styles.
    DatacenterStyles,
    /// Unit-scoped datacenter spec rows.
    DatacenterSpecs,
    /// Datacenter designs.
    Datacenters,
    /// Modules placed inside datacenters.
    PlacedModules,
    /// Standalone labelled positions.
    Positions,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Self; 6] = [
        Self::Modules,
        Self::DatacenterStyles,
        Self::DatacenterSpecs,
        Self::Datacenters,
        Self::PlacedModules,
        Self::Positions,
    ];

    /// Collection name in the store.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Modules => "modules",
            Self::DatacenterStyles => "datacenter_styles",
            Self::DatacenterSpecs => "datacenter_specs",
            Self::Datacenters => "datacenters",
            Self::PlacedModules => "placed_modules",
            Self::Positions => "positions",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Paging for [`DocumentStore::find`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
    /// Number of matching documents to skip first.
    pub skip: Option<u64>,
}

impl FindOptions {
    /// Return at most `limit` documents.
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `skip` matching documents.
    #[must_use]
    pub const fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }
}

/// Result of [`DocumentStore::update_one`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents matched by the filter (0 or 1).
    pub matched: u64,
    /// Documents whose content actually changed (0 or 1).
    pub modified: u64,
}

/// Result of [`DocumentStore::replace_many`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Documents removed.
    pub deleted: u64,
    /// Identifiers of the inserted documents, in input order.
    pub inserted: Vec<String>,
}

/// Generic collection-oriented document store.
///
/// Documents use the conventions of [`crate::document`]: the native id is a
/// hex string under `_id`. Inserting a document without `_id` assigns a new
/// one. Updates overwrite whole fields; there is no nested patching.
pub trait DocumentStore: Send + Sync {
    /// First document matching `filter`, in natural order.
    fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// All documents matching `filter`, in natural order.
    fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Number of documents matching `filter`.
    fn count(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Insert one document and return its native id.
    fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Insert documents and return their native ids in input order.
    ///
    /// Inserting nothing is a no-op that returns an empty list.
    fn insert_many(
        &self,
        collection: Collection,
        docs: Vec<Document>,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Overwrite `fields` on the first document matching `filter`.
    fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Document,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send;

    /// Delete the first document matching `filter`; returns the count removed.
    fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Delete every document matching `filter`; returns the count removed.
    fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Atomically delete every document matching `filter` and insert `docs`.
    ///
    /// Concurrent readers observe either the old set or the new set, never
    /// an empty intermediate state.
    fn replace_many(
        &self,
        collection: Collection,
        filter: &Filter,
        docs: Vec<Document>,
    ) -> impl Future<Output = Result<ReplaceOutcome, StoreError>> + Send;
}
