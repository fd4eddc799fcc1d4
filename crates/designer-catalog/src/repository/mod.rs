//! Entity repositories.
//!
//! One repository per entity kind, each borrowing the store handle it is
//! constructed with. Lookups go through the [`IdentifierResolver`]; reads
//! come back as canonical records. A miss is `Ok(None)` (or `false` for
//! deletes); only store failures and rejected payloads are errors.
//!
//! [`Catalog`] owns one store handle and hands out repositories bound to it.

mod datacenter;
mod module;
mod placed_module;
mod position;
mod spec;
mod style;

pub use datacenter::{
    CreatedDatacenter, DatacenterPage, DatacenterRepository, DeletedDatacenter, LayoutRequest,
    ModulePlacement,
};
pub use module::ModuleRepository;
pub use placed_module::PlacedModuleRepository;
pub use position::PositionRepository;
pub use spec::SpecRepository;
pub use style::StyleRepository;

use crate::document::{Document, NATIVE_ID};
use crate::error::CatalogError;
use crate::filter::Filter;
use crate::merge::{CompositeSpecMerger, MergeMode};
use crate::reference::SnapshotPolicy;
use crate::resolver::{EntityKind, IdentifierResolver, Resolution};
use crate::store::{DocumentStore, FindOptions};

/// Behaviour switches shared by the repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Collision policy for composite spec merges.
    pub merge_mode: MergeMode,
    /// Whether layout saves keep module snapshots next to references.
    pub layout_snapshots: SnapshotPolicy,
}

/// The six repositories around one store handle.
#[derive(Debug, Clone)]
pub struct Catalog<S> {
    store: S,
    options: CatalogOptions,
}

impl<S: DocumentStore> Catalog<S> {
    /// Wrap a store.
    pub const fn new(store: S, options: CatalogOptions) -> Self {
        Self { store, options }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Options in effect.
    pub const fn options(&self) -> CatalogOptions {
        self.options
    }

    /// Module repository.
    pub const fn modules(&self) -> ModuleRepository<'_, S> {
        ModuleRepository::new(&self.store)
    }

    /// Datacenter style repository.
    pub const fn styles(&self) -> StyleRepository<'_, S> {
        StyleRepository::new(&self.store)
    }

    /// Datacenter spec repository.
    pub const fn specs(&self) -> SpecRepository<'_, S> {
        SpecRepository::new(&self.store, CompositeSpecMerger::new(self.options.merge_mode))
    }

    /// Datacenter repository.
    pub const fn datacenters(&self) -> DatacenterRepository<'_, S> {
        DatacenterRepository::new(&self.store, self.options.layout_snapshots)
    }

    /// Placed module repository.
    pub const fn placed_modules(&self) -> PlacedModuleRepository<'_, S> {
        PlacedModuleRepository::new(&self.store)
    }

    /// Position repository.
    pub const fn positions(&self) -> PositionRepository<'_, S> {
        PositionRepository::new(&self.store)
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

/// Resolve-then-act helpers common to every repository.
pub(crate) struct EntityAccess<'a, S> {
    store: &'a S,
    kind: EntityKind,
}

impl<'a, S: DocumentStore> EntityAccess<'a, S> {
    pub(crate) const fn new(store: &'a S, kind: EntityKind) -> Self {
        Self { store, kind }
    }

    pub(crate) async fn resolve(&self, id: &str) -> Result<Option<Resolution>, CatalogError> {
        Ok(IdentifierResolver::new(self.store).resolve(self.kind, id).await?)
    }

    pub(crate) async fn get(&self, id: &str) -> Result<Option<Document>, CatalogError> {
        Ok(self.resolve(id).await?.map(|hit| hit.document))
    }

    pub(crate) async fn find(
        &self,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, CatalogError> {
        Ok(self
            .store
            .find(self.kind.collection(), filter, options)
            .await?)
    }

    /// Insert and read the stored document back.
    pub(crate) async fn insert(&self, doc: Document) -> Result<Document, CatalogError> {
        let collection = self.kind.collection();
        let id = self.store.insert_one(collection, without_native_id(doc)).await?;
        tracing::debug!(%collection, id = %id, "document inserted");
        self.store
            .find_one(collection, &Filter::ObjectId(id.clone()))
            .await?
            .ok_or_else(|| CatalogError::not_found(self.kind, &id))
    }

    pub(crate) async fn insert_many(
        &self,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, CatalogError> {
        let collection = self.kind.collection();
        let docs: Vec<Document> = docs.into_iter().map(without_native_id).collect();
        let ids = self.store.insert_many(collection, docs).await?;
        tracing::info!(%collection, count = ids.len(), "bulk insert");
        Ok(ids)
    }

    /// Overwrite `fields` on the resolved document and read it back.
    pub(crate) async fn update(
        &self,
        id: &str,
        fields: Document,
    ) -> Result<Option<Document>, CatalogError> {
        let Some(hit) = self.resolve(id).await? else {
            return Ok(None);
        };
        let collection = self.kind.collection();
        let filter = hit.filter();
        let outcome = self
            .store
            .update_one(collection, &filter, without_native_id(fields))
            .await?;
        tracing::debug!(
            %collection,
            id,
            matched = outcome.matched,
            modified = outcome.modified,
            "document updated"
        );
        Ok(self.store.find_one(collection, &filter).await?)
    }

    pub(crate) async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        let Some(hit) = self.resolve(id).await? else {
            return Ok(false);
        };
        let deleted = self
            .store
            .delete_one(self.kind.collection(), &hit.filter())
            .await?;
        Ok(deleted > 0)
    }

    pub(crate) async fn delete_many(&self, filter: &Filter) -> Result<u64, CatalogError> {
        let collection = self.kind.collection();
        let deleted = self.store.delete_many(collection, filter).await?;
        tracing::info!(%collection, deleted, filter = %filter.describe(), "documents deleted");
        Ok(deleted)
    }
}

/// Callers never choose native ids.
pub(crate) fn without_native_id(mut doc: Document) -> Document {
    doc.remove(NATIVE_ID);
    doc
}

/// Every identifier a stored document may be referred to by: its native id
/// and its application id.
pub(crate) fn aliases(doc: &Document) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(2);
    for id in [
        crate::document::native_id(doc),
        crate::document::application_id(doc),
    ]
    .into_iter()
    .flatten()
    {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// `field` equals any of `ids`.
pub(crate) fn any_of(field: &str, ids: &[String]) -> Filter {
    Filter::Or(ids.iter().map(|id| Filter::eq(field, id.as_str())).collect())
}
