use designer_types::{Coordinates, PlacedModule};
use serde_json::{Value, json};

use super::EntityAccess;
use crate::document::Document;
use crate::error::CatalogError;
use crate::filter::Filter;
use crate::reference::{ModuleReferenceResolver, SnapshotPolicy, prepare_write};
use crate::resolver::EntityKind;
use crate::store::{DocumentStore, FindOptions};

/// Operations on the `placed_modules` collection.
///
/// Every read runs through the [`ModuleReferenceResolver`], so returned
/// placed modules carry their module when it still exists.
pub struct PlacedModuleRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> PlacedModuleRepository<'a, S> {
    /// Create a repository bound to a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn access(&self) -> EntityAccess<'a, S> {
        EntityAccess::new(self.store, EntityKind::PlacedModule)
    }

    async fn populate(&self, doc: Option<Document>) -> Result<Option<PlacedModule>, CatalogError> {
        match doc {
            Some(doc) => Ok(Some(ModuleReferenceResolver::new(self.store).resolve(&doc).await?)),
            None => Ok(None),
        }
    }

    async fn populate_all(&self, docs: &[Document]) -> Result<Vec<PlacedModule>, CatalogError> {
        Ok(ModuleReferenceResolver::new(self.store)
            .resolve_all(docs)
            .await?)
    }

    /// Insert one placed module. An embedded module is stored as a
    /// reference, plus the snapshot when `policy` keeps it.
    pub async fn create(
        &self,
        payload: Document,
        policy: SnapshotPolicy,
    ) -> Result<PlacedModule, CatalogError> {
        let stored = self.access().insert(prepare_write(payload, policy)).await?;
        Ok(ModuleReferenceResolver::new(self.store).resolve(&stored).await?)
    }

    /// Look a placed module up by native or application id.
    pub async fn get(&self, id: &str) -> Result<Option<PlacedModule>, CatalogError> {
        let doc = self.access().get(id).await?;
        self.populate(doc).await
    }

    /// All placed modules, paged.
    pub async fn list(&self, options: FindOptions) -> Result<Vec<PlacedModule>, CatalogError> {
        let docs = self.access().find(&Filter::All, options).await?;
        self.populate_all(&docs).await
    }

    /// Placed modules stamped with `datacenter_id`.
    pub async fn list_by_datacenter(
        &self,
        datacenter_id: &str,
    ) -> Result<Vec<PlacedModule>, CatalogError> {
        let docs = self
            .access()
            .find(&Filter::eq("datacenter_id", datacenter_id), FindOptions::default())
            .await?;
        self.populate_all(&docs).await
    }

    /// Overwrite fields. An embedded module becomes a reference.
    ///
    /// A new `module_id` clears any stored snapshot, so reads follow the
    /// reference instead of returning the old module.
    pub async fn update(
        &self,
        id: &str,
        fields: Document,
    ) -> Result<Option<PlacedModule>, CatalogError> {
        let mut fields = prepare_write(fields, SnapshotPolicy::ReferenceOnly);
        if fields.contains_key("module_id") {
            fields.insert("module".to_owned(), Value::Null);
        }
        let doc = self.access().update(id, fields).await?;
        self.populate(doc).await
    }

    /// Move a placed module, turning it too when `rotation` is given.
    pub async fn update_position(
        &self,
        id: &str,
        position: Coordinates,
        rotation: Option<i64>,
    ) -> Result<Option<PlacedModule>, CatalogError> {
        let mut fields = Document::new();
        fields.insert(
            "position".to_owned(),
            json!({"x": position.x, "y": position.y}),
        );
        if let Some(rotation) = rotation {
            fields.insert("rotation".to_owned(), Value::from(rotation));
        }
        let doc = self.access().update(id, fields).await?;
        self.populate(doc).await
    }

    /// Delete one placed module. `false` when it does not exist.
    pub async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        self.access().delete(id).await
    }

    /// Delete every placed module stamped with `datacenter_id`.
    pub async fn delete_by_datacenter(&self, datacenter_id: &str) -> Result<u64, CatalogError> {
        self.access()
            .delete_many(&Filter::eq("datacenter_id", datacenter_id))
            .await
    }

    /// Insert many placed modules, embedded modules stored as references.
    pub async fn bulk_create(&self, payloads: Vec<Document>) -> Result<Vec<String>, CatalogError> {
        let docs = payloads
            .into_iter()
            .map(|payload| prepare_write(payload, SnapshotPolicy::ReferenceOnly))
            .collect();
        self.access().insert_many(docs).await
    }
}

/// Stamp the owning datacenter onto a placed-module payload.
pub(crate) fn owned_by(mut payload: Document, datacenter_id: &str) -> Document {
    payload.insert(
        "datacenter_id".to_owned(),
        Value::String(datacenter_id.to_owned()),
    );
    payload
}
