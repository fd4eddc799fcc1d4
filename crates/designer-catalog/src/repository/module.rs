use designer_types::Module;
use serde_json::Value;

use super::EntityAccess;
use crate::document::{self, Document};
use crate::error::CatalogError;
use crate::filter::Filter;
use crate::normalize;
use crate::resolver::EntityKind;
use crate::store::{Collection, DocumentStore, FindOptions};

/// Operations on the `modules` collection.
pub struct ModuleRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> ModuleRepository<'a, S> {
    /// Create a repository bound to a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn access(&self) -> EntityAccess<'a, S> {
        EntityAccess::new(self.store, EntityKind::Module)
    }

    /// Insert one module.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] when the payload's `id` already
    /// names a module.
    pub async fn create(&self, payload: Document) -> Result<Module, CatalogError> {
        if let Some(id) = document::application_id(&payload) {
            if self.access().resolve(&id).await?.is_some() {
                return Err(CatalogError::Invalid(format!("module {id} already exists")));
            }
        }
        let stored = self.access().insert(payload).await?;
        Ok(normalize::module(&stored))
    }

    /// Look a module up under any of its identifiers.
    pub async fn get(&self, id: &str) -> Result<Option<Module>, CatalogError> {
        Ok(self.access().get(id).await?.as_ref().map(normalize::module))
    }

    /// All modules, paged.
    pub async fn list(&self, options: FindOptions) -> Result<Vec<Module>, CatalogError> {
        let docs = self.access().find(&Filter::All, options).await?;
        Ok(docs.iter().map(normalize::module).collect())
    }

    /// Modules whose stored `field` equals `value`.
    pub async fn list_by_field(
        &self,
        field: &str,
        value: Value,
    ) -> Result<Vec<Module>, CatalogError> {
        let docs = self
            .access()
            .find(&Filter::Eq(field.to_owned(), value), FindOptions::default())
            .await?;
        Ok(docs.iter().map(normalize::module).collect())
    }

    /// Overwrite fields on a module. `None` when it does not exist.
    pub async fn update(&self, id: &str, fields: Document) -> Result<Option<Module>, CatalogError> {
        Ok(self
            .access()
            .update(id, fields)
            .await?
            .as_ref()
            .map(normalize::module))
    }

    /// Delete a module. `false` when it does not exist.
    pub async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        self.access().delete(id).await
    }

    /// Insert many modules; returns their native ids.
    pub async fn bulk_create(&self, payloads: Vec<Document>) -> Result<Vec<String>, CatalogError> {
        self.access().insert_many(payloads).await
    }

    /// Number of stored modules.
    pub async fn count(&self) -> Result<u64, CatalogError> {
        Ok(self.store.count(Collection::Modules, &Filter::All).await?)
    }

    /// Delete every module.
    pub async fn delete_all(&self) -> Result<u64, CatalogError> {
        self.access().delete_many(&Filter::All).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    #[tokio::test]
    async fn create_then_get_by_every_key() {
        let store = MemoryStore::new();
        let repo = ModuleRepository::new(&store);
        let created = repo
            .create(doc(json!({"id": "Rack_1", "ID": "legacy_rack", "Name": "rack_1"})))
            .await;
        assert!(created.is_ok());

        for key in ["Rack_1", "rack_1", "legacy_rack"] {
            let found = repo.get(key).await.unwrap();
            assert_eq!(found.map(|m| m.id).as_deref(), Some("Rack_1"), "key {key}");
        }
        assert!(repo.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = MemoryStore::new();
        let repo = ModuleRepository::new(&store);
        assert!(repo.create(doc(json!({"id": "rack_1"}))).await.is_ok());
        let again = repo.create(doc(json!({"id": "rack_1"}))).await;
        assert!(matches!(again, Err(CatalogError::Invalid(_))));
    }

    #[tokio::test]
    async fn update_and_delete_by_legacy_id() {
        let store = MemoryStore::new();
        let repo = ModuleRepository::new(&store);
        assert!(repo.bulk_create(vec![doc(json!({"ID": "7", "Name": "pump_7"}))]).await.is_ok());

        let updated = repo.update("7", doc(json!({"price": 30}))).await.unwrap();
        assert_eq!(updated.and_then(|m| m.resources.price), Some(30));

        assert!(repo.delete("7").await.unwrap());
        assert!(!repo.delete("7").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_by_field_and_delete_all() {
        let store = MemoryStore::new();
        let repo = ModuleRepository::new(&store);
        let seed = vec![
            doc(json!({"id": "a", "type": "rack"})),
            doc(json!({"id": "b", "type": "pump"})),
            doc(json!({"id": "c", "type": "rack"})),
        ];
        assert_eq!(repo.bulk_create(seed).await.map(|ids| ids.len()).unwrap(), 3);

        let racks = repo.list_by_field("type", json!("rack")).await.unwrap();
        assert_eq!(racks.len(), 2);

        let page = repo
            .list(FindOptions::default().with_limit(2))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);

        assert_eq!(repo.delete_all().await.unwrap(), 3);
    }
}
