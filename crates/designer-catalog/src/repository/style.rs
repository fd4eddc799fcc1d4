use designer_types::{DatacenterStyle, Focus};

use super::EntityAccess;
use crate::document::Document;
use crate::error::CatalogError;
use crate::filter::Filter;
use crate::normalize;
use crate::resolver::EntityKind;
use crate::store::{DocumentStore, FindOptions};

/// Operations on the `datacenter_styles` collection.
pub struct StyleRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> StyleRepository<'a, S> {
    /// Create a repository bound to a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn access(&self) -> EntityAccess<'a, S> {
        EntityAccess::new(self.store, EntityKind::Style)
    }

    /// Insert one style.
    pub async fn create(&self, payload: Document) -> Result<DatacenterStyle, CatalogError> {
        let stored = self.access().insert(payload).await?;
        Ok(normalize::style(&stored))
    }

    /// Look a style up by native or application id.
    pub async fn get(&self, id: &str) -> Result<Option<DatacenterStyle>, CatalogError> {
        Ok(self.access().get(id).await?.as_ref().map(normalize::style))
    }

    /// All styles, paged.
    pub async fn list(&self, options: FindOptions) -> Result<Vec<DatacenterStyle>, CatalogError> {
        let docs = self.access().find(&Filter::All, options).await?;
        Ok(docs.iter().map(normalize::style).collect())
    }

    /// Styles with the given focus, under either field spelling.
    pub async fn list_by_focus(&self, focus: Focus) -> Result<Vec<DatacenterStyle>, CatalogError> {
        let filter = Filter::Or(vec![
            Filter::eq_ignore_case("focus", focus.as_str()),
            Filter::eq_ignore_case("Focus", focus.as_str()),
        ]);
        let docs = self.access().find(&filter, FindOptions::default()).await?;
        Ok(docs.iter().map(normalize::style).collect())
    }

    /// Overwrite fields on a style. `None` when it does not exist.
    pub async fn update(
        &self,
        id: &str,
        fields: Document,
    ) -> Result<Option<DatacenterStyle>, CatalogError> {
        Ok(self
            .access()
            .update(id, fields)
            .await?
            .as_ref()
            .map(normalize::style))
    }

    /// Delete a style. `false` when it does not exist. Datacenters created
    /// from it keep their `style_id`.
    pub async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        self.access().delete(id).await
    }

    /// Insert many styles; returns their native ids.
    pub async fn bulk_create(&self, payloads: Vec<Document>) -> Result<Vec<String>, CatalogError> {
        self.access().insert_many(payloads).await
    }

    /// Delete every style.
    pub async fn delete_all(&self) -> Result<u64, CatalogError> {
        self.access().delete_many(&Filter::All).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::memory::MemoryStore;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    #[tokio::test]
    async fn styles_resolve_by_native_and_application_id() {
        let store = MemoryStore::new();
        let repo = StyleRepository::new(&store);
        let native = repo
            .create(doc(json!({"Name": "Legacy Hub", "Focus": "storage"})))
            .await
            .unwrap()
            .id;
        assert!(crate::document::is_object_id(&native));

        let by_native = repo.get(&native).await.unwrap();
        assert_eq!(by_native.map(|s| s.name).as_deref(), Some("Legacy Hub"));

        assert!(repo.create(doc(json!({"id": "compact"}))).await.is_ok());
        assert!(repo.get("compact").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn focus_listing_reads_both_spellings() {
        let store = MemoryStore::new();
        let repo = StyleRepository::new(&store);
        let seed = vec![
            doc(json!({"id": "a", "focus": "storage"})),
            doc(json!({"id": "b", "Focus": "Storage"})),
            doc(json!({"id": "c", "focus": "network"})),
        ];
        assert!(repo.bulk_create(seed).await.is_ok());

        let storage = repo.list_by_focus(Focus::Storage).await.unwrap();
        assert_eq!(storage.len(), 2);
        assert!(storage.iter().all(|s| s.focus == Focus::Storage));
    }

    #[tokio::test]
    async fn update_delete_and_clear() {
        let store = MemoryStore::new();
        let repo = StyleRepository::new(&store);
        assert!(repo.create(doc(json!({"id": "s1", "name": "One"}))).await.is_ok());

        let updated = repo.update("s1", doc(json!({"price": 5}))).await.unwrap();
        assert_eq!(updated.and_then(|s| s.price), Some(5));
        assert!(repo.update("nope", Document::new()).await.unwrap().is_none());

        assert!(repo.delete("s1").await.unwrap());
        assert!(repo.create(doc(json!({"id": "s2"}))).await.is_ok());
        assert_eq!(repo.delete_all().await.unwrap(), 1);
    }
}
