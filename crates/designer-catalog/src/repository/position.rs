use designer_types::Position;

use super::EntityAccess;
use crate::document::Document;
use crate::error::CatalogError;
use crate::filter::Filter;
use crate::normalize;
use crate::resolver::EntityKind;
use crate::store::{DocumentStore, FindOptions};

/// Operations on the `positions` collection.
pub struct PositionRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> PositionRepository<'a, S> {
    /// Create a repository bound to a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn access(&self) -> EntityAccess<'a, S> {
        EntityAccess::new(self.store, EntityKind::Position)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Position>, CatalogError> {
        let docs = self.access().find(filter, FindOptions::default()).await?;
        Ok(docs.iter().map(normalize::position).collect())
    }

    /// Insert one position.
    pub async fn create(&self, payload: Document) -> Result<Position, CatalogError> {
        let stored = self.access().insert(payload).await?;
        Ok(normalize::position(&stored))
    }

    /// Look a position up by native or application id.
    pub async fn get(&self, id: &str) -> Result<Option<Position>, CatalogError> {
        Ok(self.access().get(id).await?.as_ref().map(normalize::position))
    }

    /// All positions, paged.
    pub async fn list(&self, options: FindOptions) -> Result<Vec<Position>, CatalogError> {
        let docs = self.access().find(&Filter::All, options).await?;
        Ok(docs.iter().map(normalize::position).collect())
    }

    /// Positions tied to a datacenter.
    pub async fn list_by_datacenter(
        &self,
        datacenter_id: &str,
    ) -> Result<Vec<Position>, CatalogError> {
        self.find(&Filter::eq("datacenter_id", datacenter_id)).await
    }

    /// The first position tied to a module.
    pub async fn get_by_module(&self, module_id: &str) -> Result<Option<Position>, CatalogError> {
        let doc = self
            .store
            .find_one(EntityKind::Position.collection(), &Filter::eq("module_id", module_id))
            .await?;
        Ok(doc.as_ref().map(normalize::position))
    }

    /// Overwrite fields. `None` when the position does not exist.
    pub async fn update(
        &self,
        id: &str,
        fields: Document,
    ) -> Result<Option<Position>, CatalogError> {
        Ok(self
            .access()
            .update(id, fields)
            .await?
            .as_ref()
            .map(normalize::position))
    }

    /// Delete one position. `false` when it does not exist.
    pub async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        self.access().delete(id).await
    }

    /// Delete every position tied to a datacenter.
    pub async fn delete_by_datacenter(&self, datacenter_id: &str) -> Result<u64, CatalogError> {
        self.access()
            .delete_many(&Filter::eq("datacenter_id", datacenter_id))
            .await
    }

    /// Insert many positions; returns their native ids.
    pub async fn bulk_create(&self, payloads: Vec<Document>) -> Result<Vec<String>, CatalogError> {
        self.access().insert_many(payloads).await
    }

    /// Positions inside the rectangle spanned by two corners, edges
    /// included. Corners may come in any order.
    pub async fn find_in_area(
        &self,
        (x1, y1): (i64, i64),
        (x2, y2): (i64, i64),
        datacenter_id: Option<&str>,
    ) -> Result<Vec<Position>, CatalogError> {
        let mut clauses = vec![Filter::range("x", x1, x2), Filter::range("y", y1, y2)];
        if let Some(datacenter_id) = datacenter_id.filter(|id| !id.is_empty()) {
            clauses.push(Filter::eq("datacenter_id", datacenter_id));
        }
        self.find(&Filter::And(clauses)).await
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

    async fn seeded(store: &MemoryStore) -> PositionRepository<'_, MemoryStore> {
        let repo = PositionRepository::new(store);
        let seed = vec![
            doc(json!({"id": "p1", "x": 0, "y": 0, "datacenter_id": "dc1"})),
            doc(json!({
                "id": "p2", "x": 10, "y": 10, "datacenter_id": "dc1", "module_id": "rack_1"
            })),
            doc(json!({"id": "p3", "x": 11, "y": 5, "datacenter_id": "dc1"})),
            doc(json!({"id": "p4", "x": 5, "y": 5, "datacenter_id": "dc2"})),
        ];
        assert!(repo.bulk_create(seed).await.is_ok());
        repo
    }

    fn ids(positions: &[Position]) -> Vec<&str> {
        positions.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn area_is_inclusive_and_corner_order_free() {
        let store = MemoryStore::new();
        let repo = seeded(&store).await;

        let forward = repo.find_in_area((0, 0), (10, 10), Some("dc1")).await.unwrap();
        let backward = repo.find_in_area((10, 10), (0, 0), Some("dc1")).await.unwrap();
        assert_eq!(forward.len(), 2);
        assert_eq!(forward, backward);

        let everywhere = repo.find_in_area((0, 0), (10, 10), None).await.unwrap();
        assert_eq!(everywhere.len(), 3);
    }

    #[tokio::test]
    async fn lookups_by_owner() {
        let store = MemoryStore::new();
        let repo = seeded(&store).await;

        let by_module = repo.get_by_module("rack_1").await.unwrap();
        assert_eq!(by_module.map(|p| (p.x, p.y)), Some((10, 10)));

        let dc2 = repo.list_by_datacenter("dc2").await.unwrap();
        assert_eq!(dc2.len(), 1);

        assert_eq!(repo.delete_by_datacenter("dc1").await.unwrap(), 3);
        let rest = repo.list(FindOptions::default()).await.unwrap();
        assert!(rest.iter().all(|p| p.datacenter_id.as_deref() == Some("dc2")));
        assert_eq!(rest.len(), 1);
    }

    #[tokio::test]
    async fn crud_round() {
        let store = MemoryStore::new();
        let repo = PositionRepository::new(&store);
        let door = doc(json!({"id": "door", "x": 1, "y": 2, "name": "Door"}));
        assert!(repo.create(door).await.is_ok());

        let moved = repo.update("door", doc(json!({"x": 4}))).await.unwrap();
        assert_eq!(moved.map(|p| (p.x, p.y)), Some((4, 2)));
        assert!(repo.get("door").await.unwrap().is_some());
        assert!(repo.delete("door").await.unwrap());
        assert!(repo.get("door").await.unwrap().is_none());
        assert!(ids(&repo.list(FindOptions::default()).await.unwrap()).is_empty());
    }
}
