//! In-process [`DocumentStore`] backed by per-collection vectors.
//!
//! Used by tests and by the `memory` store backend for local development.
//! All state sits behind one [`RwLock`], which is what makes
//! [`DocumentStore::replace_many`] atomic here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::document::{self, Document, NATIVE_ID};
use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::{Collection, DocumentStore, FindOptions, ReplaceOutcome, UpdateOutcome};

/// Shared in-memory document store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<BTreeMap<Collection, Vec<Document>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all collections.
    pub async fn len(&self) -> usize {
        self.collections.read().await.values().map(Vec::len).sum()
    }

    /// Whether every collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Give `doc` a native id if it lacks one and canonicalise it otherwise.
fn assign_native_id(
    collection: Collection,
    existing: &[Document],
    mut doc: Document,
) -> Result<(String, Document), StoreError> {
    let id = match document::native_id(&doc) {
        Some(id) => document::parse_object_id(&id).unwrap_or(id),
        None => document::new_object_id(),
    };

    if existing
        .iter()
        .any(|stored| document::native_id(stored).as_deref() == Some(id.as_str()))
    {
        return Err(StoreError::Unavailable(format!(
            "duplicate {NATIVE_ID} {id} in {collection}"
        )));
    }

    doc.insert(NATIVE_ID.to_owned(), Value::String(id.clone()));
    Ok((id, doc))
}

fn insert_all(
    collection: Collection,
    stored: &mut Vec<Document>,
    docs: Vec<Document>,
) -> Result<Vec<String>, StoreError> {
    let mut prepared = Vec::with_capacity(docs.len());
    let mut ids = Vec::with_capacity(docs.len());
    for doc in docs {
        let (id, doc) = assign_native_id(collection, stored, doc)?;
        if ids.contains(&id) {
            return Err(StoreError::Unavailable(format!(
                "duplicate {NATIVE_ID} {id} in {collection}"
            )));
        }
        ids.push(id);
        prepared.push(doc);
    }
    stored.extend(prepared);
    Ok(ids)
}

impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let skip = usize::try_from(options.skip.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .skip(skip)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let guard = self.collections.read().await;
        let count = guard
            .get(&collection)
            .map_or(0, |docs| docs.iter().filter(|doc| filter.matches(doc)).count());
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<String, StoreError> {
        let mut guard = self.collections.write().await;
        let stored = guard.entry(collection).or_default();
        let (id, doc) = assign_native_id(collection, stored, doc)?;
        stored.push(doc);
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: Collection,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        let mut guard = self.collections.write().await;
        let stored = guard.entry(collection).or_default();
        insert_all(collection, stored, docs)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        mut fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        fields.remove(NATIVE_ID);

        let mut guard = self.collections.write().await;
        let Some(target) = guard
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| filter.matches(doc)))
        else {
            return Ok(UpdateOutcome::default());
        };

        let mut modified = false;
        for (key, value) in fields {
            if target.get(&key) != Some(&value) {
                target.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok(u64::try_from(before.saturating_sub(docs.len())).unwrap_or(u64::MAX))
    }

    async fn replace_many(
        &self,
        collection: Collection,
        filter: &Filter,
        docs: Vec<Document>,
    ) -> Result<ReplaceOutcome, StoreError> {
        let mut guard = self.collections.write().await;
        let stored = guard.entry(collection).or_default();

        // Stage on a copy so a failed insert leaves the old set in place.
        let mut staged: Vec<Document> = stored
            .iter()
            .filter(|doc| !filter.matches(doc))
            .cloned()
            .collect();
        let deleted = stored.len().saturating_sub(staged.len());
        let inserted = insert_all(collection, &mut staged, docs)?;
        *stored = staged;

        Ok(ReplaceOutcome {
            deleted: u64::try_from(deleted).unwrap_or(u64::MAX),
            inserted,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_native_ids() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Modules, doc(json!({"id": "rack_1"})))
            .await
            .unwrap();
        assert!(document::is_object_id(&id));

        let found = store
            .find_one(Collection::Modules, &Filter::ObjectId(id.clone()))
            .await
            .unwrap();
        assert_eq!(found.and_then(|d| document::application_id(&d)).as_deref(), Some("rack_1"));
    }

    #[tokio::test]
    async fn duplicate_native_id_is_rejected() {
        let store = MemoryStore::new();
        let fixed = json!({"_id": "507f1f77bcf86cd799439011"});
        assert!(store.insert_one(Collection::Modules, doc(fixed.clone())).await.is_ok());
        assert!(store.insert_one(Collection::Modules, doc(fixed)).await.is_err());
    }

    #[tokio::test]
    async fn find_honours_skip_and_limit() {
        let store = MemoryStore::new();
        let docs = (0..5).map(|i| doc(json!({"n": i}))).collect();
        assert!(store.insert_many(Collection::Positions, docs).await.is_ok());

        let page = store
            .find(
                Collection::Positions,
                &Filter::All,
                FindOptions::default().with_skip(1).with_limit(2),
            )
            .await
            .unwrap();
        let ns: Vec<_> = page.iter().filter_map(|d| d.get("n").cloned()).collect();
        assert_eq!(ns, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn update_reports_matched_and_modified() {
        let store = MemoryStore::new();
        assert!(store
            .insert_one(Collection::Datacenters, doc(json!({"id": "dc", "name": "a"})))
            .await
            .is_ok());
        let filter = Filter::eq("id", "dc");

        let changed = store
            .update_one(Collection::Datacenters, &filter, doc(json!({"name": "b"})))
            .await
            .unwrap();
        assert_eq!(changed, UpdateOutcome { matched: 1, modified: 1 });

        let unchanged = store
            .update_one(Collection::Datacenters, &filter, doc(json!({"name": "b"})))
            .await
            .unwrap();
        assert_eq!(unchanged, UpdateOutcome { matched: 1, modified: 0 });

        let missing = store
            .update_one(Collection::Datacenters, &Filter::eq("id", "x"), Document::new())
            .await
            .unwrap();
        assert_eq!(missing.matched, 0);
    }

    #[tokio::test]
    async fn replace_many_swaps_the_matched_set() {
        let store = MemoryStore::new();
        let seed = vec![
            doc(json!({"datacenter_id": "dc1", "n": 1})),
            doc(json!({"datacenter_id": "dc1", "n": 2})),
            doc(json!({"datacenter_id": "dc2", "n": 3})),
        ];
        assert!(store.insert_many(Collection::PlacedModules, seed).await.is_ok());

        let outcome = store
            .replace_many(
                Collection::PlacedModules,
                &Filter::eq("datacenter_id", "dc1"),
                vec![doc(json!({"datacenter_id": "dc1", "n": 9}))],
            )
            .await
            .unwrap();
        assert_eq!(outcome.deleted, 2);
        assert_eq!(outcome.inserted.len(), 1);

        let total = store
            .count(Collection::PlacedModules, &Filter::All)
            .await
            .unwrap();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn failed_replace_keeps_old_set() {
        let store = MemoryStore::new();
        let fixed = json!({"_id": "507f1f77bcf86cd799439011", "datacenter_id": "dc1"});
        assert!(store.insert_one(Collection::PlacedModules, doc(fixed.clone())).await.is_ok());
        assert!(store
            .insert_one(Collection::PlacedModules, doc(json!({"datacenter_id": "dc1"})))
            .await
            .is_ok());

        // Two new docs with the same id: the insert half fails.
        let result = store
            .replace_many(
                Collection::PlacedModules,
                &Filter::eq("datacenter_id", "dc1"),
                vec![doc(fixed.clone()), doc(fixed)],
            )
            .await;
        assert!(result.is_err());
        assert_eq!(store.len().await, 2);
    }
}
