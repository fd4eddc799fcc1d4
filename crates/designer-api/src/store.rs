//! The store backend selected at startup.
//!
//! [`DocumentStore`] returns `impl Future`, so it is not object safe; the
//! backends are dispatched through an enum instead of a trait object.

use designer_catalog::{
    Collection, Document, DocumentStore, Filter, FindOptions, MemoryStore, ReplaceOutcome,
    StoreError, UpdateOutcome,
};
use designer_db::{DbError, MongoStore};

use crate::config::{StoreBackend, StoreConfig};

/// One of the supported document stores.
#[derive(Debug, Clone)]
pub enum Store {
    /// Process-local store.
    Memory(MemoryStore),
    /// `MongoDB`.
    Mongo(MongoStore),
}

impl Store {
    /// Open the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if `MongoDB` cannot be reached.
    pub async fn connect(config: &StoreConfig) -> Result<Self, DbError> {
        match config.backend {
            StoreBackend::Memory => {
                tracing::warn!("using the in-memory store; data is lost on exit");
                Ok(Self::Memory(MemoryStore::new()))
            }
            StoreBackend::Mongodb => Ok(Self::Mongo(MongoStore::connect(&config.mongo()).await?)),
        }
    }

    /// Backend name for logs.
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Mongo(_) => "mongodb",
        }
    }
}

impl DocumentStore for Store {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        match self {
            Self::Memory(store) => store.find_one(collection, filter).await,
            Self::Mongo(store) => store.find_one(collection, filter).await,
        }
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Memory(store) => store.find(collection, filter, options).await,
            Self::Mongo(store) => store.find(collection, filter, options).await,
        }
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        match self {
            Self::Memory(store) => store.count(collection, filter).await,
            Self::Mongo(store) => store.count(collection, filter).await,
        }
    }

    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<String, StoreError> {
        match self {
            Self::Memory(store) => store.insert_one(collection, doc).await,
            Self::Mongo(store) => store.insert_one(collection, doc).await,
        }
    }

    async fn insert_many(
        &self,
        collection: Collection,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        match self {
            Self::Memory(store) => store.insert_many(collection, docs).await,
            Self::Mongo(store) => store.insert_many(collection, docs).await,
        }
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        match self {
            Self::Memory(store) => store.update_one(collection, filter, fields).await,
            Self::Mongo(store) => store.update_one(collection, filter, fields).await,
        }
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        match self {
            Self::Memory(store) => store.delete_one(collection, filter).await,
            Self::Mongo(store) => store.delete_one(collection, filter).await,
        }
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        match self {
            Self::Memory(store) => store.delete_many(collection, filter).await,
            Self::Mongo(store) => store.delete_many(collection, filter).await,
        }
    }

    async fn replace_many(
        &self,
        collection: Collection,
        filter: &Filter,
        docs: Vec<Document>,
    ) -> Result<ReplaceOutcome, StoreError> {
        match self {
            Self::Memory(store) => store.replace_many(collection, filter, docs).await,
            Self::Mongo(store) => store.replace_many(collection, filter, docs).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_needs_no_server() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        let store = Store::connect(&config).await;
        assert!(matches!(store, Ok(Store::Memory(_))));
    }

    #[tokio::test]
    async fn dispatches_to_the_wrapped_store() {
        let store = Store::Memory(MemoryStore::new());
        let id = store
            .insert_one(Collection::Positions, Document::new())
            .await
            .unwrap();
        assert_eq!(store.count(Collection::Positions, &Filter::All).await.ok(), Some(1));
        assert_eq!(
            store
                .delete_one(Collection::Positions, &Filter::ObjectId(id))
                .await
                .ok(),
            Some(1)
        );
    }
}
