//! The `MongoDB` implementation of [`DocumentStore`].
//!
//! One collection per [`Collection`] in the configured database.
//! [`DocumentStore::replace_many`] runs inside a multi-document transaction,
//! which needs a replica set or sharded cluster.

use bson::{Bson, doc};
use designer_catalog::document::NATIVE_ID;
use designer_catalog::{
    Collection, Document, DocumentStore, Filter, FindOptions, ReplaceOutcome, StoreError,
    UpdateOutcome,
};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, ClientSession, Database};

use crate::config::MongoConfig;
use crate::convert::{filter_document, from_bson_document, id_text, to_bson_document};
use crate::error::DbError;

type Raw = mongodb::Collection<bson::Document>;

/// Handle to a `MongoDB` database.
///
/// Cheap to clone; clones share the driver's connection pool.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a ping.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the connection string cannot be
    /// parsed and [`DbError::Mongo`] if the server cannot be reached.
    pub async fn connect(config: &MongoConfig) -> Result<Self, DbError> {
        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(|e| DbError::Config(format!("Invalid MongoDB URI: {e}")))?;
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);
        options.max_pool_size = Some(config.max_pool_size);
        options.app_name = Some(config.app_name.clone());

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let store = Self { client, database };
        store.ping().await?;

        tracing::info!(
            database = %config.database,
            max_pool_size = config.max_pool_size,
            "Connected to MongoDB"
        );
        Ok(store)
    }

    /// Round-trip a `ping` command.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Mongo`] if the server does not answer.
    pub async fn ping(&self) -> Result<(), DbError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// The underlying database handle.
    pub const fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self, collection: Collection) -> Raw {
        self.database.collection(collection.name())
    }

    async fn find_one_raw(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, DbError> {
        let found = self
            .collection(collection)
            .find_one(filter_document(filter)?)
            .await?;
        Ok(found.map(from_bson_document))
    }

    async fn find_raw(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, DbError> {
        let coll = self.collection(collection);
        let mut action = coll.find(filter_document(filter)?);
        if let Some(limit) = options.limit {
            action = action.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        if let Some(skip) = options.skip {
            action = action.skip(skip);
        }
        let docs: Vec<bson::Document> = action.await?.try_collect().await?;
        Ok(docs.into_iter().map(from_bson_document).collect())
    }

    async fn count_raw(&self, collection: Collection, filter: &Filter) -> Result<u64, DbError> {
        Ok(self
            .collection(collection)
            .count_documents(filter_document(filter)?)
            .await?)
    }

    async fn insert_one_raw(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<String, DbError> {
        let result = self
            .collection(collection)
            .insert_one(to_bson_document(doc)?)
            .await?;
        Ok(id_text(result.inserted_id))
    }

    async fn insert_many_raw(
        &self,
        collection: Collection,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, DbError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        let docs = convert_all(docs)?;
        let result = self.collection(collection).insert_many(docs).await?;
        Ok(ordered_ids(result.inserted_ids))
    }

    async fn update_one_raw(
        &self,
        collection: Collection,
        filter: &Filter,
        mut fields: Document,
    ) -> Result<UpdateOutcome, DbError> {
        fields.remove(NATIVE_ID);
        if fields.is_empty() {
            // `$set` rejects an empty document.
            let matched = u64::from(self.find_one_raw(collection, filter).await?.is_some());
            return Ok(UpdateOutcome {
                matched,
                modified: 0,
            });
        }
        let result = self
            .collection(collection)
            .update_one(
                filter_document(filter)?,
                doc! { "$set": to_bson_document(fields)? },
            )
            .await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one_raw(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, DbError> {
        let result = self
            .collection(collection)
            .delete_one(filter_document(filter)?)
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_many_raw(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, DbError> {
        let result = self
            .collection(collection)
            .delete_many(filter_document(filter)?)
            .await?;
        Ok(result.deleted_count)
    }

    async fn replace_many_raw(
        &self,
        collection: Collection,
        filter: &Filter,
        docs: Vec<Document>,
    ) -> Result<ReplaceOutcome, DbError> {
        let query = filter_document(filter)?;
        let docs = convert_all(docs)?;
        let raw = self.collection(collection);

        let mut session = self.client.start_session().await?;
        session
            .start_transaction()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        match replace_in(&raw, &mut session, query, docs).await {
            Ok(outcome) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(|e| DbError::Transaction(e.to_string()))?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(abort) = session.abort_transaction().await {
                    tracing::warn!(%collection, error = %abort, "transaction abort failed");
                }
                Err(DbError::Transaction(err.to_string()))
            }
        }
    }
}

async fn replace_in(
    raw: &Raw,
    session: &mut ClientSession,
    query: bson::Document,
    docs: Vec<bson::Document>,
) -> Result<ReplaceOutcome, DbError> {
    let deleted = raw
        .delete_many(query)
        .session(&mut *session)
        .await?
        .deleted_count;
    let inserted = if docs.is_empty() {
        Vec::new()
    } else {
        let result = raw.insert_many(docs).session(&mut *session).await?;
        ordered_ids(result.inserted_ids)
    };
    Ok(ReplaceOutcome { deleted, inserted })
}

fn convert_all(docs: Vec<Document>) -> Result<Vec<bson::Document>, DbError> {
    docs.into_iter().map(to_bson_document).collect()
}

/// Inserted ids come back keyed by input index.
fn ordered_ids(ids: std::collections::HashMap<usize, Bson>) -> Vec<String> {
    let mut ids: Vec<(usize, Bson)> = ids.into_iter().collect();
    ids.sort_by_key(|(index, _)| *index);
    ids.into_iter().map(|(_, id)| id_text(id)).collect()
}

impl DocumentStore for MongoStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.find_one_raw(collection, filter).await?)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self.find_raw(collection, filter, options).await?)
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        Ok(self.count_raw(collection, filter).await?)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<String, StoreError> {
        Ok(self.insert_one_raw(collection, doc).await?)
    }

    async fn insert_many(
        &self,
        collection: Collection,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self.insert_many_raw(collection, docs).await?)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        Ok(self.update_one_raw(collection, filter, fields).await?)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        Ok(self.delete_one_raw(collection, filter).await?)
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        Ok(self.delete_many_raw(collection, filter).await?)
    }

    async fn replace_many(
        &self,
        collection: Collection,
        filter: &Filter,
        docs: Vec<Document>,
    ) -> Result<ReplaceOutcome, StoreError> {
        let outcome = self.replace_many_raw(collection, filter, docs).await?;
        tracing::debug!(
            %collection,
            deleted = outcome.deleted,
            inserted = outcome.inserted.len(),
            "replaced documents in transaction"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_ids_follow_input_order() {
        let mut ids = std::collections::HashMap::new();
        ids.insert(2, Bson::String("c".to_owned()));
        ids.insert(0, Bson::String("a".to_owned()));
        ids.insert(1, Bson::String("b".to_owned()));
        assert_eq!(ordered_ids(ids), vec!["a", "b", "c"]);
    }
}
