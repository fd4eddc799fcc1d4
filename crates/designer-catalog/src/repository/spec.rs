use designer_types::{CompositeDatacenterSpec, RawDatacenterSpec};

use super::EntityAccess;
use crate::document::{Document, LEGACY_ID};
use crate::error::CatalogError;
use crate::filter::Filter;
use crate::merge::CompositeSpecMerger;
use crate::normalize;
use crate::resolver::{EntityKind, component_filter};
use crate::store::{DocumentStore, FindOptions};

/// Operations on the `datacenter_specs` collection.
///
/// Single-row operations address one unit row; [`Self::composite`] and
/// [`Self::composites`] fold rows per component identifier.
pub struct SpecRepository<'a, S> {
    store: &'a S,
    merger: CompositeSpecMerger,
}

impl<'a, S: DocumentStore> SpecRepository<'a, S> {
    /// Create a repository bound to a store.
    pub const fn new(store: &'a S, merger: CompositeSpecMerger) -> Self {
        Self { store, merger }
    }

    fn access(&self) -> EntityAccess<'a, S> {
        EntityAccess::new(self.store, EntityKind::Spec)
    }

    /// Insert one spec row.
    pub async fn create(&self, payload: Document) -> Result<RawDatacenterSpec, CatalogError> {
        let stored = self.access().insert(payload).await?;
        Ok(normalize::spec(&stored))
    }

    /// One row, by native id, application id or component id.
    pub async fn get(&self, id: &str) -> Result<Option<RawDatacenterSpec>, CatalogError> {
        Ok(self.access().get(id).await?.as_ref().map(normalize::spec))
    }

    /// All rows, paged.
    pub async fn list(&self, options: FindOptions) -> Result<Vec<RawDatacenterSpec>, CatalogError> {
        let docs = self.access().find(&Filter::All, options).await?;
        Ok(docs.iter().map(normalize::spec).collect())
    }

    /// Overwrite fields on one row. `None` when it does not exist.
    pub async fn update(
        &self,
        id: &str,
        fields: Document,
    ) -> Result<Option<RawDatacenterSpec>, CatalogError> {
        Ok(self
            .access()
            .update(id, fields)
            .await?
            .as_ref()
            .map(normalize::spec))
    }

    /// Delete one row. `false` when it does not exist.
    pub async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        self.access().delete(id).await
    }

    /// Insert many rows; returns their native ids.
    pub async fn bulk_create(&self, payloads: Vec<Document>) -> Result<Vec<String>, CatalogError> {
        self.access().insert_many(payloads).await
    }

    /// Every row of one component, in store order.
    pub async fn rows_for_component(
        &self,
        component_id: &str,
    ) -> Result<Vec<RawDatacenterSpec>, CatalogError> {
        let docs = self
            .access()
            .find(&Filter::eq(LEGACY_ID, component_id), FindOptions::default())
            .await?;
        Ok(docs.iter().map(normalize::spec).collect())
    }

    /// The row of one component for one unit.
    pub async fn row_for_unit(
        &self,
        component_id: &str,
        unit: &str,
    ) -> Result<Option<RawDatacenterSpec>, CatalogError> {
        let filter = Filter::And(vec![
            Filter::eq(LEGACY_ID, component_id),
            Filter::eq("Unit", unit),
        ]);
        let docs = self
            .access()
            .find(&filter, FindOptions::default().with_limit(1))
            .await?;
        Ok(docs.first().map(normalize::spec))
    }

    /// Rows tagged with a focus.
    pub async fn list_by_focus(&self, focus: &str) -> Result<Vec<RawDatacenterSpec>, CatalogError> {
        let docs = self
            .access()
            .find(&Filter::eq("focus", focus), FindOptions::default())
            .await?;
        Ok(docs.iter().map(normalize::spec).collect())
    }

    /// The merged spec `id` names.
    ///
    /// A valid object id selects the row with that native id as well as
    /// every row whose component id equals it; anything else is read as a
    /// component id.
    pub async fn composite(
        &self,
        id: &str,
    ) -> Result<Option<CompositeDatacenterSpec>, CatalogError> {
        let Some(filter) = component_filter(id) else {
            return Ok(None);
        };
        let docs = self.access().find(&filter, FindOptions::default()).await?;
        if docs.is_empty() {
            return Ok(None);
        }
        let rows: Vec<RawDatacenterSpec> = docs.iter().map(normalize::spec).collect();
        self.merger.merge(&rows).map(Some)
    }

    /// One merged spec per component identifier, in first-seen order.
    pub async fn composites(&self) -> Result<Vec<CompositeDatacenterSpec>, CatalogError> {
        let docs = self.access().find(&Filter::All, FindOptions::default()).await?;
        self.merger
            .merge_all(docs.iter().map(normalize::spec).collect())
    }

    /// Delete every row.
    pub async fn delete_all(&self) -> Result<u64, CatalogError> {
        self.access().delete_many(&Filter::All).await
    }
}
