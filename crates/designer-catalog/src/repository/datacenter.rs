use chrono::Utc;
use designer_types::{Coordinates, Datacenter};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::placed_module::{PlacedModuleRepository, owned_by};
use super::{EntityAccess, StyleRepository, aliases, any_of, without_native_id};
use crate::document::{self, Document, to_document};
use crate::error::{CatalogError, StoreError};
use crate::filter::Filter;
use crate::normalize;
use crate::reference::{ModuleReferenceResolver, SnapshotPolicy, prepare_write};
use crate::resolver::{EntityKind, Resolution};
use crate::store::{Collection, DocumentStore, FindOptions, ReplaceOutcome};

/// One module to place when laying out a datacenter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePlacement {
    /// Any identifier of the module to place.
    pub id: String,
    /// Grid position.
    #[serde(default)]
    pub position: Coordinates,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: i64,
}

/// A datacenter layout built on a style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRequest {
    /// Name override. Defaults to one derived from the style.
    #[serde(default)]
    pub name: Option<String>,
    /// Description override. Defaults to the style's.
    #[serde(default)]
    pub description: Option<String>,
    /// Style the site is built from.
    #[serde(rename = "styleId", alias = "style_id")]
    pub style_id: String,
    /// Modules to place.
    #[serde(default)]
    pub modules: Vec<ModulePlacement>,
}

/// A datacenter written from a layout, plus the placements that were
/// skipped because their module does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedDatacenter {
    /// The stored datacenter with its placed modules.
    pub datacenter: Datacenter,
    /// Requested module ids that did not resolve.
    pub missing_modules: Vec<String>,
}

/// One page of datacenters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatacenterPage {
    /// Datacenters in the collection, ignoring paging.
    pub total: u64,
    /// This page.
    pub datacenters: Vec<Datacenter>,
}

/// Result of a cascading datacenter delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedDatacenter {
    /// Placed modules removed with the datacenter.
    pub placed_modules: u64,
}

/// Operations on the `datacenters` collection and the placed modules each
/// datacenter owns.
///
/// Placed modules are tied to their datacenter by `datacenter_id`, which
/// may hold either the datacenter's native id or its application id; both
/// are honoured when reading, replacing and deleting children.
pub struct DatacenterRepository<'a, S> {
    store: &'a S,
    snapshots: SnapshotPolicy,
}

impl<'a, S: DocumentStore> DatacenterRepository<'a, S> {
    /// Create a repository bound to a store. `snapshots` governs module
    /// snapshots on layout writes.
    pub const fn new(store: &'a S, snapshots: SnapshotPolicy) -> Self {
        Self { store, snapshots }
    }

    fn access(&self) -> EntityAccess<'a, S> {
        EntityAccess::new(self.store, EntityKind::Datacenter)
    }

    fn now() -> Value {
        Value::String(Utc::now().to_rfc3339())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    async fn with_modules(&self, doc: &Document) -> Result<Datacenter, CatalogError> {
        let mut datacenter = normalize::datacenter(doc);
        let children = self
            .store
            .find(
                Collection::PlacedModules,
                &any_of("datacenter_id", &aliases(doc)),
                FindOptions::default(),
            )
            .await?;
        datacenter.modules = ModuleReferenceResolver::new(self.store)
            .resolve_all(&children)
            .await?;
        Ok(datacenter)
    }

    async fn shape(
        &self,
        doc: &Document,
        include_modules: bool,
    ) -> Result<Datacenter, CatalogError> {
        if include_modules {
            self.with_modules(doc).await
        } else {
            Ok(normalize::datacenter(doc))
        }
    }

    async fn refreshed(&self, hit: &Resolution) -> Result<Datacenter, CatalogError> {
        let doc = self
            .store
            .find_one(Collection::Datacenters, &hit.filter())
            .await?
            .unwrap_or_else(|| hit.document.clone());
        self.with_modules(&doc).await
    }

    /// Look a datacenter up by native or application id.
    pub async fn get(
        &self,
        id: &str,
        include_modules: bool,
    ) -> Result<Option<Datacenter>, CatalogError> {
        match self.access().get(id).await? {
            Some(doc) => Ok(Some(self.shape(&doc, include_modules).await?)),
            None => Ok(None),
        }
    }

    /// One page of datacenters plus the collection total.
    pub async fn list(
        &self,
        include_modules: bool,
        options: FindOptions,
    ) -> Result<DatacenterPage, CatalogError> {
        let total = self.store.count(Collection::Datacenters, &Filter::All).await?;
        let docs = self.access().find(&Filter::All, options).await?;
        let mut datacenters = Vec::with_capacity(docs.len());
        for doc in &docs {
            datacenters.push(self.shape(doc, include_modules).await?);
        }
        Ok(DatacenterPage { total, datacenters })
    }

    /// Case-insensitive substring search over name and description.
    pub async fn search(&self, text: &str, limit: u64) -> Result<Vec<Datacenter>, CatalogError> {
        let filter = Filter::Or(vec![
            Filter::contains_ignore_case("name", text),
            Filter::contains_ignore_case("description", text),
        ]);
        let docs = self
            .access()
            .find(&filter, FindOptions::default().with_limit(limit))
            .await?;
        Ok(docs.iter().map(normalize::datacenter).collect())
    }

    /// Datacenters created from a style.
    pub async fn list_by_style(&self, style_id: &str) -> Result<Vec<Datacenter>, CatalogError> {
        let docs = self
            .access()
            .find(&Filter::eq("style_id", style_id), FindOptions::default())
            .await?;
        Ok(docs.iter().map(normalize::datacenter).collect())
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a datacenter and the placed modules it starts with.
    ///
    /// Timestamps are set here. Each placed module is stamped with the new
    /// datacenter's id and written through the reference write path.
    pub async fn create(
        &self,
        mut fields: Document,
        modules: Vec<Document>,
    ) -> Result<Datacenter, CatalogError> {
        fields.remove("modules");
        let now = Self::now();
        fields.insert("created_at".to_owned(), now.clone());
        fields.insert("updated_at".to_owned(), now);

        let stored = self.access().insert(fields).await?;
        let owner = normalize::datacenter(&stored).id;
        let children: Vec<Document> = modules
            .into_iter()
            .map(|payload| owned_by(prepare_write(payload, self.snapshots), &owner))
            .collect();
        let placed = EntityAccess::new(self.store, EntityKind::PlacedModule)
            .insert_many(children)
            .await?;

        tracing::info!(datacenter_id = %owner, placed = placed.len(), "datacenter created");
        self.with_modules(&stored).await
    }

    /// Build a datacenter from a style and place the requested modules.
    ///
    /// Placements whose module does not resolve are skipped and reported.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the style does not exist.
    pub async fn create_from_style(
        &self,
        request: LayoutRequest,
    ) -> Result<CreatedDatacenter, CatalogError> {
        let style = StyleRepository::new(self.store)
            .get(&request.style_id)
            .await?
            .ok_or_else(|| CatalogError::not_found(EntityKind::Style, &request.style_id))?;

        let style_name = if style.name.is_empty() {
            "unknown style"
        } else {
            style.name.as_str()
        };
        let name = non_empty(request.name)
            .unwrap_or_else(|| format!("Datacenter using {style_name}"));
        let description = non_empty(request.description).unwrap_or(style.description);

        let mut fields = Document::new();
        fields.insert("name".to_owned(), Value::String(name));
        fields.insert("description".to_owned(), Value::String(description));
        fields.insert("style_id".to_owned(), Value::String(request.style_id));
        fields.insert("dim".to_owned(), json!(style.dim));
        fields.insert("grid_connection".to_owned(), Value::from(style.grid_connection));
        fields.insert("water_connection".to_owned(), Value::from(style.water_connection));

        let (placements, missing_modules) = self.placements(&request.modules).await?;
        let datacenter = self.create(fields, placements).await?;
        Ok(CreatedDatacenter {
            datacenter,
            missing_modules,
        })
    }

    /// Overwrite datacenter fields and refresh `updated_at`.
    ///
    /// A `modules` array in `fields` atomically replaces the placed-module
    /// set. `None` when the datacenter does not exist.
    pub async fn update(
        &self,
        id: &str,
        mut fields: Document,
    ) -> Result<Option<Datacenter>, CatalogError> {
        let Some(hit) = self.access().resolve(id).await? else {
            return Ok(None);
        };

        let modules = fields.remove("modules");
        fields.insert("updated_at".to_owned(), Self::now());
        self.store
            .update_one(Collection::Datacenters, &hit.filter(), without_native_id(fields))
            .await?;

        if let Some(Value::Array(items)) = modules {
            let payloads = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(payload) => Some(payload),
                    _ => None,
                })
                .collect();
            self.replace_children(&hit.document, payloads).await?;
        }

        Ok(Some(self.refreshed(&hit).await?))
    }

    /// Re-lay a datacenter: adopt a new style if it changed, then replace
    /// its placed modules in one atomic step. `None` when the datacenter
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when a changed style does not
    /// exist.
    pub async fn replace_layout(
        &self,
        id: &str,
        request: LayoutRequest,
    ) -> Result<Option<CreatedDatacenter>, CatalogError> {
        let Some(hit) = self.access().resolve(id).await? else {
            return Ok(None);
        };
        let existing = normalize::datacenter(&hit.document);

        let mut fields = Document::new();
        fields.insert("updated_at".to_owned(), Self::now());
        if existing.style_id.as_deref() != Some(request.style_id.as_str()) {
            let style = StyleRepository::new(self.store)
                .get(&request.style_id)
                .await?
                .ok_or_else(|| CatalogError::not_found(EntityKind::Style, &request.style_id))?;
            fields.insert("style_id".to_owned(), Value::String(request.style_id.clone()));
            fields.insert("dim".to_owned(), json!(style.dim));
            fields.insert("grid_connection".to_owned(), Value::from(style.grid_connection));
            fields.insert("water_connection".to_owned(), Value::from(style.water_connection));
        }
        if let Some(name) = non_empty(request.name) {
            fields.insert("name".to_owned(), Value::String(name));
        }
        if let Some(description) = non_empty(request.description) {
            fields.insert("description".to_owned(), Value::String(description));
        }
        self.store
            .update_one(Collection::Datacenters, &hit.filter(), fields)
            .await?;

        let (placements, missing_modules) = self.placements(&request.modules).await?;
        self.replace_children(&hit.document, placements).await?;

        Ok(Some(CreatedDatacenter {
            datacenter: self.refreshed(&hit).await?,
            missing_modules,
        }))
    }

    /// Delete a datacenter and every placed module it owns.
    ///
    /// Two steps behind one call: children first, then the datacenter.
    /// Modules and styles are untouched. `None` when the datacenter does
    /// not exist.
    pub async fn delete(&self, id: &str) -> Result<Option<DeletedDatacenter>, CatalogError> {
        let Some(hit) = self.access().resolve(id).await? else {
            return Ok(None);
        };

        let placed_modules = self
            .store
            .delete_many(
                Collection::PlacedModules,
                &any_of("datacenter_id", &aliases(&hit.document)),
            )
            .await?;
        self.store
            .delete_one(Collection::Datacenters, &hit.filter())
            .await?;

        tracing::info!(datacenter_id = id, placed_modules, "datacenter deleted");
        Ok(Some(DeletedDatacenter { placed_modules }))
    }

    /// Place one more module. `None` when the datacenter does not exist.
    pub async fn add_module(
        &self,
        id: &str,
        payload: Document,
    ) -> Result<Option<Datacenter>, CatalogError> {
        let Some(hit) = self.access().resolve(id).await? else {
            return Ok(None);
        };
        let owner = normalize::datacenter(&hit.document).id;
        PlacedModuleRepository::new(self.store)
            .create(owned_by(payload, &owner), self.snapshots)
            .await?;
        Ok(Some(self.refreshed(&hit).await?))
    }

    /// Remove one placed module. `None` when the datacenter does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the placed module does not
    /// exist and [`CatalogError::Invalid`] when it belongs to another
    /// datacenter.
    pub async fn remove_module(
        &self,
        id: &str,
        placed_id: &str,
    ) -> Result<Option<Datacenter>, CatalogError> {
        let Some(hit) = self.access().resolve(id).await? else {
            return Ok(None);
        };
        let placed = EntityAccess::new(self.store, EntityKind::PlacedModule);
        let child = placed
            .get(placed_id)
            .await?
            .ok_or_else(|| CatalogError::not_found(EntityKind::PlacedModule, placed_id))?;

        let owner = child.get("datacenter_id").and_then(document::identifier);
        if !owner.is_some_and(|owner| aliases(&hit.document).contains(&owner)) {
            return Err(CatalogError::Invalid(format!(
                "placed module {placed_id} does not belong to datacenter {id}"
            )));
        }

        placed.delete(placed_id).await?;
        Ok(Some(self.refreshed(&hit).await?))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Turn placements into placed-module payloads, embedding the resolved
    /// module. Unresolvable module ids are returned separately.
    async fn placements(
        &self,
        requested: &[ModulePlacement],
    ) -> Result<(Vec<Document>, Vec<String>), CatalogError> {
        let modules = EntityAccess::new(self.store, EntityKind::Module);
        let mut payloads = Vec::with_capacity(requested.len());
        let mut missing = Vec::new();

        for placement in requested {
            let Some(raw) = modules.get(&placement.id).await? else {
                tracing::warn!(module_id = %placement.id, "skipping placement of unknown module");
                missing.push(placement.id.clone());
                continue;
            };
            let module = to_document(&normalize::module(&raw)).map_err(StoreError::from)?;

            let mut payload = Document::new();
            payload.insert("module_id".to_owned(), Value::String(placement.id.clone()));
            payload.insert("module".to_owned(), Value::Object(module));
            payload.insert(
                "position".to_owned(),
                json!({"x": placement.position.x, "y": placement.position.y}),
            );
            payload.insert("rotation".to_owned(), Value::from(placement.rotation));
            payloads.push(payload);
        }

        Ok((payloads, missing))
    }

    /// Atomically swap the placed modules owned by `owner` for `payloads`.
    async fn replace_children(
        &self,
        owner: &Document,
        payloads: Vec<Document>,
    ) -> Result<ReplaceOutcome, CatalogError> {
        let owner_id = normalize::datacenter(owner).id;
        let docs = payloads
            .into_iter()
            .map(|payload| {
                without_native_id(owned_by(prepare_write(payload, self.snapshots), &owner_id))
            })
            .collect();
        let outcome = self
            .store
            .replace_many(
                Collection::PlacedModules,
                &any_of("datacenter_id", &aliases(owner)),
                docs,
            )
            .await?;
        tracing::info!(
            datacenter_id = %owner_id,
            removed = outcome.deleted,
            placed = outcome.inserted.len(),
            "datacenter layout replaced"
        );
        Ok(outcome)
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::repository::{Catalog, CatalogOptions};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let modules = vec![
            doc(json!({"id": "rack_1", "Name": "rack_1", "dim": [2, 2]})),
            doc(json!({"id": "pump_1", "Name": "pump_1"})),
        ];
        let style = doc(json!({
            "id": "compact",
            "name": "Compact",
            "description": "Small",
            "dim": [200, 100],
            "grid_connection": 2
        }));
        assert!(store.insert_many(Collection::Modules, modules).await.is_ok());
        assert!(store.insert_one(Collection::DatacenterStyles, style).await.is_ok());
        store
    }

    fn layout(style_id: &str, ids: &[&str]) -> LayoutRequest {
        LayoutRequest {
            style_id: style_id.to_owned(),
            modules: ids
                .iter()
                .enumerate()
                .map(|(i, id)| ModulePlacement {
                    id: (*id).to_owned(),
                    position: Coordinates { x: i64::try_from(i).unwrap(), y: 0 },
                    rotation: 90,
                })
                .collect(),
            ..LayoutRequest::default()
        }
    }

    #[tokio::test]
    async fn create_from_style_copies_the_site_and_reports_missing_modules() {
        let store = seeded().await;
        let repo = DatacenterRepository::new(&store, SnapshotPolicy::ReferenceOnly);

        let created = repo
            .create_from_style(layout("compact", &["rack_1", "ghost", "pump_1"]))
            .await
            .unwrap();
        let dc = &created.datacenter;
        assert_eq!(dc.name, "Datacenter using Compact");
        assert_eq!(dc.description.as_deref(), Some("Small"));
        assert_eq!(dc.dim, [200, 100]);
        assert_eq!(dc.grid_connection, 2);
        assert!(dc.created_at.is_some());
        assert_eq!(dc.modules.len(), 2);
        assert!(dc.modules.iter().all(|pm| pm.module.is_some() && pm.rotation == 90));
        assert_eq!(created.missing_modules, vec!["ghost".to_owned()]);
    }

    #[tokio::test]
    async fn unknown_style_is_not_found() {
        let store = seeded().await;
        let repo = DatacenterRepository::new(&store, SnapshotPolicy::ReferenceOnly);
        let result = repo.create_from_style(layout("nope", &[])).await;
        assert!(matches!(
            result,
            Err(CatalogError::NotFound { kind: EntityKind::Style, .. })
        ));
    }

    #[tokio::test]
    async fn delete_cascades_to_placed_modules_only() {
        let store = seeded().await;
        let repo = DatacenterRepository::new(&store, SnapshotPolicy::ReferenceOnly);
        let keep = repo
            .create(doc(json!({"name": "Keep"})), vec![doc(json!({"module_id": "rack_1"}))])
            .await
            .unwrap();
        let gone = repo
            .create(
                doc(json!({"name": "Gone"})),
                vec![doc(json!({"module_id": "rack_1"})), doc(json!({"module_id": "pump_1"}))],
            )
            .await
            .unwrap();

        let deleted = repo.delete(&gone.id).await.unwrap();
        assert_eq!(deleted, Some(DeletedDatacenter { placed_modules: 2 }));
        assert!(repo.get(&gone.id, false).await.unwrap().is_none());

        let survivors = store
            .count(Collection::PlacedModules, &Filter::All)
            .await
            .unwrap();
        assert_eq!(survivors, 1);
        assert_eq!(store.count(Collection::Modules, &Filter::All).await.unwrap(), 2);
        assert_eq!(
            store.count(Collection::DatacenterStyles, &Filter::All).await.unwrap(),
            1
        );
        assert_eq!(
            repo.get(&keep.id, true).await.unwrap().map(|dc| dc.modules.len()),
            Some(1)
        );
        assert!(repo.delete(&gone.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn children_stamped_with_application_id_still_belong() {
        let store = seeded().await;
        let repo = DatacenterRepository::new(&store, SnapshotPolicy::ReferenceOnly);
        let dc = doc(json!({"id": "dc-main", "name": "Main"}));
        let child = doc(json!({"datacenter_id": "dc-main", "module_id": "rack_1"}));
        assert!(store.insert_one(Collection::Datacenters, dc).await.is_ok());
        assert!(store.insert_one(Collection::PlacedModules, child).await.is_ok());

        let loaded = repo.get("dc-main", true).await.unwrap();
        assert_eq!(loaded.map(|dc| dc.modules.len()), Some(1));
        assert_eq!(
            repo.delete("dc-main").await.unwrap(),
            Some(DeletedDatacenter { placed_modules: 1 })
        );
    }

    #[tokio::test]
    async fn update_with_modules_replaces_the_set() {
        let store = seeded().await;
        let repo = DatacenterRepository::new(&store, SnapshotPolicy::ReferenceOnly);
        let created = repo
            .create(doc(json!({"name": "A"})), vec![doc(json!({"module_id": "rack_1"}))])
            .await
            .map(|dc| dc.id)
            .unwrap();

        let fields = doc(json!({
            "name": "B",
            "modules": [{"module_id": "pump_1"}, {"module_id": "pump_1"}]
        }));
        let updated = repo.update(&created, fields).await.unwrap();
        assert_eq!(updated.as_ref().map(|dc| dc.name.as_str()), Some("B"));
        let module_ids: Vec<_> = updated
            .iter()
            .flat_map(|dc| dc.modules.iter())
            .filter_map(|pm| pm.module_id.as_deref())
            .collect();
        assert_eq!(module_ids, vec!["pump_1", "pump_1"]);

        let plain = repo.update(&created, doc(json!({"name": "C"}))).await.unwrap();
        assert_eq!(plain.map(|dc| dc.modules.len()), Some(2));
        assert!(repo.update("missing", Document::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_layout_swaps_modules_and_keeps_snapshots() {
        let store = seeded().await;
        let repo = DatacenterRepository::new(&store, SnapshotPolicy::KeepSnapshot);
        let created = repo
            .create_from_style(layout("compact", &["rack_1"]))
            .await
            .map(|c| c.datacenter.id)
            .unwrap();

        let relaid = repo
            .replace_layout(&created, layout("compact", &["pump_1", "pump_1", "ghost"]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(relaid.datacenter.modules.len(), 2);
        assert_eq!(relaid.missing_modules, vec!["ghost".to_owned()]);

        let raw = store
            .find_one(Collection::PlacedModules, &Filter::All)
            .await
            .unwrap()
            .unwrap();
        assert!(raw.get("module").is_some_and(Value::is_object));
        assert_eq!(raw.get("module_id"), Some(&json!("pump_1")));
    }

    #[tokio::test]
    async fn default_layout_save_stores_only_references() {
        let catalog = Catalog::new(seeded().await, CatalogOptions::default());
        let created = catalog
            .datacenters()
            .create_from_style(layout("compact", &["rack_1"]))
            .await
            .unwrap();
        let placed = created.datacenter.modules.first().unwrap();
        assert_eq!(placed.module.as_ref().map(|m| m.id.as_str()), Some("rack_1"));

        let raw = catalog
            .store()
            .find_one(Collection::PlacedModules, &Filter::All)
            .await
            .unwrap()
            .unwrap();
        assert!(!raw.contains_key("module"));
        assert_eq!(raw.get("module_id"), Some(&json!("rack_1")));
    }

    #[tokio::test]
    async fn placed_module_update_follows_the_new_reference() {
        for policy in [SnapshotPolicy::ReferenceOnly, SnapshotPolicy::KeepSnapshot] {
            let options = CatalogOptions {
                layout_snapshots: policy,
                ..CatalogOptions::default()
            };
            let catalog = Catalog::new(seeded().await, options);
            let created = catalog
                .datacenters()
                .create_from_style(layout("compact", &["rack_1"]))
                .await
                .unwrap();
            let placed_id = created.datacenter.modules.first().map(|pm| pm.id.clone()).unwrap();

            let updated = catalog
                .placed_modules()
                .update(&placed_id, doc(json!({"module_id": "pump_1"})))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(updated.module_id.as_deref(), Some("pump_1"));
            assert_eq!(updated.module.map(|m| m.id).as_deref(), Some("pump_1"), "{policy:?}");

            let reloaded = catalog.datacenters().get(&created.datacenter.id, true).await.unwrap();
            let module_ids: Vec<_> = reloaded
                .iter()
                .flat_map(|dc| dc.modules.iter())
                .filter_map(|pm| pm.module.as_ref().map(|m| m.id.clone()))
                .collect();
            assert_eq!(module_ids, vec!["pump_1".to_owned()]);
        }
    }

    #[tokio::test]
    async fn add_and_remove_modules() {
        let store = seeded().await;
        let repo = DatacenterRepository::new(&store, SnapshotPolicy::ReferenceOnly);
        let first = repo.create(doc(json!({"name": "One"})), Vec::new()).await.unwrap().id;
        let second = repo.create(doc(json!({"name": "Two"})), Vec::new()).await.unwrap().id;

        let grown = repo
            .add_module(&first, doc(json!({"id": "pm-1", "module_id": "rack_1"})))
            .await
            .unwrap();
        let placed_id = grown
            .as_ref()
            .and_then(|dc| dc.modules.first())
            .map(|pm| pm.id.clone())
            .unwrap();
        assert!(!placed_id.is_empty());

        let foreign = repo.remove_module(&second, &placed_id).await;
        assert!(matches!(foreign, Err(CatalogError::Invalid(_))));
        let unknown = repo.remove_module(&first, "nope").await;
        assert!(matches!(unknown, Err(CatalogError::NotFound { .. })));

        let shrunk = repo.remove_module(&first, &placed_id).await.unwrap();
        assert_eq!(shrunk.map(|dc| dc.modules.len()), Some(0));
    }

    #[tokio::test]
    async fn search_list_and_style_queries() {
        let store = seeded().await;
        let repo = DatacenterRepository::new(&store, SnapshotPolicy::ReferenceOnly);
        for (name, style) in [("North (A)", "compact"), ("South", "compact"), ("East", "other")] {
            let fields = doc(json!({"name": name, "description": "site", "style_id": style}));
            assert!(repo.create(fields, Vec::new()).await.is_ok());
        }

        assert_eq!(repo.search("(a)", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("SITE", 2).await.unwrap().len(), 2);
        assert_eq!(repo.list_by_style("compact").await.unwrap().len(), 2);

        let page = repo
            .list(false, FindOptions::default().with_skip(1).with_limit(1))
            .await;
        assert_eq!(page.as_ref().map(|p| p.total).unwrap(), 3);
        assert_eq!(page.map(|p| p.datacenters.len()).unwrap(), 1);
    }
}
