//! Embedded-versus-referenced modules inside placed modules.
//!
//! A placed module either embeds a full module snapshot or stores only a
//! `module_id`. On read, [`ModuleReferenceResolver`] follows references and
//! attaches the live module. A reference that no longer resolves leaves
//! `module` empty and is logged; it is not an error. On write,
//! [`prepare_write`] turns an embedded module into a reference.

use designer_types::PlacedModule;
use serde_json::Value;

use crate::document::{self, Document};
use crate::error::StoreError;
use crate::normalize;
use crate::resolver::{IdentifierResolver, reference_plan};
use crate::store::DocumentStore;

/// Whether a write keeps the embedded module next to its reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotPolicy {
    /// Persist only `module_id`.
    #[default]
    ReferenceOnly,
    /// Persist `module_id` and the embedded snapshot, for history.
    KeepSnapshot,
}

impl SnapshotPolicy {
    /// `KeepSnapshot` when `keep` is set.
    pub const fn from_keep(keep: bool) -> Self {
        if keep {
            Self::KeepSnapshot
        } else {
            Self::ReferenceOnly
        }
    }
}

/// How a placed module carries its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState<'a> {
    /// A full module is embedded.
    Embedded,
    /// Only a reference is stored.
    Reference(&'a str),
    /// Neither.
    Detached,
}

impl<'a> ModuleState<'a> {
    /// Classify a normalized placed module.
    pub fn of(placed: &'a PlacedModule) -> Self {
        match (&placed.module, placed.module_id.as_deref()) {
            (Some(_), _) => Self::Embedded,
            (None, Some(id)) if !id.trim().is_empty() => Self::Reference(id),
            (None, _) => Self::Detached,
        }
    }
}

/// Turn an embedded module in a placed-module payload into a reference.
///
/// `module_id` is taken from the embedded module's `id`, else its `_id`,
/// and overrides any stale `module_id` in the payload. A scalar `module`
/// value is moved to `module_id`. Under [`SnapshotPolicy::ReferenceOnly`]
/// the embedded object is dropped.
pub fn prepare_write(mut payload: Document, policy: SnapshotPolicy) -> Document {
    let Some(module) = payload.remove("module") else {
        return payload;
    };

    match module {
        Value::Object(fields) => {
            let reference =
                document::application_id(&fields).or_else(|| document::native_id(&fields));
            if let Some(reference) = reference {
                payload.insert("module_id".to_owned(), Value::String(reference));
            }
            if policy == SnapshotPolicy::KeepSnapshot {
                payload.insert("module".to_owned(), Value::Object(fields));
            }
        }
        Value::Null => {}
        scalar => {
            if !payload.contains_key("module_id") {
                if let Some(reference) = document::identifier(&scalar) {
                    payload.insert("module_id".to_owned(), Value::String(reference));
                }
            }
        }
    }
    payload
}

/// Populates referenced modules on read.
#[derive(Debug)]
pub struct ModuleReferenceResolver<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> ModuleReferenceResolver<'a, S> {
    /// Create a resolver bound to a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Normalize a stored placed module and attach its module.
    pub async fn resolve(&self, raw: &Document) -> Result<PlacedModule, StoreError> {
        let placed = normalize::placed_module(raw);
        self.populate(placed).await
    }

    /// Resolve several stored placed modules, in order.
    pub async fn resolve_all(&self, raws: &[Document]) -> Result<Vec<PlacedModule>, StoreError> {
        let mut resolved = Vec::with_capacity(raws.len());
        for raw in raws {
            resolved.push(self.resolve(raw).await?);
        }
        Ok(resolved)
    }

    /// Attach the referenced module to an already-normalized placed module.
    ///
    /// Embedded modules are returned as they are.
    pub async fn populate(&self, mut placed: PlacedModule) -> Result<PlacedModule, StoreError> {
        let ModuleState::Reference(module_id) = ModuleState::of(&placed) else {
            return Ok(placed);
        };
        let module_id = module_id.to_owned();

        let plan = reference_plan(&module_id);
        match IdentifierResolver::new(self.store).run(&plan).await? {
            Some(hit) => placed.module = Some(normalize::module(&hit.document)),
            None => {
                tracing::warn!(
                    placed_module = %placed.id,
                    module_id = %module_id,
                    "placed module references a missing module"
                );
            }
        }
        Ok(placed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::Collection;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    #[test]
    fn write_path_keeps_only_the_reference() {
        let payload = doc(json!({
            "module": {"id": "rack_1", "Name": "rack_1"},
            "position": {"x": 1, "y": 1}
        }));
        let stored = prepare_write(payload, SnapshotPolicy::ReferenceOnly);
        assert_eq!(stored.get("module_id"), Some(&json!("rack_1")));
        assert!(!stored.contains_key("module"));
    }

    #[test]
    fn write_path_can_keep_a_snapshot() {
        let payload = doc(json!({"module": {"_id": "507f1f77bcf86cd799439011"}}));
        let stored = prepare_write(payload, SnapshotPolicy::KeepSnapshot);
        assert_eq!(
            stored.get("module_id"),
            Some(&json!("507f1f77bcf86cd799439011"))
        );
        assert!(stored.get("module").is_some_and(Value::is_object));
    }

    #[test]
    fn write_path_moves_scalar_modules() {
        let stored = prepare_write(doc(json!({"module": "rack_9"})), SnapshotPolicy::KeepSnapshot);
        assert_eq!(stored.get("module_id"), Some(&json!("rack_9")));
        assert!(!stored.contains_key("module"));

        let untouched =
            prepare_write(doc(json!({"module_id": "rack_1"})), SnapshotPolicy::ReferenceOnly);
        assert_eq!(untouched.get("module_id"), Some(&json!("rack_1")));
    }

    #[tokio::test]
    async fn reference_resolves_to_the_canonical_module() {
        let store = MemoryStore::new();
        let rack = doc(json!({"id": "rack_1", "Name": "rack_1", "dim": [2, 2]}));
        assert!(store.insert_one(Collection::Modules, rack).await.is_ok());
        let stored_rack = store
            .find_one(Collection::Modules, &crate::filter::Filter::eq("id", "rack_1"))
            .await
            .unwrap()
            .unwrap();

        let resolver = ModuleReferenceResolver::new(&store);
        let placed = resolver
            .resolve(&doc(json!({"id": "pm-1", "module_id": "rack_1"})))
            .await
            .unwrap();
        assert_eq!(placed.module, Some(normalize::module(&stored_rack)));
    }

    #[tokio::test]
    async fn reference_by_native_id_resolves() {
        let store = MemoryStore::new();
        let native = store
            .insert_one(Collection::Modules, doc(json!({"Name": "pump_5"})))
            .await
            .unwrap();

        let placed = ModuleReferenceResolver::new(&store)
            .resolve(&doc(json!({"id": "pm-1", "module_id": native})))
            .await
            .unwrap();
        assert_eq!(
            placed.module.and_then(|m| m.module_type).as_deref(),
            Some("pump")
        );
    }

    #[tokio::test]
    async fn dangling_reference_leaves_module_empty() {
        let store = MemoryStore::new();
        let result = ModuleReferenceResolver::new(&store)
            .resolve(&doc(json!({"id": "pm-1", "module_id": "ghost"})))
            .await;
        assert!(result.is_ok());
        let placed = result.unwrap();
        assert_eq!(placed.module, None);
        assert_eq!(placed.module_id.as_deref(), Some("ghost"));
    }

    #[tokio::test]
    async fn embedded_module_is_left_alone() {
        let store = MemoryStore::new();
        let placed = ModuleReferenceResolver::new(&store)
            .resolve(&doc(json!({"module": {"id": "snap"}, "module_id": "live"})))
            .await
            .unwrap();
        assert_eq!(placed.module.map(|m| m.id).as_deref(), Some("snap"));
    }
}
