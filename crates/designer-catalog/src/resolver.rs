//! Identifier resolution across competing key spaces.
//!
//! A caller-supplied identifier may be a store-native object id, an
//! application `id`, a legacy `ID`, or (for specs) a component identifier.
//! [`lookup_plan`] turns a candidate into an ordered list of filters for
//! one entity kind; [`IdentifierResolver::resolve`] runs the plan against
//! a store and returns the first hit.
//!
//! Planning never fails. A candidate that is not a syntactically valid
//! object id simply has no native-id step.
//!
//! | Kind | Steps, in order |
//! |------|-----------------|
//! | module | `id`, `id` ignoring case, `_id`, legacy `ID` |
//! | spec | `_id`, `id`, component `ID` |
//! | every other kind | `_id`, `id` |

use serde_json::Value;

use crate::document::{self, APPLICATION_ID, Document, LEGACY_ID};
use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::{Collection, DocumentStore};

/// The entity kinds the catalog stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    /// Hardware module.
    Module,
    /// Datacenter style.
    Style,
    /// Datacenter spec row.
    Spec,
    /// Datacenter design.
    Datacenter,
    /// Placed module.
    PlacedModule,
    /// Standalone position.
    Position,
}

impl EntityKind {
    /// Collection holding this kind.
    pub const fn collection(self) -> Collection {
        match self {
            Self::Module => Collection::Modules,
            Self::Style => Collection::DatacenterStyles,
            Self::Spec => Collection::DatacenterSpecs,
            Self::Datacenter => Collection::Datacenters,
            Self::PlacedModule => Collection::PlacedModules,
            Self::Position => Collection::Positions,
        }
    }

    /// Human-readable name for messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Style => "datacenter style",
            Self::Spec => "datacenter spec",
            Self::Datacenter => "datacenter",
            Self::PlacedModule => "placed module",
            Self::Position => "position",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// The key space a lookup step searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpace {
    /// Exact application `id`.
    ApplicationId,
    /// Application `id`, ignoring case.
    ApplicationIdIgnoreCase,
    /// Store-native `_id`.
    NativeId,
    /// Legacy capitalised `ID`.
    LegacyId,
    /// Spec component identifier (`ID`).
    ComponentId,
}

impl KeySpace {
    /// Name used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationId => "id",
            Self::ApplicationIdIgnoreCase => "id (ignore case)",
            Self::NativeId => "_id",
            Self::LegacyId => "legacy ID",
            Self::ComponentId => "component ID",
        }
    }
}

/// One step of a lookup plan.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupStep {
    /// Key space searched.
    pub key_space: KeySpace,
    /// Filter to run.
    pub filter: Filter,
}

impl LookupStep {
    fn new(key_space: KeySpace, filter: Filter) -> Self {
        Self { key_space, filter }
    }
}

/// Ordered lookup steps for one candidate; the first step with a hit wins.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupPlan {
    /// Kind being looked up.
    pub kind: EntityKind,
    /// Steps in priority order. Empty for a blank candidate.
    pub steps: Vec<LookupStep>,
}

/// Build the lookup plan for `candidate` under `kind`.
pub fn lookup_plan(kind: EntityKind, candidate: &str) -> LookupPlan {
    let mut steps = Vec::new();
    if candidate.trim().is_empty() {
        return LookupPlan { kind, steps };
    }

    let native = document::parse_object_id(candidate)
        .map(|hex| LookupStep::new(KeySpace::NativeId, Filter::ObjectId(hex)));
    let application = LookupStep::new(
        KeySpace::ApplicationId,
        Filter::eq(APPLICATION_ID, candidate),
    );

    match kind {
        EntityKind::Module => {
            steps.push(application);
            steps.push(LookupStep::new(
                KeySpace::ApplicationIdIgnoreCase,
                Filter::eq_ignore_case(APPLICATION_ID, candidate),
            ));
            steps.extend(native);
            steps.push(LookupStep::new(
                KeySpace::LegacyId,
                Filter::eq(LEGACY_ID, candidate),
            ));
        }
        EntityKind::Spec => {
            steps.extend(native);
            steps.push(application);
            steps.push(LookupStep::new(
                KeySpace::ComponentId,
                Filter::eq(LEGACY_ID, candidate),
            ));
        }
        EntityKind::Style
        | EntityKind::Datacenter
        | EntityKind::PlacedModule
        | EntityKind::Position => {
            steps.extend(native);
            steps.push(application);
        }
    }

    LookupPlan { kind, steps }
}

/// Plan for following a placed module's `module_id`: the string id first,
/// then the native id.
pub fn reference_plan(candidate: &str) -> LookupPlan {
    let mut steps = Vec::new();
    if !candidate.trim().is_empty() {
        steps.push(LookupStep::new(
            KeySpace::ApplicationId,
            Filter::eq(APPLICATION_ID, candidate),
        ));
        steps.extend(
            document::parse_object_id(candidate)
                .map(|hex| LookupStep::new(KeySpace::NativeId, Filter::ObjectId(hex))),
        );
    }
    LookupPlan {
        kind: EntityKind::Module,
        steps,
    }
}

/// Filter selecting every spec row of a component.
///
/// A candidate that is a valid object id matches either that row's native
/// id or the component id; any other candidate matches the component id
/// only. Blank candidates select nothing.
pub fn component_filter(candidate: &str) -> Option<Filter> {
    if candidate.trim().is_empty() {
        return None;
    }
    let component = Filter::eq(LEGACY_ID, candidate);
    Some(match document::parse_object_id(candidate) {
        Some(hex) => Filter::Or(vec![Filter::ObjectId(hex), component]),
        None => component,
    })
}

/// The most precise filter addressing an already-fetched document: its
/// native id when present, its application id otherwise.
pub fn canonical_filter(doc: &Document) -> Option<Filter> {
    document::native_id(doc)
        .and_then(|id| document::parse_object_id(&id))
        .map(Filter::ObjectId)
        .or_else(|| {
            document::application_id(doc)
                .map(|id| Filter::Eq(APPLICATION_ID.to_owned(), Value::String(id)))
        })
}

/// A document found by running a lookup plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The matched document.
    pub document: Document,
    /// The step that produced it.
    pub step: LookupStep,
}

impl Resolution {
    /// Filter addressing the matched document for follow-up writes.
    pub fn filter(&self) -> Filter {
        canonical_filter(&self.document).unwrap_or_else(|| self.step.filter.clone())
    }
}

/// Runs lookup plans against a store.
#[derive(Debug)]
pub struct IdentifierResolver<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> IdentifierResolver<'a, S> {
    /// Create a resolver bound to a store.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Find the document `candidate` names under `kind`.
    ///
    /// Returns `Ok(None)` when no step matches.
    pub async fn resolve(
        &self,
        kind: EntityKind,
        candidate: &str,
    ) -> Result<Option<Resolution>, StoreError> {
        self.run(&lookup_plan(kind, candidate)).await
    }

    /// Run an explicit plan; the first step with a hit wins.
    pub async fn run(&self, plan: &LookupPlan) -> Result<Option<Resolution>, StoreError> {
        let collection = plan.kind.collection();
        for step in &plan.steps {
            if let Some(document) = self.store.find_one(collection, &step.filter).await? {
                tracing::debug!(
                    %collection,
                    key_space = step.key_space.as_str(),
                    filter = %step.filter.describe(),
                    "identifier resolved"
                );
                return Ok(Some(Resolution {
                    document,
                    step: step.clone(),
                }));
            }
        }
        tracing::debug!(%collection, steps = plan.steps.len(), "identifier did not resolve");
        Ok(None)
    }
}
