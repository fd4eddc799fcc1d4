//! Canonical catalog records.
//!
//! These are the generation-agnostic shapes every caller above the catalog
//! layer works with. Stored documents may use either the legacy capitalised
//! field names (`Name`, `ID`, `Is_Input`, ...) or the modern snake_case
//! names; `designer-catalog` folds both into the structs defined here.
//!
//! Absent optional fields are skipped on serialization so that a record
//! serialized back into a document normalizes to itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::enums::Focus;

/// A footprint or grid size as `[width, height]`.
pub type Dim = [i64; 2];

/// Footprint used for datacenters whose document carries no `dim`.
pub const DEFAULT_DATACENTER_DIM: Dim = [1000, 1000];

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// Optional resource figures shared by modules.
///
/// Every field is independently nullable. A missing figure is never read
/// as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// Purchase price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    /// Water supplied (kL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplied_water: Option<i64>,
    /// Water consumed (kL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_usage: Option<i64>,
    /// Chilled water (kL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chilled_water: Option<i64>,
    /// Distilled water (kL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distilled_water: Option<i64>,
    /// Fresh water (kL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fresh_water: Option<i64>,
    /// Usable power.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usable_power: Option<i64>,
    /// Processing capacity (TFLOPS).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing: Option<i64>,
    /// Storage capacity (TB).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_capacity: Option<i64>,
    /// Network capacity (Gbps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_capacity: Option<i64>,
    /// Internal network throughput.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_network: Option<i64>,
    /// External network throughput.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_network: Option<i64>,
    /// Data storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_storage: Option<i64>,
    /// Grid connections provided or required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_connection: Option<i64>,
    /// Water connections provided or required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_connection: Option<i64>,
}

/// A placeable hardware module.
///
/// Legacy-generation documents keep their capitalised companion fields
/// (`ID`, `Name`, `Is_Input`, `Is_Output`, `Unit`, `Amount`) next to the
/// modern fields derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Module {
    /// Application identifier (falls back to the store-native id).
    pub id: String,
    /// Legacy identifier.
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    /// Legacy name, usually `<type>_<size>`.
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Legacy input flag.
    #[serde(rename = "Is_Input", default, skip_serializing_if = "Option::is_none")]
    pub is_input: Option<i64>,
    /// Legacy output flag.
    #[serde(rename = "Is_Output", default, skip_serializing_if = "Option::is_none")]
    pub is_output: Option<i64>,
    /// Legacy unit name.
    #[serde(rename = "Unit", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Legacy amount for [`Module::unit`].
    #[serde(rename = "Amount", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Module category, e.g. `transformer`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    /// Footprint as `[width, height]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<Dim>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resource figures.
    #[serde(flatten)]
    pub resources: Resources,
}

// ---------------------------------------------------------------------------
// Datacenter style
// ---------------------------------------------------------------------------

/// A template datacenters are created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DatacenterStyle {
    /// Style identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Grid connections available to the site.
    pub grid_connection: i64,
    /// Water connections available to the site.
    pub water_connection: i64,
    /// Site footprint as `[width, height]`.
    pub dim: Dim,
    /// Workload focus.
    pub focus: Focus,
    /// Target processing capacity.
    pub processing: Option<i64>,
    /// Budget.
    pub price: Option<i64>,
    /// Target data storage.
    pub data_storage: Option<i64>,
    /// Ordered list of recommended module ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_modules: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Datacenter specs
// ---------------------------------------------------------------------------

/// One unit-scoped specification row.
///
/// Several rows share one component identifier (`ID`); each contributes
/// one `Unit`/`Amount` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RawDatacenterSpec {
    /// Store-native identifier of this row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Component identifier shared by all rows of one logical spec.
    #[serde(rename = "ID", default)]
    pub component_id: String,
    /// Display name.
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lower threshold.
    #[serde(rename = "Below_Amount", default, skip_serializing_if = "Option::is_none")]
    pub below_amount: Option<i64>,
    /// Upper threshold.
    #[serde(rename = "Above_Amount", default, skip_serializing_if = "Option::is_none")]
    pub above_amount: Option<i64>,
    /// Minimize flag.
    #[serde(rename = "Minimize", default, skip_serializing_if = "Option::is_none")]
    pub minimize: Option<i64>,
    /// Maximize flag.
    #[serde(rename = "Maximize", default, skip_serializing_if = "Option::is_none")]
    pub maximize: Option<i64>,
    /// Unconstrained flag.
    #[serde(rename = "Unconstrained", default, skip_serializing_if = "Option::is_none")]
    pub unconstrained: Option<i64>,
    /// Physical quantity this row measures.
    #[serde(rename = "Unit", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Value for [`RawDatacenterSpec::unit`].
    #[serde(rename = "Amount", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Display description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workload focus, kept as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    /// Site footprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<Dim>,
    /// Resource figures carried by modern rows.
    #[serde(flatten)]
    pub resources: Resources,
}

/// One merged specification per component identifier.
///
/// A read-time projection: the base row's descriptive fields plus one
/// snake_case field per unit row, mapped to that row's amount. The field
/// set is open-ended, so the record is held as an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeDatacenterSpec {
    fields: Map<String, Value>,
}

impl CompositeDatacenterSpec {
    /// Wrap an already-merged field map.
    pub const fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Component identifier of the merged rows.
    pub fn component_id(&self) -> Option<&str> {
        self.fields.get("ID").and_then(Value::as_str)
    }

    /// Store-native identifier of the base row.
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    /// Look up any field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Look up an integer field.
    pub fn integer(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(Value::as_i64)
    }

    /// Set a field, returning the value it replaced.
    pub fn set(&mut self, field: String, value: Value) -> Option<Value> {
        self.fields.insert(field, value)
    }

    /// Borrow the underlying field map.
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume into the underlying field map.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Grid coordinates of a placed module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinates {
    /// Horizontal grid position.
    pub x: i64,
    /// Vertical grid position.
    pub y: i64,
}

/// A module instance placed inside a datacenter.
///
/// `module` is either the embedded snapshot or the module resolved from
/// `module_id` on read. It is `null` when the reference dangles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlacedModule {
    /// Placed-module identifier.
    pub id: String,
    /// Referenced module id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    /// Embedded or resolved module.
    pub module: Option<Module>,
    /// Grid position.
    pub position: Coordinates,
    /// Rotation in degrees. Usually one of 0, 90, 180 or 270.
    pub rotation: i64,
    /// Owning datacenter.
    pub datacenter_id: Option<String>,
}

/// A datacenter design: a site plus the modules placed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Datacenter {
    /// Datacenter identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: Option<String>,
    /// Style the design was created from. Not enforced.
    pub style_id: Option<String>,
    /// Site footprint.
    pub dim: Dim,
    /// Grid connections available to the site.
    pub grid_connection: i64,
    /// Water connections available to the site.
    pub water_connection: i64,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Placed modules owned by this datacenter.
    pub modules: Vec<PlacedModule>,
}

/// A labelled coordinate, optionally tied to a module or datacenter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Position identifier.
    pub id: String,
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
    /// Optional label.
    pub name: Option<String>,
    /// Module this position belongs to.
    pub module_id: Option<String>,
    /// Datacenter this position belongs to.
    pub datacenter_id: Option<String>,
}
