use designer_types::{Module, Resources};

use super::rules::{self, FieldRule, Transform, rule};
use crate::document::{self, Document, LEGACY_ID};

use Transform::{Dim, Identifier, Integer, Text};

/// Module fields, modern spelling first, then the title-cased legacy
/// spelling, then irregular legacy spellings seen in older imports.
pub const MODULE_RULES: &[FieldRule] = &[
    // Modern.
    rule("type", "type", Text),
    rule("dim", "dim", Dim),
    rule("description", "description", Text),
    rule("price", "price", Integer),
    rule("supplied_water", "supplied_water", Integer),
    rule("water_usage", "water_usage", Integer),
    rule("chilled_water", "chilled_water", Integer),
    rule("distilled_water", "distilled_water", Integer),
    rule("fresh_water", "fresh_water", Integer),
    rule("usable_power", "usable_power", Integer),
    rule("processing", "processing", Integer),
    rule("storage_capacity", "storage_capacity", Integer),
    rule("network_capacity", "network_capacity", Integer),
    rule("internal_network", "internal_network", Integer),
    rule("external_network", "external_network", Integer),
    rule("data_storage", "data_storage", Integer),
    rule("grid_connection", "grid_connection", Integer),
    rule("water_connection", "water_connection", Integer),
    // Title-cased legacy.
    rule("Description", "description", Text),
    rule("Price", "price", Integer),
    rule("Supplied_Water", "supplied_water", Integer),
    rule("Water_Usage", "water_usage", Integer),
    rule("Chilled_Water", "chilled_water", Integer),
    rule("Distilled_Water", "distilled_water", Integer),
    rule("Fresh_Water", "fresh_water", Integer),
    rule("Usable_Power", "usable_power", Integer),
    rule("Processing", "processing", Integer),
    rule("Storage_Capacity", "storage_capacity", Integer),
    rule("Network_Capacity", "network_capacity", Integer),
    rule("Internal_Network", "internal_network", Integer),
    rule("External_Network", "external_network", Integer),
    rule("Data_Storage", "data_storage", Integer),
    rule("Grid_Connection", "grid_connection", Integer),
    rule("Water_Connection", "water_connection", Integer),
    // Irregular legacy.
    rule("Supplied_water", "supplied_water", Integer),
    rule("Water_usage", "water_usage", Integer),
    rule("Chilled_water", "chilled_water", Integer),
    rule("Distilled_water", "distilled_water", Integer),
    rule("Fresh_water", "fresh_water", Integer),
    rule("Usable_power", "usable_power", Integer),
    rule("Storage_capacity", "storage_capacity", Integer),
    rule("Network_capacity", "network_capacity", Integer),
    rule("Internal_network", "internal_network", Integer),
    rule("External_network", "external_network", Integer),
    rule("Data_storage", "data_storage", Integer),
    rule("Grid_connection", "grid_connection", Integer),
    rule("Water_connection", "water_connection", Integer),
    // Legacy companions, kept under their own names.
    rule("ID", "ID", Identifier),
    rule("Name", "Name", Text),
    rule("Is_Input", "Is_Input", Integer),
    rule("Is_Output", "Is_Output", Integer),
    rule("Unit", "Unit", Text),
    rule("Amount", "Amount", Integer),
];

/// Normalize a module document of either generation.
pub fn module(raw: &Document) -> Module {
    let fields = rules::apply(MODULE_RULES, raw);
    let native = document::native_id(raw);

    let id = document::application_id(raw)
        .or_else(|| native.clone())
        .unwrap_or_default();
    let legacy_id = rules::string(&fields, LEGACY_ID).or(native);
    let name = rules::string(&fields, "Name");
    let module_type = rules::string(&fields, "type")
        .or_else(|| name.as_deref().and_then(type_from_name));
    let dim = rules::dim(&fields, "dim").or_else(|| space_dim(raw));

    Module {
        id,
        legacy_id,
        name,
        is_input: rules::int(&fields, "Is_Input"),
        is_output: rules::int(&fields, "Is_Output"),
        unit: rules::string(&fields, "Unit"),
        amount: rules::int(&fields, "Amount"),
        module_type,
        dim,
        description: rules::string(&fields, "description"),
        resources: resources(&fields),
    }
}

/// Read the resource figures from an already rule-mapped document.
pub(crate) fn resources(fields: &Document) -> Resources {
    Resources {
        price: rules::int(fields, "price"),
        supplied_water: rules::int(fields, "supplied_water"),
        water_usage: rules::int(fields, "water_usage"),
        chilled_water: rules::int(fields, "chilled_water"),
        distilled_water: rules::int(fields, "distilled_water"),
        fresh_water: rules::int(fields, "fresh_water"),
        usable_power: rules::int(fields, "usable_power"),
        processing: rules::int(fields, "processing"),
        storage_capacity: rules::int(fields, "storage_capacity"),
        network_capacity: rules::int(fields, "network_capacity"),
        internal_network: rules::int(fields, "internal_network"),
        external_network: rules::int(fields, "external_network"),
        data_storage: rules::int(fields, "data_storage"),
        grid_connection: rules::int(fields, "grid_connection"),
        water_connection: rules::int(fields, "water_connection"),
    }
}

/// `transformer_100` is a `transformer`.
fn type_from_name(name: &str) -> Option<String> {
    name.split_once('_')
        .map(|(prefix, _)| prefix)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_lowercase)
}

/// Legacy footprint split over `Space_X` and `Space_Y`. Both are required.
fn space_dim(raw: &Document) -> Option<designer_types::Dim> {
    let x = raw.get("Space_X").and_then(document::integer)?;
    let y = raw.get("Space_Y").and_then(document::integer)?;
    Some([x, y])
}
