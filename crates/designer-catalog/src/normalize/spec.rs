use designer_types::RawDatacenterSpec;

use super::module::resources;
use super::rules::{self, FieldRule, Transform, rule};
use crate::document::{self, Document};

use Transform::{Dim, Identifier, Integer, Text};

/// Spec row fields. Rows keep the capitalised names; modern rows carry the
/// descriptive snake_case fields as well.
pub const SPEC_RULES: &[FieldRule] = &[
    rule("ID", "ID", Identifier),
    rule("Name", "Name", Text),
    rule("name", "Name", Text),
    rule("Below_Amount", "Below_Amount", Integer),
    rule("Above_Amount", "Above_Amount", Integer),
    rule("Minimize", "Minimize", Integer),
    rule("Maximize", "Maximize", Integer),
    rule("Unconstrained", "Unconstrained", Integer),
    rule("Unit", "Unit", Text),
    rule("unit", "Unit", Text),
    rule("Amount", "Amount", Integer),
    rule("amount", "Amount", Integer),
    rule("description", "description", Text),
    rule("Description", "description", Text),
    rule("focus", "focus", Text),
    rule("Focus", "focus", Text),
    rule("dim", "dim", Dim),
    rule("price", "price", Integer),
    rule("Price", "price", Integer),
    rule("processing", "processing", Integer),
    rule("data_storage", "data_storage", Integer),
    rule("grid_connection", "grid_connection", Integer),
    rule("water_connection", "water_connection", Integer),
    rule("usable_power", "usable_power", Integer),
    rule("water_usage", "water_usage", Integer),
    rule("storage_capacity", "storage_capacity", Integer),
    rule("network_capacity", "network_capacity", Integer),
];

/// Normalize one raw spec row.
///
/// The store-native id is exposed as `id`; the component identifier stays
/// under `ID`.
pub fn spec(raw: &Document) -> RawDatacenterSpec {
    let fields = rules::apply(SPEC_RULES, raw);

    RawDatacenterSpec {
        id: document::native_id(raw).or_else(|| document::application_id(raw)),
        component_id: rules::string(&fields, "ID").unwrap_or_default(),
        name: rules::string(&fields, "Name"),
        below_amount: rules::int(&fields, "Below_Amount"),
        above_amount: rules::int(&fields, "Above_Amount"),
        minimize: rules::int(&fields, "Minimize"),
        maximize: rules::int(&fields, "Maximize"),
        unconstrained: rules::int(&fields, "Unconstrained"),
        unit: rules::string(&fields, "Unit"),
        amount: rules::int(&fields, "Amount"),
        description: rules::string(&fields, "description"),
        focus: rules::string(&fields, "focus"),
        dim: rules::dim(&fields, "dim"),
        resources: resources(&fields),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    #[test]
    fn legacy_row_keeps_capitalised_fields() {
        let row = spec(&doc(json!({
            "_id": "507f1f77bcf86cd799439011",
            "ID": "server_square",
            "Name": "Server Square",
            "Below_Amount": 1,
            "Above_Amount": 0,
            "Minimize": 0,
            "Maximize": 1,
            "Unconstrained": 0,
            "Unit": "Processing",
            "Amount": 500
        })));
        assert_eq!(row.id.as_deref(), Some("507f1f77bcf86cd799439011"));
        assert_eq!(row.component_id, "server_square");
        assert_eq!(row.unit.as_deref(), Some("Processing"));
        assert_eq!(row.amount, Some(500));
        assert_eq!(row.maximize, Some(1));
    }

    #[test]
    fn modern_descriptive_fields_pass_through() {
        let row = spec(&doc(json!({
            "ID": "dc_1",
            "description": "Compute site",
            "focus": "processing",
            "dim": [100, 50],
            "price": 1000
        })));
        assert_eq!(row.description.as_deref(), Some("Compute site"));
        assert_eq!(row.focus.as_deref(), Some("processing"));
        assert_eq!(row.dim, Some([100, 50]));
        assert_eq!(row.resources.price, Some(1000));
    }
}
