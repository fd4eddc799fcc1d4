use designer_types::{DatacenterStyle, Focus};

use super::rules::{self, FieldRule, Transform, rule};
use crate::document::{self, Document};

use Transform::{Dim, IdentifierList, Integer, Text};

/// Style fields: modern snake_case first, legacy capitalised second.
pub const STYLE_RULES: &[FieldRule] = &[
    rule("name", "name", Text),
    rule("Name", "name", Text),
    rule("description", "description", Text),
    rule("Description", "description", Text),
    rule("grid_connection", "grid_connection", Integer),
    rule("Grid_Connection", "grid_connection", Integer),
    rule("water_connection", "water_connection", Integer),
    rule("Water_Connection", "water_connection", Integer),
    rule("dim", "dim", Dim),
    rule("focus", "focus", Text),
    rule("Focus", "focus", Text),
    rule("processing", "processing", Integer),
    rule("Processing", "processing", Integer),
    rule("price", "price", Integer),
    rule("Price", "price", Integer),
    rule("data_storage", "data_storage", Integer),
    rule("Data_storage", "data_storage", Integer),
    rule("Data_Storage", "data_storage", Integer),
    rule("recommended_modules", "recommended_modules", IdentifierList),
    rule("Recommended_Modules", "recommended_modules", IdentifierList),
];

/// Normalize a style document of either generation.
///
/// Entity defaults apply where both spellings are missing: empty name and
/// description, zero connections, `server` focus. The three nullable
/// figures stay `None`.
pub fn style(raw: &Document) -> DatacenterStyle {
    let fields = rules::apply(STYLE_RULES, raw);

    let id = document::native_id(raw)
        .or_else(|| document::application_id(raw))
        .unwrap_or_default();
    let dim = rules::dim(&fields, "dim").unwrap_or_else(|| {
        [
            raw.get("Space_X").and_then(document::integer).unwrap_or(0),
            raw.get("Space_Y").and_then(document::integer).unwrap_or(0),
        ]
    });
    let focus = rules::string(&fields, "focus")
        .map(|text| Focus::parse_or_default(&text))
        .unwrap_or_default();

    DatacenterStyle {
        id,
        name: rules::string(&fields, "name").unwrap_or_default(),
        description: rules::string(&fields, "description").unwrap_or_default(),
        grid_connection: rules::int(&fields, "grid_connection").unwrap_or(0),
        water_connection: rules::int(&fields, "water_connection").unwrap_or(0),
        dim,
        focus,
        processing: rules::int(&fields, "processing"),
        price: rules::int(&fields, "price"),
        data_storage: rules::int(&fields, "data_storage"),
        recommended_modules: rules::strings(&fields, "recommended_modules"),
    }
}
