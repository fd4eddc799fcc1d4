//! Bulk import row parsers.
//!
//! Pure text-to-document functions. Rows that do not fit the expected
//! layout are skipped and counted; an input with no usable row at all is
//! rejected.

use designer_types::{DEFAULT_DATACENTER_DIM, Focus};
use serde_json::{Value, json};

use crate::document::Document;
use crate::error::CatalogError;

/// Documents parsed from an import payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    /// Documents ready to insert, in input order.
    pub documents: Vec<Document>,
    /// Non-blank rows that were rejected.
    pub skipped: usize,
}

/// Fallback for `-1` resource figures in JSON style imports.
const STYLE_RESOURCE_FALLBACK: i64 = 5000;

/// Fields every entry of a wrapped JSON style import must carry.
const REQUIRED_STYLE_FIELDS: [&str; 3] = ["id", "name", "description"];

/// Parse tab-separated module rows:
/// `ID  Name  Is_Input  Is_Output  Unit  Amount`.
///
/// Spaces in `Unit` become underscores.
pub fn parse_modules(data: &str) -> Result<ImportOutcome, CatalogError> {
    collect("modules", data, '\t', |cells| {
        let [id, name, is_input, is_output, unit, amount] = cells else {
            return None;
        };
        let mut doc = Document::new();
        doc.insert("ID".to_owned(), Value::from(*id));
        doc.insert("Name".to_owned(), Value::from(*name));
        doc.insert("Is_Input".to_owned(), Value::from(number(is_input)?));
        doc.insert("Is_Output".to_owned(), Value::from(number(is_output)?));
        doc.insert("Unit".to_owned(), Value::from(unit.replace(' ', "_")));
        doc.insert("Amount".to_owned(), Value::from(number(amount)?));
        Some(doc)
    })
}

/// Parse `;`-separated spec rows:
/// `ID;Name;Below_Amount;Above_Amount;Minimize;Maximize;Unconstrained;Unit;Amount`.
pub fn parse_specs(data: &str) -> Result<ImportOutcome, CatalogError> {
    collect("datacenter specs", data, ';', |cells| {
        let [id, name, below, above, minimize, maximize, unconstrained, unit, amount] = cells
        else {
            return None;
        };
        let mut doc = Document::new();
        doc.insert("ID".to_owned(), Value::from(*id));
        doc.insert("Name".to_owned(), Value::from(*name));
        for (field, cell) in [
            ("Below_Amount", below),
            ("Above_Amount", above),
            ("Minimize", minimize),
            ("Maximize", maximize),
            ("Unconstrained", unconstrained),
        ] {
            doc.insert(field.to_owned(), Value::from(number(cell)?));
        }
        doc.insert("Unit".to_owned(), Value::from(*unit));
        doc.insert("Amount".to_owned(), Value::from(number(amount)?));
        Some(doc)
    })
}

/// Parse `;`-separated style rows:
/// `id;name;description;grid;water;dim_x;dim_y;data_storage;processing;price[;focus]`.
///
/// `-1`, `null` and empty cells leave the nullable figures absent. Missing
/// dimensions default to 1000 and connections are at least 1. An unknown
/// focus reads as `server`.
pub fn parse_styles(data: &str) -> Result<ImportOutcome, CatalogError> {
    collect("datacenter styles", data, ';', |cells| {
        let (
            [
                id,
                name,
                description,
                grid,
                water,
                dim_x,
                dim_y,
                data_storage,
                processing,
                price,
            ],
            rest,
        ) = cells.split_first_chunk::<10>()?;
        let focus = rest
            .first()
            .and_then(|cell| Focus::parse(cell.trim()))
            .unwrap_or_default();

        let mut doc = Document::new();
        doc.insert("id".to_owned(), Value::from(*id));
        doc.insert("name".to_owned(), Value::from(*name));
        doc.insert("description".to_owned(), Value::from(*description));
        doc.insert("grid_connection".to_owned(), Value::from(number(grid)?.max(1)));
        doc.insert("water_connection".to_owned(), Value::from(number(water)?.max(1)));
        doc.insert(
            "dim".to_owned(),
            json!([
                side(dim_x, DEFAULT_DATACENTER_DIM[0])?,
                side(dim_y, DEFAULT_DATACENTER_DIM[1])?
            ]),
        );
        for (field, cell) in [
            ("data_storage", data_storage),
            ("processing", processing),
            ("price", price),
        ] {
            if let Some(value) = nullable(cell)? {
                doc.insert(field.to_owned(), Value::from(value));
            }
        }
        doc.insert("focus".to_owned(), Value::from(focus.as_str()));
        Some(doc)
    })
}

/// Repair JSON style payloads before insert: a negative `dim` half resets
/// the footprint, negative connections flip sign and `-1` resource figures
/// get a fallback.
pub fn sanitize_styles(styles: Vec<Document>) -> Vec<Document> {
    styles.into_iter().map(sanitize_style).collect()
}

fn sanitize_style(mut style: Document) -> Document {
    let negative_dim = style
        .get("dim")
        .and_then(Value::as_array)
        .is_some_and(|dim| dim.iter().filter_map(Value::as_i64).any(|side| side < 0));
    if negative_dim {
        style.insert("dim".to_owned(), json!(DEFAULT_DATACENTER_DIM));
    }

    for field in ["grid_connection", "water_connection"] {
        if let Some(value) = style.get(field).and_then(Value::as_i64).filter(|v| *v < 0) {
            style.insert(field.to_owned(), Value::from(value.saturating_abs()));
        }
    }

    for field in ["data_storage", "processing"] {
        if style.get(field).and_then(Value::as_i64) == Some(-1) {
            style.insert(field.to_owned(), Value::from(STYLE_RESOURCE_FALLBACK));
        }
    }
    style
}

/// Check and complete wrapped JSON style payloads before insert.
///
/// Every entry needs `id`, `name` and `description`. A missing or negative
/// connection count becomes 1, a missing or non-positive footprint becomes
/// the default one, and a missing or unknown focus reads as `server`.
pub fn complete_styles(styles: Vec<Document>) -> Result<Vec<Document>, CatalogError> {
    styles.into_iter().map(complete_style).collect()
}

fn complete_style(mut style: Document) -> Result<Document, CatalogError> {
    if let Some(field) = REQUIRED_STYLE_FIELDS
        .iter()
        .find(|field| !style.contains_key(**field))
    {
        return Err(CatalogError::Invalid(format!("Missing required field: {field}")));
    }

    for field in ["grid_connection", "water_connection"] {
        let usable = style
            .get(field)
            .and_then(Value::as_i64)
            .is_some_and(|count| count >= 0);
        if !usable {
            style.insert(field.to_owned(), Value::from(1));
        }
    }

    let usable_dim = style.get("dim").and_then(Value::as_array).is_some_and(|dim| {
        dim.len() == 2
            && dim
                .iter()
                .all(|side| side.as_i64().is_some_and(|length| length > 0))
    });
    if !usable_dim {
        style.insert("dim".to_owned(), json!(DEFAULT_DATACENTER_DIM));
    }

    let focus = style
        .get("focus")
        .and_then(Value::as_str)
        .and_then(Focus::parse)
        .unwrap_or_default();
    style.insert("focus".to_owned(), Value::from(focus.as_str()));
    Ok(style)
}

// ---------------------------------------------------------------------------
// Row plumbing
// ---------------------------------------------------------------------------

fn collect<F>(
    label: &str,
    data: &str,
    separator: char,
    parse: F,
) -> Result<ImportOutcome, CatalogError>
where
    F: Fn(&[&str]) -> Option<Document>,
{
    let mut outcome = ImportOutcome::default();
    for (line, row) in data.lines().enumerate() {
        let row = row.trim_end_matches('\r');
        if row.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = row.split(separator).collect();
        match parse(&cells) {
            Some(doc) => outcome.documents.push(doc),
            None => {
                tracing::warn!(
                    kind = label,
                    line = line.saturating_add(1),
                    "skipping malformed import row"
                );
                outcome.skipped = outcome.skipped.saturating_add(1);
            }
        }
    }

    if outcome.documents.is_empty() {
        return Err(CatalogError::Invalid(format!(
            "no valid {label} found in import data"
        )));
    }
    tracing::info!(
        kind = label,
        parsed = outcome.documents.len(),
        skipped = outcome.skipped,
        "import rows parsed"
    );
    Ok(outcome)
}

fn number(cell: &str) -> Option<i64> {
    cell.trim().parse().ok()
}

/// A dimension half: empty or `-1` means the default.
fn side(cell: &str, default: i64) -> Option<i64> {
    match cell.trim() {
        "" | "-1" => Some(default),
        other => other.parse().ok(),
    }
}

/// A nullable figure: `Some(None)` for the absent markers, `None` when the
/// cell is not a number.
fn nullable(cell: &str) -> Option<Option<i64>> {
    match cell.trim() {
        "" | "null" | "-1" => Some(None),
        other => other.parse().ok().map(Some),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn modules_are_tab_separated() {
        let data = "T1\ttransformer_100\t1\t0\tUsable Power\t100\n\
                    \n\
                    bad\trow\n\
                    T2\ttransformer_200\tx\t0\tPrice\t3\n";
        let outcome = parse_modules(data).unwrap();
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.skipped, 2);

        let first = outcome.documents.first().cloned().unwrap();
        assert_eq!(first.get("Unit"), Some(&json!("Usable_Power")));
        assert_eq!(first.get("Is_Input"), Some(&json!(1)));
        assert_eq!(first.get("Amount"), Some(&json!(100)));
    }

    #[test]
    fn specs_need_nine_columns() {
        let data = "server_square;Server Square;1;0;0;1;0;Processing;500\r\n\
                    server_square;Server Square;1;0;0;1;0;Data storage;1000\n\
                    short;row;1";
        let outcome = parse_specs(data).unwrap();
        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.skipped, 1);
        let second = outcome.documents.get(1).cloned().unwrap();
        assert_eq!(second.get("Unit"), Some(&json!("Data storage")));
        assert_eq!(second.get("Maximize"), Some(&json!(1)));
    }

    #[test]
    fn styles_apply_defaults_and_clamps() {
        let data = "compact;Compact;Small site;0;-3;-1;;null;-1;250;storage\n\
                    plain;Plain;Defaults;2;2;100;200;10;20;30\n\
                    odd;Odd;Unknown focus;1;1;1;1;1;1;1;quantum";
        let outcome = parse_styles(data).unwrap();
        assert_eq!(outcome.documents.len(), 3);

        let compact = outcome.documents.first().cloned().unwrap();
        assert_eq!(compact.get("grid_connection"), Some(&json!(1)));
        assert_eq!(compact.get("water_connection"), Some(&json!(1)));
        assert_eq!(compact.get("dim"), Some(&json!([1000, 1000])));
        assert!(!compact.contains_key("data_storage"));
        assert!(!compact.contains_key("processing"));
        assert_eq!(compact.get("price"), Some(&json!(250)));
        assert_eq!(compact.get("focus"), Some(&json!("storage")));

        let plain = outcome.documents.get(1).cloned().unwrap();
        assert_eq!(plain.get("focus"), Some(&json!("server")));
        assert_eq!(plain.get("dim"), Some(&json!([100, 200])));

        let odd = outcome.documents.get(2).cloned().unwrap();
        assert_eq!(odd.get("focus"), Some(&json!("server")));
    }

    #[test]
    fn empty_import_is_invalid() {
        assert!(matches!(parse_modules("\n\n"), Err(CatalogError::Invalid(_))));
        assert!(matches!(parse_specs("a;b"), Err(CatalogError::Invalid(_))));
        assert!(matches!(parse_styles(""), Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn json_styles_are_repaired() {
        let raw = json!({
            "id": "s", "dim": [-1, 20], "grid_connection": -2,
            "water_connection": 3, "data_storage": -1, "processing": 7
        });
        let raw = raw.as_object().cloned().unwrap();
        let fixed = sanitize_styles(vec![raw]).pop().unwrap();
        assert_eq!(fixed.get("dim"), Some(&json!([1000, 1000])));
        assert_eq!(fixed.get("grid_connection"), Some(&json!(2)));
        assert_eq!(fixed.get("water_connection"), Some(&json!(3)));
        assert_eq!(fixed.get("data_storage"), Some(&json!(5000)));
        assert_eq!(fixed.get("processing"), Some(&json!(7)));
    }

    #[test]
    fn wrapped_styles_get_defaults() {
        let raw = json!({
            "id": "edge", "name": "Edge", "description": "Roadside",
            "grid_connection": -3, "water_connection": 0,
            "dim": [0, 50], "focus": "quantum", "price": 9
        });
        let bare = json!({"id": "bare", "name": "Bare", "description": ""});
        let done = complete_styles(vec![
            raw.as_object().cloned().unwrap(),
            bare.as_object().cloned().unwrap(),
        ])
        .unwrap();

        let edge = done.first().unwrap();
        assert_eq!(edge.get("grid_connection"), Some(&json!(1)));
        assert_eq!(edge.get("water_connection"), Some(&json!(0)));
        assert_eq!(edge.get("dim"), Some(&json!([1000, 1000])));
        assert_eq!(edge.get("focus"), Some(&json!("server")));
        assert_eq!(edge.get("price"), Some(&json!(9)));

        let bare = done.get(1).unwrap();
        assert_eq!(bare.get("grid_connection"), Some(&json!(1)));
        assert_eq!(bare.get("dim"), Some(&json!([1000, 1000])));
    }

    #[test]
    fn wrapped_styles_need_identity_fields() {
        let nameless = json!({"id": "x", "description": "no name"});
        let result = complete_styles(vec![nameless.as_object().cloned().unwrap()]);
        assert!(matches!(
            result,
            Err(CatalogError::Invalid(message)) if message == "Missing required field: name"
        ));
    }
}
