use chrono::{DateTime, NaiveDateTime, Utc};
use designer_types::{Coordinates, DEFAULT_DATACENTER_DIM, Datacenter, PlacedModule, Position};
use serde_json::Value;

use super::module::module;
use super::rules;
use crate::document::{self, Document};

/// Native id first, then the application id, then empty.
fn record_id(raw: &Document) -> String {
    document::native_id(raw)
        .or_else(|| document::application_id(raw))
        .unwrap_or_default()
}

fn int_or(raw: &Document, field: &str, default: i64) -> i64 {
    raw.get(field).and_then(document::integer).unwrap_or(default)
}

fn opt_identifier(raw: &Document, field: &str) -> Option<String> {
    raw.get(field).and_then(document::identifier)
}

/// RFC 3339, or a naive ISO-8601 timestamp read as UTC.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Normalize a placed module without following its reference.
///
/// An embedded module object is normalized in place. A non-object `module`
/// value is read as a reference id when no `module_id` is stored.
pub fn placed_module(raw: &Document) -> PlacedModule {
    let position = raw
        .get("position")
        .and_then(Value::as_object)
        .map(|pos| Coordinates {
            x: int_or(pos, "x", 0),
            y: int_or(pos, "y", 0),
        })
        .unwrap_or_default();

    let (embedded, loose_reference) = match raw.get("module") {
        Some(Value::Object(fields)) => (Some(module(fields)), None),
        Some(other) => (None, document::identifier(other)),
        None => (None, None),
    };

    PlacedModule {
        id: record_id(raw),
        module_id: opt_identifier(raw, "module_id").or(loose_reference),
        module: embedded,
        position,
        rotation: int_or(raw, "rotation", 0),
        datacenter_id: opt_identifier(raw, "datacenter_id"),
    }
}

/// Normalize a datacenter, including any `modules` array it carries.
pub fn datacenter(raw: &Document) -> Datacenter {
    let modules = raw
        .get("modules")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(placed_module)
                .collect()
        })
        .unwrap_or_default();

    Datacenter {
        id: record_id(raw),
        name: raw
            .get("name")
            .and_then(document::text)
            .unwrap_or_default(),
        description: raw.get("description").and_then(document::text),
        style_id: opt_identifier(raw, "style_id"),
        dim: raw
            .get("dim")
            .and_then(rules::parse_dim)
            .unwrap_or(DEFAULT_DATACENTER_DIM),
        grid_connection: int_or(raw, "grid_connection", 0),
        water_connection: int_or(raw, "water_connection", 0),
        created_at: raw.get("created_at").and_then(parse_timestamp),
        updated_at: raw.get("updated_at").and_then(parse_timestamp),
        modules,
    }
}

/// Normalize a standalone position.
pub fn position(raw: &Document) -> Position {
    Position {
        id: record_id(raw),
        x: int_or(raw, "x", 0),
        y: int_or(raw, "y", 0),
        name: raw.get("name").and_then(document::text),
        module_id: opt_identifier(raw, "module_id"),
        datacenter_id: opt_identifier(raw, "datacenter_id"),
    }
}
