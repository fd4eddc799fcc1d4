//! Untyped documents as exchanged with the document store.
//!
//! A [`Document`] is an ordered key-value map of JSON values. The
//! store-native identifier lives under [`NATIVE_ID`] as a 24-digit
//! lowercase hex string; each store converts it to and from its own
//! representation.

use bson::oid::ObjectId;
use serde::Serialize;
use serde_json::{Map, Value};

/// An untyped stored document.
pub type Document = Map<String, Value>;

/// Key of the store-native object identifier.
pub const NATIVE_ID: &str = "_id";

/// Key of the application-level identifier.
pub const APPLICATION_ID: &str = "id";

/// Key of the legacy capitalised identifier.
pub const LEGACY_ID: &str = "ID";

/// Canonical hex form of `candidate` if it is a syntactically valid object
/// identifier.
pub fn parse_object_id(candidate: &str) -> Option<String> {
    ObjectId::parse_str(candidate).ok().map(|oid| oid.to_hex())
}

/// Whether `candidate` is a syntactically valid object identifier.
pub fn is_object_id(candidate: &str) -> bool {
    ObjectId::parse_str(candidate).is_ok()
}

/// Generate a fresh object identifier.
pub fn new_object_id() -> String {
    ObjectId::new().to_hex()
}

/// Read a value as an integer.
///
/// Accepts integers, integral floats and numeric strings. Anything else
/// reads as absent.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number.as_f64().and_then(|f| {
                let in_range = f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64;
                (in_range && f.fract().abs() < f64::EPSILON).then_some(f as i64)
            })
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Read a value as text. Only strings qualify.
pub fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

/// Read a value as an identifier. Strings and integers qualify.
pub fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(number.to_string()),
        _ => None,
    }
}

/// Loose truthiness: missing, `null`, `false`, `0`, `""`, `[]` and `{}`
/// are all falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
    }
}

/// The store-native identifier of a document, if it has one.
pub fn native_id(doc: &Document) -> Option<String> {
    doc.get(NATIVE_ID).and_then(identifier)
}

/// The application identifier of a document, if it has one.
pub fn application_id(doc: &Document) -> Option<String> {
    doc.get(APPLICATION_ID).and_then(identifier)
}

/// Serialize a record into a document.
///
/// Fails when the record does not serialize to a JSON object.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
