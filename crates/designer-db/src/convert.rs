//! JSON ⇄ BSON translation.
//!
//! Catalog documents carry the native id as a hex string under `_id`; the
//! store holds it as an `ObjectId`. Nested object ids and dates read back as
//! hex strings and RFC 3339 text so the catalog only ever sees plain JSON.
//!
//! Filters translate one-to-one onto query documents. Text filters become
//! case-insensitive regexes over the escaped user text.

use bson::oid::ObjectId;
use bson::{Bson, doc};
use designer_catalog::document::NATIVE_ID;
use designer_catalog::{Document, Filter};
use serde_json::Value;

use crate::error::DbError;

/// Convert a catalog document for writing.
pub fn to_bson_document(doc: Document) -> Result<bson::Document, DbError> {
    let mut out = bson::Document::new();
    for (key, value) in doc {
        let converted = if key == NATIVE_ID {
            native_id(value)?
        } else {
            Bson::try_from(value)?
        };
        out.insert(key, converted);
    }
    Ok(out)
}

/// Convert a stored document for the catalog.
pub fn from_bson_document(doc: bson::Document) -> Document {
    doc.into_iter()
        .map(|(key, value)| (key, to_json(value)))
        .collect()
}

/// Convert one stored value.
pub fn to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(at) => match at.try_to_rfc3339_string() {
            Ok(text) => Value::String(text),
            Err(_) => Bson::DateTime(at).into_relaxed_extjson(),
        },
        Bson::Document(doc) => Value::Object(from_bson_document(doc)),
        Bson::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Render an id returned by the driver as catalog text.
pub fn id_text(id: Bson) -> String {
    match to_json(id) {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn native_id(value: Value) -> Result<Bson, DbError> {
    match value {
        Value::String(hex) => {
            Ok(ObjectId::parse_str(&hex).map_or(Bson::String(hex), Bson::ObjectId))
        }
        other => Ok(Bson::try_from(other)?),
    }
}

/// Translate a filter into a query document.
pub fn filter_document(filter: &Filter) -> Result<bson::Document, DbError> {
    let mut query = bson::Document::new();
    match filter {
        Filter::All => {}
        Filter::Eq(field, value) => {
            query.insert(field.as_str(), Bson::try_from(value.clone())?);
        }
        Filter::EqIgnoreCase(field, text) => {
            query.insert(field.as_str(), regex(&format!("^{}$", escape_regex(text))));
        }
        Filter::ObjectId(hex) => {
            let id = ObjectId::parse_str(hex)
                .map_or_else(|_| Bson::String(hex.clone()), Bson::ObjectId);
            query.insert(NATIVE_ID, id);
        }
        Filter::ContainsIgnoreCase(field, text) => {
            query.insert(field.as_str(), regex(&escape_regex(text)));
        }
        Filter::Range { field, min, max } => {
            query.insert(field.as_str(), doc! { "$gte": *min, "$lte": *max });
        }
        Filter::And(filters) => {
            if !filters.is_empty() {
                query.insert("$and", clauses(filters)?);
            }
        }
        Filter::Or(filters) => {
            if filters.is_empty() {
                // Every stored document has an `_id`.
                query.insert(NATIVE_ID, doc! { "$exists": false });
            } else {
                query.insert("$or", clauses(filters)?);
            }
        }
    }
    Ok(query)
}

fn clauses(filters: &[Filter]) -> Result<Vec<Bson>, DbError> {
    filters
        .iter()
        .map(|filter| filter_document(filter).map(Bson::Document))
        .collect()
}

fn regex(pattern: &str) -> bson::Document {
    doc! { "$regex": pattern, "$options": "i" }
}

/// Escape regex metacharacters so `text` matches literally.
pub fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '#'
                | '-' | '/'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const HEX: &str = "507f1f77bcf86cd799439011";

    fn doc_of(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    #[test]
    fn native_id_becomes_object_id() {
        let converted = to_bson_document(doc_of(json!({"_id": HEX, "id": HEX, "dim": [1, 2]})));
        let converted = converted.unwrap();
        assert!(matches!(converted.get("_id"), Some(Bson::ObjectId(_))));
        // Only the native key is converted.
        assert!(matches!(converted.get("id"), Some(Bson::String(_))));

        let back = from_bson_document(converted);
        assert_eq!(back.get("_id"), Some(&json!(HEX)));
        assert_eq!(back.get("dim"), Some(&json!([1, 2])));
    }

    #[test]
    fn nested_ids_and_dates_read_as_text() {
        let oid = ObjectId::parse_str(HEX).map_or(Bson::Null, Bson::ObjectId);
        let stored = doc! {
            "module": { "_id": oid },
            "created_at": bson::DateTime::from_millis(0),
            "amount": 5_i64,
        };
        let json = from_bson_document(stored);
        assert_eq!(json.get("module").and_then(|m| m.get("_id")), Some(&json!(HEX)));
        assert_eq!(json.get("created_at"), Some(&json!("1970-01-01T00:00:00Z")));
        assert_eq!(json.get("amount"), Some(&json!(5)));
    }

    #[test]
    fn text_filters_are_escaped_regexes() {
        let query = filter_document(&Filter::eq_ignore_case("id", "rack.1")).unwrap();
        assert_eq!(query, doc! {"id": {"$regex": "^rack\\.1$", "$options": "i"}});

        let query =
            filter_document(&Filter::contains_ignore_case("name", "(a)")).unwrap();
        assert_eq!(query, doc! {"name": {"$regex": "\\(a\\)", "$options": "i"}});
    }

    #[test]
    fn structural_filters() {
        let range = filter_document(&Filter::range("x", 10, 0)).unwrap();
        assert_eq!(range, doc! {"x": {"$gte": 0_i64, "$lte": 10_i64}});

        let object_id = filter_document(&Filter::ObjectId(HEX.to_owned())).unwrap();
        assert!(matches!(object_id.get("_id"), Some(Bson::ObjectId(_))));

        assert_eq!(filter_document(&Filter::All).unwrap(), doc! {});
        let nothing = filter_document(&Filter::Or(Vec::new())).unwrap();
        assert_eq!(nothing, doc! {"_id": {"$exists": false}});

        let both = Filter::And(vec![Filter::eq("a", 1), Filter::eq("b", Value::Null)]);
        let query = filter_document(&both).unwrap();
        assert_eq!(query, doc! {"$and": [{"a": 1_i32}, {"b": Bson::Null}]});
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape_regex("rack_1"), "rack_1");
        assert_eq!(escape_regex("a+b*"), "a\\+b\\*");
    }
}
