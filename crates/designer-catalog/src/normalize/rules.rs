//! Static `(source, target, transform)` rule tables.
//!
//! Each entity kind lists its rules in priority order. [`apply`] walks the
//! list once and the first source that yields a value claims the target;
//! later rules for the same target are ignored.

use designer_types::Dim;
use serde_json::Value;

use crate::document::{self, Document};

/// How a source value is coerced before it lands on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Integers, integral floats and numeric strings.
    Integer,
    /// Strings only.
    Text,
    /// Strings or integers, rendered as a string.
    Identifier,
    /// A two-element integer array.
    Dim,
    /// An array of identifiers. Non-identifier entries are dropped.
    IdentifierList,
}

impl Transform {
    /// Coerce `value`, or `None` when it does not fit.
    pub fn apply(self, value: &Value) -> Option<Value> {
        match self {
            Self::Integer => document::integer(value).map(Value::from),
            Self::Text => document::text(value).map(Value::String),
            Self::Identifier => document::identifier(value).map(Value::String),
            Self::Dim => parse_dim(value).map(|[w, h]| Value::from(vec![w, h])),
            Self::IdentifierList => value.as_array().map(|items| {
                Value::Array(
                    items
                        .iter()
                        .filter_map(document::identifier)
                        .map(Value::String)
                        .collect(),
                )
            }),
        }
    }
}

/// One row of a rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field read from the raw document.
    pub source: &'static str,
    /// Field written on the canonical document.
    pub target: &'static str,
    /// Coercion applied on the way.
    pub transform: Transform,
}

/// Shorthand for table literals.
pub const fn rule(source: &'static str, target: &'static str, transform: Transform) -> FieldRule {
    FieldRule {
        source,
        target,
        transform,
    }
}

/// Run `rules` over `raw`. First source found wins per target.
pub fn apply(rules: &[FieldRule], raw: &Document) -> Document {
    let mut canonical = Document::new();
    for rule in rules {
        if canonical.contains_key(rule.target) {
            continue;
        }
        if let Some(value) = raw.get(rule.source).and_then(|v| rule.transform.apply(v)) {
            canonical.insert(rule.target.to_owned(), value);
        }
    }
    canonical
}

/// A `[width, height]` pair; anything other than exactly two integers is
/// rejected.
pub fn parse_dim(value: &Value) -> Option<Dim> {
    match value.as_array()?.as_slice() {
        [w, h] => Some([document::integer(w)?, document::integer(h)?]),
        _ => None,
    }
}

pub(crate) fn int(doc: &Document, field: &str) -> Option<i64> {
    doc.get(field).and_then(Value::as_i64)
}

pub(crate) fn string(doc: &Document, field: &str) -> Option<String> {
    doc.get(field).and_then(Value::as_str).map(str::to_owned)
}

pub(crate) fn dim(doc: &Document, field: &str) -> Option<Dim> {
    doc.get(field).and_then(parse_dim)
}

pub(crate) fn strings(doc: &Document, field: &str) -> Option<Vec<String>> {
    doc.get(field).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use Transform::{Integer, Text};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    #[test]
    fn first_source_wins() {
        let rules = [
            rule("price", "price", Integer),
            rule("Price", "price", Integer),
        ];
        let out = apply(&rules, &doc(json!({"price": 5, "Price": 9})));
        assert_eq!(out.get("price"), Some(&json!(5)));

        let legacy_only = apply(&rules, &doc(json!({"Price": 9})));
        assert_eq!(legacy_only.get("price"), Some(&json!(9)));
    }

    #[test]
    fn null_and_mistyped_sources_fall_through() {
        let rules = [rule("name", "name", Text), rule("Name", "name", Text)];
        let out = apply(&rules, &doc(json!({"name": null, "Name": "Main"})));
        assert_eq!(out.get("name"), Some(&json!("Main")));

        let neither = apply(&rules, &doc(json!({"name": 3})));
        assert!(neither.get("name").is_none());
    }

    #[test]
    fn dims_need_exactly_two_integers() {
        assert_eq!(parse_dim(&json!([40, "20"])), Some([40, 20]));
        assert_eq!(parse_dim(&json!([40])), None);
        assert_eq!(parse_dim(&json!([1, 2, 3])), None);
        assert_eq!(parse_dim(&json!("40x20")), None);
    }

    #[test]
    fn identifier_lists_drop_junk() {
        let out = Transform::IdentifierList.apply(&json!(["rack_1", 7, null, {"a": 1}]));
        assert_eq!(out, Some(json!(["rack_1", "7"])));
    }
}
