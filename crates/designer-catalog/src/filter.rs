//! Store-agnostic filter predicates.
//!
//! [`Filter::matches`] is the reference semantics. Every store translation
//! must select exactly the documents it accepts. User-supplied text is
//! always matched literally, never as a pattern.

use serde_json::Value;

use crate::document::{self, Document, NATIVE_ID};

/// A predicate over stored documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document.
    All,
    /// Field equals value. `Eq(field, null)` also matches a missing field.
    Eq(String, Value),
    /// Text field equals text, ignoring case.
    EqIgnoreCase(String, String),
    /// Store-native identifier equals the given canonical hex id.
    ObjectId(String),
    /// Text field contains text, ignoring case.
    ContainsIgnoreCase(String, String),
    /// Numeric field lies within `min..=max`. Strings never match, even
    /// when they hold a number.
    Range {
        /// Field to test.
        field: String,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// Every sub-filter matches.
    And(Vec<Self>),
    /// At least one sub-filter matches.
    Or(Vec<Self>),
}

impl Filter {
    /// Equality on `field`.
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::Eq(field.to_owned(), value.into())
    }

    /// Case-insensitive equality on `field`.
    pub fn eq_ignore_case(field: &str, text: &str) -> Self {
        Self::EqIgnoreCase(field.to_owned(), text.to_owned())
    }

    /// Case-insensitive substring match on `field`.
    pub fn contains_ignore_case(field: &str, text: &str) -> Self {
        Self::ContainsIgnoreCase(field.to_owned(), text.to_owned())
    }

    /// Inclusive range on `field`. Bounds may be given in either order.
    pub fn range(field: &str, a: i64, b: i64) -> Self {
        Self::Range {
            field: field.to_owned(),
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Whether `doc` satisfies this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, Value::Null) => doc.get(field).is_none_or(Value::is_null),
            Self::Eq(field, value) => doc.get(field) == Some(value),
            Self::EqIgnoreCase(field, text) => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|stored| stored.to_lowercase() == text.to_lowercase()),
            Self::ObjectId(hex) => document::native_id(doc)
                .and_then(|stored| document::parse_object_id(&stored))
                .is_some_and(|stored| stored == *hex),
            Self::ContainsIgnoreCase(field, text) => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|stored| stored.to_lowercase().contains(&text.to_lowercase())),
            Self::Range { field, min, max } => doc
                .get(field)
                .and_then(Value::as_number)
                .is_some_and(|number| number_in_range(number, *min, *max)),
            Self::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }

    /// Short description for log fields.
    pub fn describe(&self) -> String {
        match self {
            Self::All => "all".to_owned(),
            Self::Eq(field, value) => format!("{field} = {value}"),
            Self::EqIgnoreCase(field, text) => format!("{field} ~= {text:?}"),
            Self::ObjectId(hex) => format!("{NATIVE_ID} = ObjectId({hex})"),
            Self::ContainsIgnoreCase(field, text) => format!("{field} contains {text:?}"),
            Self::Range { field, min, max } => format!("{min} <= {field} <= {max}"),
            Self::And(filters) => join(filters, " and "),
            Self::Or(filters) => join(filters, " or "),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn number_in_range(number: &serde_json::Number, min: i64, max: i64) -> bool {
    number.as_i64().map_or_else(
        || {
            number
                .as_f64()
                .is_some_and(|value| value >= min as f64 && value <= max as f64)
        },
        |value| (min..=max).contains(&value),
    )
}

fn join(filters: &[Filter], separator: &str) -> String {
    let parts: Vec<String> = filters.iter().map(Filter::describe).collect();
    format!("({})", parts.join(separator))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }

    #[test]
    fn eq_null_matches_missing_field() {
        let d = doc(json!({"name": "a"}));
        assert!(Filter::eq("style_id", Value::Null).matches(&d));
        assert!(!Filter::eq("name", Value::Null).matches(&d));
    }

    #[test]
    fn ignore_case_is_literal() {
        let d = doc(json!({"id": "Rack_1", "name": "Main (A)"}));
        assert!(Filter::eq_ignore_case("id", "rack_1").matches(&d));
        assert!(!Filter::eq_ignore_case("id", "rack_").matches(&d));
        assert!(Filter::contains_ignore_case("name", "(a)").matches(&d));
        assert!(!Filter::contains_ignore_case("name", ".*").matches(&d));
    }

    #[test]
    fn object_id_matches_canonical_hex() {
        let d = doc(json!({"_id": "507f1f77bcf86cd799439011"}));
        assert!(Filter::ObjectId("507f1f77bcf86cd799439011".to_owned()).matches(&d));
        assert!(!Filter::ObjectId("507f1f77bcf86cd799439012".to_owned()).matches(&d));
    }

    #[test]
    fn range_is_inclusive_and_order_free() {
        let d = doc(json!({"x": 10}));
        assert!(Filter::range("x", 10, 0).matches(&d));
        assert!(Filter::range("x", 10, 20).matches(&d));
        assert!(!Filter::range("x", 11, 20).matches(&d));
    }

    #[test]
    fn range_reads_numbers_only() {
        let within = Filter::range("x", 0, 20);
        assert!(within.matches(&doc(json!({"x": 10.0}))));
        assert!(within.matches(&doc(json!({"x": 19.5}))));
        assert!(!within.matches(&doc(json!({"x": 20.5}))));
        assert!(!within.matches(&doc(json!({"x": "10"}))));
        assert!(!within.matches(&doc(json!({"x": null}))));
        assert!(!within.matches(&doc(json!({"y": 10}))));
    }

    #[test]
    fn combinators() {
        let d = doc(json!({"x": 1, "y": 2}));
        let both = Filter::And(vec![Filter::eq("x", 1), Filter::eq("y", 2)]);
        let either = Filter::Or(vec![Filter::eq("x", 5), Filter::eq("y", 2)]);
        assert!(both.matches(&d));
        assert!(either.matches(&d));
        assert!(!Filter::And(vec![Filter::eq("x", 1), Filter::eq("y", 3)]).matches(&d));
        assert!(Filter::All.matches(&d));
    }
}
