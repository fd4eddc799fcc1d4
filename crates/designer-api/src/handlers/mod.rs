//! REST endpoint handlers, one module per resource.
//!
//! Handlers are thin: they pull identifiers and payloads out of the
//! request, call one repository operation on the shared
//! [`Catalog`](designer_catalog::Catalog), and map a miss to 404. Path
//! identifiers are passed through untouched; the catalog decides which key
//! space they belong to.

pub mod datacenters;
pub mod modules;
pub mod placed_modules;
pub mod positions;
pub mod specs;
pub mod styles;

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use designer_catalog::{Document, FindOptions};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared extractors
// ---------------------------------------------------------------------------

/// Paging parameters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Maximum number of records (default from configuration).
    pub limit: Option<u64>,
    /// Number of records to skip (default 0).
    pub skip: Option<u64>,
}

impl ListQuery {
    /// Find options with the configured page size as fallback.
    pub fn options(&self, state: &AppState) -> FindOptions {
        FindOptions::default()
            .with_limit(self.limit.unwrap_or_else(|| state.default_limit()))
            .with_skip(self.skip.unwrap_or(0))
    }
}

/// Guard for destructive bulk deletes.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    /// Must be `true` for the delete to run.
    #[serde(default)]
    pub confirm: bool,
}

impl ConfirmQuery {
    /// Reject the request unless `confirm=true` was passed.
    pub fn require(&self) -> Result<(), ApiError> {
        if self.confirm {
            Ok(())
        } else {
            Err(ApiError::BadRequest(
                "Confirmation required. Add '?confirm=true' to confirm deletion.".to_owned(),
            ))
        }
    }
}

/// Body of the text import endpoints.
#[derive(Debug, Deserialize)]
pub struct CsvImport {
    /// Raw rows, one record per line.
    pub csv_data: String,
}

// ---------------------------------------------------------------------------
// Payload helpers
// ---------------------------------------------------------------------------

/// Require a JSON object payload.
pub(crate) fn object(value: Value) -> Result<Document, ApiError> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(ApiError::BadRequest(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Require a non-empty list of JSON objects.
pub(crate) fn objects(values: Vec<Value>, label: &str) -> Result<Vec<Document>, ApiError> {
    if values.is_empty() {
        return Err(ApiError::BadRequest(format!("No {label} to import")));
    }
    values.into_iter().map(object).collect()
}

/// Response body for bulk inserts.
pub(crate) fn imported(label: &str, ids: &[String]) -> Value {
    json!({
        "message": format!("Successfully imported {} {label}", ids.len()),
        "imported_count": ids.len(),
        "ids": ids,
    })
}

/// Response body for text imports, with the count of rejected rows.
pub(crate) fn imported_rows(label: &str, ids: &[String], skipped: usize) -> Value {
    json!({
        "message": format!("Successfully imported {} {label}", ids.len()),
        "imported_count": ids.len(),
        "skipped_count": skipped,
        "ids": ids,
    })
}

/// Response body for bulk deletes.
pub(crate) fn deleted(label: &str, count: u64) -> Value {
    json!({
        "message": format!("Successfully deleted {count} {label}"),
        "deleted_count": count,
    })
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// GET / -- health banner
// ---------------------------------------------------------------------------

/// Service banner with the active store backend.
pub async fn index(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "Datacenter Designer catalog API",
        "store": state.catalog.store().backend(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_rejects_non_objects() {
        assert!(object(json!({"id": "rack_1"})).is_ok());
        let err = object(json!([1, 2])).err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("expected a JSON object, got an array"));
    }

    #[test]
    fn empty_imports_are_rejected() {
        assert!(objects(Vec::new(), "modules").is_err());
        assert!(objects(vec![json!({}), json!("x")], "modules").is_err());
        assert_eq!(objects(vec![json!({}), json!({})], "modules").map(|d| d.len()).ok(), Some(2));
    }

    #[test]
    fn confirm_guard() {
        assert!(ConfirmQuery { confirm: false }.require().is_err());
        assert!(ConfirmQuery { confirm: true }.require().is_ok());
    }
}
