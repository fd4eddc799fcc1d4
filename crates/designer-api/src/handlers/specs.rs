//! `/datacenter-specs` endpoints.
//!
//! Reads by id return the composite spec merged from every row of the
//! component; the `component` route returns the raw rows.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use designer_catalog::{EntityKind, import};
use serde_json::{Value, json};

use super::{CsvImport, deleted, imported_rows, object};
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /datacenter-specs`
pub async fn list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let specs = state.catalog.specs().composites().await?;
    Ok(Json(specs))
}

/// `POST /datacenter-specs`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.catalog.specs().create(object(body)?).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /datacenter-specs/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let spec = state
        .catalog
        .specs()
        .composite(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Spec, &id))?;
    Ok(Json(spec))
}

/// `GET /datacenter-specs/component/{component_id}`
pub async fn component_rows(
    State(state): State<Arc<AppState>>,
    Path(component_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.catalog.specs().rows_for_component(&component_id).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No specifications found for component {component_id}"
        )));
    }
    Ok(Json(rows))
}

/// `PUT /datacenter-specs/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .catalog
        .specs()
        .update(&id, object(body)?)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Spec, &id))?;
    Ok(Json(row))
}

/// `DELETE /datacenter-specs/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.catalog.specs().delete(&id).await? {
        return Err(ApiError::not_found(EntityKind::Spec, &id));
    }
    Ok(Json(json!({ "message": format!("Datacenter spec {id} deleted successfully") })))
}

/// `POST /datacenter-specs/import`
///
/// `;`-separated `ID;Name;Below_Amount;Above_Amount;Minimize;Maximize;Unconstrained;Unit;Amount`.
pub async fn csv_import(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CsvImport>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = import::parse_specs(&body.csv_data)?;
    let ids = state.catalog.specs().bulk_create(outcome.documents).await?;
    tracing::info!(imported = ids.len(), skipped = outcome.skipped, "datacenter specs imported");

    Ok((StatusCode::CREATED, Json(imported_rows("datacenter specs", &ids, outcome.skipped))))
}

/// `DELETE /datacenter-specs/all`
pub async fn delete_all(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let count = state.catalog.specs().delete_all().await?;
    tracing::info!(deleted = count, "all datacenter specs deleted");
    Ok(Json(deleted("datacenter specs", count)))
}
