//! `/modules` endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use designer_catalog::{EntityKind, import};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{CsvImport, ListQuery, deleted, imported, imported_rows, object, objects};
use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /modules/json-import`.
#[derive(Debug, Deserialize)]
pub struct ModulesImport {
    /// Module payloads, stored as given.
    pub modules: Vec<Value>,
}

/// `GET /modules`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let modules = state.catalog.modules().list(query.options(&state)).await?;
    Ok(Json(modules))
}

/// `POST /modules`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let module = state.catalog.modules().create(object(body)?).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

/// `GET /modules/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let module = state
        .catalog
        .modules()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Module, &id))?;
    Ok(Json(module))
}

/// `PUT /modules/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let module = state
        .catalog
        .modules()
        .update(&id, object(body)?)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Module, &id))?;
    Ok(Json(module))
}

/// `DELETE /modules/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.catalog.modules().delete(&id).await? {
        return Err(ApiError::not_found(EntityKind::Module, &id));
    }
    Ok(Json(json!({ "message": format!("Module {id} deleted successfully") })))
}

/// `POST /modules/csv-import`
///
/// Tab-separated `ID Name Is_Input Is_Output Unit Amount` rows.
pub async fn csv_import(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CsvImport>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = import::parse_modules(&body.csv_data)?;
    let ids = state.catalog.modules().bulk_create(outcome.documents).await?;
    tracing::info!(imported = ids.len(), skipped = outcome.skipped, "modules imported");

    Ok((StatusCode::CREATED, Json(imported_rows("modules", &ids, outcome.skipped))))
}

/// `POST /modules/json-import`
pub async fn json_import(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ModulesImport>,
) -> Result<impl IntoResponse, ApiError> {
    let docs = objects(body.modules, "modules")?;
    let ids = state.catalog.modules().bulk_create(docs).await?;
    tracing::info!(imported = ids.len(), "modules imported");
    Ok((StatusCode::CREATED, Json(imported("modules", &ids))))
}

/// `DELETE /modules/all`
pub async fn delete_all(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let count = state.catalog.modules().delete_all().await?;
    tracing::info!(deleted = count, "all modules deleted");
    Ok(Json(deleted("modules", count)))
}
