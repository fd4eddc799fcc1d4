//! `/placed-modules` endpoints.
//!
//! Embedded modules in request bodies are stored as references. `POST`
//! keeps the snapshot next to the reference when `keep_snapshot=true`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use designer_catalog::{EntityKind, SnapshotPolicy};
use designer_types::Coordinates;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ConfirmQuery, ListQuery, deleted, imported, object, objects};
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `POST /placed-modules`.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePlacedQuery {
    /// Keep the embedded module snapshot (default false).
    #[serde(default)]
    pub keep_snapshot: bool,
}

/// Body of `POST /placed-modules/import`.
#[derive(Debug, Deserialize)]
pub struct PlacedModulesImport {
    /// Placed-module payloads.
    pub placed_modules: Vec<Value>,
}

/// Body of `PATCH /placed-modules/{id}/position`.
#[derive(Debug, Deserialize)]
pub struct PositionUpdate {
    /// New grid position.
    pub position: Coordinates,
    /// New rotation; unchanged when absent.
    #[serde(default)]
    pub rotation: Option<i64>,
}

/// `GET /placed-modules`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let placed = state.catalog.placed_modules().list(query.options(&state)).await?;
    Ok(Json(placed))
}

/// `POST /placed-modules?keep_snapshot`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreatePlacedQuery>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let policy = SnapshotPolicy::from_keep(query.keep_snapshot);
    let placed = state
        .catalog
        .placed_modules()
        .create(object(body)?, policy)
        .await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// `GET /placed-modules/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let placed = state
        .catalog
        .placed_modules()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::PlacedModule, &id))?;
    Ok(Json(placed))
}

/// `PUT /placed-modules/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let placed = state
        .catalog
        .placed_modules()
        .update(&id, object(body)?)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::PlacedModule, &id))?;
    Ok(Json(placed))
}

/// `PATCH /placed-modules/{id}/position`
pub async fn update_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<PositionUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let placed = state
        .catalog
        .placed_modules()
        .update_position(&id, body.position, body.rotation)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::PlacedModule, &id))?;
    Ok(Json(placed))
}

/// `DELETE /placed-modules/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.catalog.placed_modules().delete(&id).await? {
        return Err(ApiError::not_found(EntityKind::PlacedModule, &id));
    }
    Ok(Json(json!({ "message": format!("Placed module {id} deleted successfully") })))
}

/// `POST /placed-modules/import`
pub async fn import(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlacedModulesImport>,
) -> Result<impl IntoResponse, ApiError> {
    let docs = objects(body.placed_modules, "placed modules")?;
    let ids = state.catalog.placed_modules().bulk_create(docs).await?;
    tracing::info!(imported = ids.len(), "placed modules imported");
    Ok((StatusCode::CREATED, Json(imported("placed modules", &ids))))
}

/// `GET /placed-modules/datacenter/{datacenter_id}`
pub async fn list_by_datacenter(
    State(state): State<Arc<AppState>>,
    Path(datacenter_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let placed = state
        .catalog
        .placed_modules()
        .list_by_datacenter(&datacenter_id)
        .await?;
    Ok(Json(placed))
}

/// `DELETE /placed-modules/datacenter/{datacenter_id}?confirm=true`
pub async fn delete_by_datacenter(
    State(state): State<Arc<AppState>>,
    Path(datacenter_id): Path<String>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, ApiError> {
    confirm.require()?;
    let count = state
        .catalog
        .placed_modules()
        .delete_by_datacenter(&datacenter_id)
        .await?;
    tracing::info!(%datacenter_id, deleted = count, "placed modules cleared");
    Ok(Json(deleted("placed modules", count)))
}
