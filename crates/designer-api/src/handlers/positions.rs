//! `/positions` endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use designer_catalog::EntityKind;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ListQuery, imported, object, objects};
use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /positions/import`.
#[derive(Debug, Deserialize)]
pub struct PositionsImport {
    /// Position payloads.
    pub positions: Vec<Value>,
}

/// Body of `POST /positions/area`: two opposite corners, edges included.
#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    /// First corner, x.
    pub x1: i64,
    /// First corner, y.
    pub y1: i64,
    /// Opposite corner, x.
    pub x2: i64,
    /// Opposite corner, y.
    pub y2: i64,
    /// Restrict to one datacenter.
    #[serde(default)]
    pub datacenter_id: Option<String>,
}

/// `GET /positions`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let positions = state.catalog.positions().list(query.options(&state)).await?;
    Ok(Json(positions))
}

/// `POST /positions`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let position = state.catalog.positions().create(object(body)?).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

/// `GET /positions/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let position = state
        .catalog
        .positions()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Position, &id))?;
    Ok(Json(position))
}

/// `PUT /positions/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let position = state
        .catalog
        .positions()
        .update(&id, object(body)?)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Position, &id))?;
    Ok(Json(position))
}

/// `DELETE /positions/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.catalog.positions().delete(&id).await? {
        return Err(ApiError::not_found(EntityKind::Position, &id));
    }
    Ok(Json(json!({ "message": format!("Position {id} deleted successfully") })))
}

/// `POST /positions/import`
pub async fn import(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PositionsImport>,
) -> Result<impl IntoResponse, ApiError> {
    let docs = objects(body.positions, "positions")?;
    let ids = state.catalog.positions().bulk_create(docs).await?;
    tracing::info!(imported = ids.len(), "positions imported");
    Ok((StatusCode::CREATED, Json(imported("positions", &ids))))
}

/// `POST /positions/area`
pub async fn find_in_area(
    State(state): State<Arc<AppState>>,
    Json(area): Json<AreaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let positions = state
        .catalog
        .positions()
        .find_in_area(
            (area.x1, area.y1),
            (area.x2, area.y2),
            area.datacenter_id.as_deref(),
        )
        .await?;
    Ok(Json(positions))
}

/// `GET /positions/datacenter/{datacenter_id}`
pub async fn list_by_datacenter(
    State(state): State<Arc<AppState>>,
    Path(datacenter_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let positions = state
        .catalog
        .positions()
        .list_by_datacenter(&datacenter_id)
        .await?;
    Ok(Json(positions))
}

/// `GET /positions/module/{module_id}`
pub async fn get_by_module(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let position = state
        .catalog
        .positions()
        .get_by_module(&module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No position found for module {module_id}")))?;
    Ok(Json(position))
}
