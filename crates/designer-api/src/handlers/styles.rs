//! `/datacenter-styles` endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use designer_catalog::{EntityKind, import};
use designer_types::Focus;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{
    ConfirmQuery, CsvImport, ListQuery, deleted, imported, imported_rows, object, objects,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /datacenter-styles/json-import`.
#[derive(Debug, Deserialize)]
pub struct StylesImport {
    /// Style payloads, each with at least `id`, `name` and `description`.
    pub styles: Vec<Value>,
}

/// `GET /datacenter-styles`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let styles = state.catalog.styles().list(query.options(&state)).await?;
    Ok(Json(styles))
}

/// `POST /datacenter-styles`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let style = state.catalog.styles().create(object(body)?).await?;
    Ok((StatusCode::CREATED, Json(style)))
}

/// `GET /datacenter-styles/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let style = state
        .catalog
        .styles()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Style, &id))?;
    Ok(Json(style))
}

/// `GET /datacenter-styles/focus/{focus}`
///
/// An unknown focus is a 400 rather than an empty list.
pub async fn list_by_focus(
    State(state): State<Arc<AppState>>,
    Path(focus): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let focus = Focus::parse(&focus).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unknown focus {focus}; expected processing, storage, network or server"
        ))
    })?;
    let styles = state.catalog.styles().list_by_focus(focus).await?;
    Ok(Json(styles))
}

/// `PUT /datacenter-styles/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let style = state
        .catalog
        .styles()
        .update(&id, object(body)?)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Style, &id))?;
    Ok(Json(style))
}

/// `DELETE /datacenter-styles/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.catalog.styles().delete(&id).await? {
        return Err(ApiError::not_found(EntityKind::Style, &id));
    }
    Ok(Json(json!({ "message": format!("Datacenter style {id} deleted successfully") })))
}

/// `POST /datacenter-styles/import`
///
/// A JSON array of styles. Negative footprints, negative connection
/// counts and `-1` resource figures are repaired before insert.
pub async fn array_import(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Vec<Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let docs = import::sanitize_styles(objects(body, "styles")?);
    let ids = state.catalog.styles().bulk_create(docs).await?;
    tracing::info!(imported = ids.len(), "datacenter styles imported");
    Ok((StatusCode::CREATED, Json(imported("datacenter styles", &ids))))
}

/// `POST /datacenter-styles/json-import`
///
/// `{"styles": [...]}`. An entry without `id`, `name` or `description`
/// rejects the whole batch; other gaps get defaults.
pub async fn json_import(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StylesImport>,
) -> Result<impl IntoResponse, ApiError> {
    let docs = import::complete_styles(objects(body.styles, "styles")?)?;
    let ids = state.catalog.styles().bulk_create(docs).await?;
    tracing::info!(imported = ids.len(), "datacenter styles imported");
    Ok((StatusCode::CREATED, Json(imported("datacenter styles", &ids))))
}

/// `POST /datacenter-styles/csv-import`
///
/// `;`-separated rows:
/// `id;name;description;grid;water;dim_x;dim_y;data_storage;processing;price[;focus]`.
pub async fn csv_import(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CsvImport>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = import::parse_styles(&body.csv_data)?;
    let ids = state.catalog.styles().bulk_create(outcome.documents).await?;
    tracing::info!(imported = ids.len(), skipped = outcome.skipped, "datacenter styles imported");

    Ok((
        StatusCode::CREATED,
        Json(imported_rows("datacenter styles", &ids, outcome.skipped)),
    ))
}

/// `DELETE /datacenter-styles/all?confirm=true`
pub async fn delete_all(
    State(state): State<Arc<AppState>>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, ApiError> {
    confirm.require()?;
    let count = state.catalog.styles().delete_all().await?;
    tracing::info!(deleted = count, "all datacenter styles deleted");
    Ok(Json(deleted("datacenter styles", count)))
}
