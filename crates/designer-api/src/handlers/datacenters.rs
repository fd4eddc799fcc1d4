//! `/datacenters` endpoints.
//!
//! Creation and layout saves take the compact placement format
//! (`styleId` plus module ids with positions). Modules that do not
//! resolve are skipped and reported under `warnings`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use designer_catalog::{CreatedDatacenter, EntityKind, FindOptions, LayoutRequest};
use designer_types::{Coordinates, Datacenter, PlacedModule};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::object;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Query parameters for `GET /datacenters`.
#[derive(Debug, Default, Deserialize)]
pub struct ListDatacentersQuery {
    /// Attach placed modules to each datacenter (default false).
    #[serde(default)]
    pub include_modules: bool,
    /// Page size (default from configuration).
    pub limit: Option<u64>,
    /// Records to skip (default 0).
    pub skip: Option<u64>,
}

/// Query parameters for `GET /datacenters/{id}`.
#[derive(Debug, Deserialize)]
pub struct GetDatacenterQuery {
    /// Attach placed modules (default true).
    #[serde(default = "default_true")]
    pub include_modules: bool,
}

/// Body of `POST /datacenters/search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Text matched case-insensitively against name and description.
    pub query: String,
    /// Maximum number of results (default 10).
    #[serde(default = "default_search_limit")]
    pub limit: u64,
}

/// One placement in the compact datacenter view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimplePlacement {
    /// Module id, not the placed-module id.
    pub id: String,
    /// Grid position.
    pub position: Coordinates,
    /// Rotation in degrees.
    pub rotation: i64,
}

/// Compact datacenter view used by the layout editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleDatacenter {
    /// Datacenter id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description, empty when unset.
    pub description: String,
    /// Style id, empty when unset.
    #[serde(rename = "styleId")]
    pub style_id: String,
    /// Placements by module id.
    pub modules: Vec<SimplePlacement>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Datacenter> for SimpleDatacenter {
    fn from(datacenter: Datacenter) -> Self {
        Self {
            id: datacenter.id,
            name: datacenter.name,
            description: datacenter.description.unwrap_or_default(),
            style_id: datacenter.style_id.unwrap_or_default(),
            modules: datacenter
                .modules
                .into_iter()
                .filter_map(simple_placement)
                .collect(),
            created_at: datacenter.created_at,
            updated_at: datacenter.updated_at,
        }
    }
}

/// Placements with neither a reference nor an embedded module are dropped.
fn simple_placement(placed: PlacedModule) -> Option<SimplePlacement> {
    let id = placed
        .module_id
        .filter(|id| !id.is_empty())
        .or_else(|| placed.module.map(|module| module.id).filter(|id| !id.is_empty()))?;
    Some(SimplePlacement {
        id,
        position: placed.position,
        rotation: placed.rotation,
    })
}

const fn default_true() -> bool {
    true
}

const fn default_search_limit() -> u64 {
    10
}

fn layout_response(created: CreatedDatacenter, message: &str) -> Value {
    let mut body = json!({
        "datacenter": created.datacenter,
        "message": message,
    });
    if !created.missing_modules.is_empty() {
        let warnings = json!({
            "missing_modules": created.missing_modules,
            "message": format!(
                "Some modules were not found: {}",
                created.missing_modules.join(", ")
            ),
        });
        if let Some(fields) = body.as_object_mut() {
            fields.insert("warnings".to_owned(), warnings);
        }
    }
    body
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /datacenters?include_modules&limit&skip`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDatacentersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = FindOptions::default()
        .with_limit(query.limit.unwrap_or_else(|| state.default_limit()))
        .with_skip(query.skip.unwrap_or(0));
    let page = state
        .catalog
        .datacenters()
        .list(query.include_modules, options)
        .await?;
    Ok(Json(page))
}

/// `POST /datacenters` -- create from a style.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LayoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.catalog.datacenters().create_from_style(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(layout_response(created, "Datacenter created successfully")),
    ))
}

/// `POST /datacenters/search`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .catalog
        .datacenters()
        .search(&request.query, request.limit)
        .await?;
    Ok(Json(found))
}

/// `GET /datacenters/style/{style_id}`
pub async fn list_by_style(
    State(state): State<Arc<AppState>>,
    Path(style_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state.catalog.datacenters().list_by_style(&style_id).await?;
    Ok(Json(found))
}

/// `GET /datacenters/{id}?include_modules`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<GetDatacenterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let datacenter = state
        .catalog
        .datacenters()
        .get(&id, query.include_modules)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Datacenter, &id))?;
    Ok(Json(datacenter))
}

/// `GET /datacenters/{id}/simple`
pub async fn get_simple(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let datacenter = state
        .catalog
        .datacenters()
        .get(&id, true)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Datacenter, &id))?;
    Ok(Json(json!({ "datacenter": SimpleDatacenter::from(datacenter) })))
}

/// `PUT /datacenters/{id}`
///
/// A `modules` array in the body replaces every placed module.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let datacenter = state
        .catalog
        .datacenters()
        .update(&id, object(body)?)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Datacenter, &id))?;
    Ok(Json(datacenter))
}

/// `PUT /datacenters/{id}/layout`
pub async fn update_layout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<LayoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = state
        .catalog
        .datacenters()
        .replace_layout(&id, request)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Datacenter, &id))?;
    Ok(Json(layout_response(saved, "Datacenter layout updated successfully")))
}

/// `DELETE /datacenters/{id}` -- removes its placed modules too.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .catalog
        .datacenters()
        .delete(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Datacenter, &id))?;
    Ok(Json(json!({
        "message": format!("Datacenter {id} and its modules deleted successfully"),
        "deleted_placed_modules": removed.placed_modules,
    })))
}

/// `POST /datacenters/{id}/modules`
pub async fn add_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let datacenter = state
        .catalog
        .datacenters()
        .add_module(&id, object(body)?)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Datacenter, &id))?;
    Ok(Json(datacenter))
}

/// `DELETE /datacenters/{id}/modules/{placed_id}`
pub async fn remove_module(
    State(state): State<Arc<AppState>>,
    Path((id, placed_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let datacenter = state
        .catalog
        .datacenters()
        .remove_module(&id, &placed_id)
        .await?
        .ok_or_else(|| ApiError::not_found(EntityKind::Datacenter, &id))?;
    Ok(Json(datacenter))
}

#[cfg(test)]
mod tests {
    use designer_types::Module;

    use super::*;

    fn placed(module_id: Option<&str>, module: Option<&str>) -> PlacedModule {
        PlacedModule {
            id: "p".to_owned(),
            module_id: module_id.map(str::to_owned),
            module: module.map(|id| Module {
                id: id.to_owned(),
                ..Module::default()
            }),
            position: Coordinates { x: 3, y: 4 },
            rotation: 90,
            datacenter_id: None,
        }
    }

    #[test]
    fn simple_view_prefers_the_reference() {
        let view = simple_placement(placed(Some("rack_1"), Some("rack_2")));
        assert_eq!(view.map(|p| p.id), Some("rack_1".to_owned()));

        let view = simple_placement(placed(None, Some("rack_2")));
        assert_eq!(view.map(|p| p.id), Some("rack_2".to_owned()));

        assert!(simple_placement(placed(None, None)).is_none());
        assert!(simple_placement(placed(Some(""), None)).is_none());
    }

    #[test]
    fn warnings_only_when_modules_are_missing() {
        let datacenter = Datacenter {
            id: "dc".to_owned(),
            name: "DC".to_owned(),
            description: None,
            style_id: None,
            dim: [10, 10],
            grid_connection: 1,
            water_connection: 1,
            created_at: None,
            updated_at: None,
            modules: Vec::new(),
        };
        let clean = layout_response(
            CreatedDatacenter {
                datacenter: datacenter.clone(),
                missing_modules: Vec::new(),
            },
            "ok",
        );
        assert!(clean.get("warnings").is_none());

        let partial = layout_response(
            CreatedDatacenter {
                datacenter,
                missing_modules: vec!["ghost".to_owned()],
            },
            "ok",
        );
        assert_eq!(
            partial.pointer("/warnings/missing_modules"),
            Some(&json!(["ghost"]))
        );
    }
}
