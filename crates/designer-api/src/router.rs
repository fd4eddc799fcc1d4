//! Axum router construction for the catalog API.
//!
//! Assembles every resource router into a single [`Router`] with CORS
//! restricted to the configured origins and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post, put};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, datacenters, modules, placed_modules, positions, specs, styles};
use crate::state::AppState;

/// Build the complete Axum router for the catalog server.
///
/// Static segments (`/all`, `/import`, `/focus/...`) are matched before
/// the `{id}` captures next to them.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);

    Router::new()
        .route("/", get(handlers::index))
        // Modules
        .route("/modules", get(modules::list).post(modules::create))
        .route("/modules/csv-import", post(modules::csv_import))
        .route("/modules/json-import", post(modules::json_import))
        .route("/modules/all", delete(modules::delete_all))
        .route(
            "/modules/{id}",
            get(modules::get).put(modules::update).delete(modules::delete),
        )
        // Datacenter styles
        .route("/datacenter-styles", get(styles::list).post(styles::create))
        .route("/datacenter-styles/import", post(styles::array_import))
        .route("/datacenter-styles/json-import", post(styles::json_import))
        .route("/datacenter-styles/csv-import", post(styles::csv_import))
        .route("/datacenter-styles/all", delete(styles::delete_all))
        .route("/datacenter-styles/focus/{focus}", get(styles::list_by_focus))
        .route(
            "/datacenter-styles/{id}",
            get(styles::get).put(styles::update).delete(styles::delete),
        )
        // Datacenter specs
        .route("/datacenter-specs", get(specs::list).post(specs::create))
        .route("/datacenter-specs/import", post(specs::csv_import))
        .route("/datacenter-specs/all", delete(specs::delete_all))
        .route(
            "/datacenter-specs/component/{component_id}",
            get(specs::component_rows),
        )
        .route(
            "/datacenter-specs/{id}",
            get(specs::get).put(specs::update).delete(specs::delete),
        )
        // Datacenters
        .route("/datacenters", get(datacenters::list).post(datacenters::create))
        .route("/datacenters/search", post(datacenters::search))
        .route("/datacenters/style/{style_id}", get(datacenters::list_by_style))
        .route(
            "/datacenters/{id}",
            get(datacenters::get)
                .put(datacenters::update)
                .delete(datacenters::delete),
        )
        .route("/datacenters/{id}/simple", get(datacenters::get_simple))
        .route("/datacenters/{id}/layout", put(datacenters::update_layout))
        .route("/datacenters/{id}/modules", post(datacenters::add_module))
        .route(
            "/datacenters/{id}/modules/{placed_id}",
            delete(datacenters::remove_module),
        )
        // Placed modules
        .route(
            "/placed-modules",
            get(placed_modules::list).post(placed_modules::create),
        )
        .route("/placed-modules/import", post(placed_modules::import))
        .route(
            "/placed-modules/datacenter/{datacenter_id}",
            get(placed_modules::list_by_datacenter).delete(placed_modules::delete_by_datacenter),
        )
        .route(
            "/placed-modules/{id}",
            get(placed_modules::get)
                .put(placed_modules::update)
                .delete(placed_modules::delete),
        )
        .route(
            "/placed-modules/{id}/position",
            patch(placed_modules::update_position),
        )
        // Positions
        .route("/positions", get(positions::list).post(positions::create))
        .route("/positions/import", post(positions::import))
        .route("/positions/area", post(positions::find_in_area))
        .route(
            "/positions/datacenter/{datacenter_id}",
            get(positions::list_by_datacenter),
        )
        .route("/positions/module/{module_id}", get(positions::get_by_module))
        .route(
            "/positions/{id}",
            get(positions::get).put(positions::update).delete(positions::delete),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins. `*` allows any origin; entries that
/// are not valid header values are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
