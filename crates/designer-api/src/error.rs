//! Error types for the catalog API server.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use designer_catalog::{CatalogError, EntityKind, StoreError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The request was well-formed JSON but cannot be served.
    #[error("{0}")]
    BadRequest(String),

    /// Stored spec rows disagree and strict merging is on.
    #[error("{0}")]
    Conflict(String),

    /// The document store is unreachable or rolled back.
    #[error("{0}")]
    Unavailable(String),

    /// An internal error occurred.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// A 404 naming the missing entity.
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound(format!("{kind} with ID {id} not found"))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Serialization(e) => Self::Internal(format!("JSON error: {e}")),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { kind, id } => Self::not_found(kind, &id),
            CatalogError::Invalid(msg) => Self::BadRequest(msg),
            collision @ CatalogError::MergeFieldCollision { .. } => {
                Self::Conflict(collision.to_string())
            }
            CatalogError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
