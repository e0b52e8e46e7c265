//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// No image is cached under the requested id.
    #[error("Diagram not found: {0}")]
    UnknownKey(String),

    /// Rendering, source resolution or cache access failed.
    #[error(transparent)]
    Render(#[from] plantcache_render::Error),

    /// A blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        use plantcache_render::Error;

        let (status, body) = match &self {
            Self::UnknownKey(id) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Diagram not found", "kind": "not_found", "id": id}),
            ),
            Self::Render(e @ Error::EmptyInput) => (
                StatusCode::BAD_REQUEST,
                json!({"error": e.to_string(), "kind": e.kind()}),
            ),
            Self::Render(e @ Error::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                json!({"error": e.to_string(), "kind": e.kind()}),
            ),
            Self::Render(
                e @ Error::Render {
                    exit_code,
                    diagnostic,
                },
            ) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": e.to_string(),
                    "kind": e.kind(),
                    "exit_code": exit_code,
                    "diagnostic": diagnostic,
                }),
            ),
            Self::Render(e @ Error::Storage(_)) => {
                tracing::error!(error = %e, "Diagram cache unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string(), "kind": e.kind()}),
                )
            }
            Self::Task(e) => {
                tracing::error!(error = %e, "Render task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Render task failed", "kind": "internal"}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
