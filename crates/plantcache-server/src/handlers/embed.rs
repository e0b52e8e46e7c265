//! Embed endpoint.
//!
//! Turns host input (inline diagram or `path[@revision]` reference) into an
//! HTML fragment. Failures are part of the fragment, so this endpoint
//! answers 200 for every well-formed request.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use plantcache_render::DiagramInput;
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Request body for POST /embed.
#[derive(Debug, Deserialize)]
pub(crate) struct EmbedRequest {
    /// Inline diagram text, or a reference when `path` is absent.
    #[serde(default)]
    content: String,
    /// Explicit source reference; takes precedence over `content`.
    #[serde(default)]
    path: Option<String>,
}

/// Handle POST /embed.
pub(crate) async fn post_embed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmbedRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let input = DiagramInput::detect(&request.content, request.path.as_deref());
    let embedder = Arc::clone(&state.embedder);
    let html = tokio::task::spawn_blocking(move || embedder.expand(&input)).await?;

    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_request_path_optional() {
        let request: EmbedRequest =
            serde_json::from_str(r#"{"content": "@startuml\nA -> B\n@enduml"}"#).unwrap();

        assert_eq!(request.content, "@startuml\nA -> B\n@enduml");
        assert_eq!(request.path, None);
    }

    #[test]
    fn test_embed_request_path_only() {
        let request: EmbedRequest = serde_json::from_str(r#"{"path": "seq.puml@3"}"#).unwrap();

        assert_eq!(request.content, "");
        assert_eq!(request.path.as_deref(), Some("seq.puml@3"));
    }
}
