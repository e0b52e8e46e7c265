//! Render and artifact endpoints.
//!
//! `GET /render` and `GET /render/map` serve cached artifacts by content
//! key and never render. `POST /render` renders posted diagram text into the
//! cache and reports the key it is served under.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use plantcache_render::{ArtifactServer, DEFAULT_IMAGE_URL};
use plantcache_store::ContentKey;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Cache policy for artifacts, which never change once written.
const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Query for artifact fetches: `?id=<key>`.
#[derive(Deserialize)]
pub(crate) struct KeyQuery {
    #[serde(default)]
    id: String,
}

/// Response for POST /render.
#[derive(Debug, Serialize)]
pub(crate) struct RenderResponse {
    /// Content key of the rendered diagram.
    id: String,
    /// URL the image is served under.
    url: String,
    /// Whether a clickable map exists for the diagram.
    has_map: bool,
}

/// Parse a key from a request, answering malformed ids as not found.
fn parse_key(id: &str) -> Result<ContentKey, ServerError> {
    ContentKey::parse(id).map_err(|_| ServerError::UnknownKey(id.to_owned()))
}

/// Strong `ETag` for an artifact: the key itself identifies the content.
fn compute_etag(key: &ContentKey) -> String {
    format!("\"{key}\"")
}

/// Run a blocking artifact read on the blocking pool.
async fn with_artifacts<T, F>(state: &Arc<AppState>, read: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce(&ArtifactServer) -> Result<T, ServerError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || read(&state.artifacts)).await?
}

/// Handle GET /render?id=<key>.
pub(crate) async fn get_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyQuery>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let key = parse_key(&query.id)?;
    let etag = compute_etag(&key);
    let revalidating = headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|value| value.as_bytes() == etag.as_bytes());

    let image = with_artifacts(&state, move |artifacts| {
        // 304 only while the image is still cached
        if revalidating && artifacts.contains(&key) {
            return Ok(None);
        }
        match artifacts.fetch(&key) {
            Ok(image) => Ok(Some(image)),
            Err(plantcache_render::Error::NotFound(_)) => Err(ServerError::UnknownKey(query.id)),
            Err(other) => Err(other.into()),
        }
    })
    .await?;

    let Some(image) = image else {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    };
    Ok((
        [
            (header::CONTENT_TYPE, image.mime_type.to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, IMMUTABLE.to_owned()),
        ],
        image.bytes,
    )
        .into_response())
}

/// Handle GET /render/map?id=<key>.
///
/// A diagram without hotspots has no map and is answered with 204.
pub(crate) async fn get_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, ServerError> {
    let key = parse_key(&query.id)?;
    let map = with_artifacts(&state, move |artifacts| {
        if !artifacts.contains(&key) {
            return Err(ServerError::UnknownKey(query.id));
        }
        Ok(artifacts.fetch_map(&key)?)
    })
    .await?;

    match map {
        Some(map) => Ok((
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8".to_owned()),
                (header::CACHE_CONTROL, IMMUTABLE.to_owned()),
            ],
            map,
        )
            .into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Handle POST /render with the diagram text as the body.
pub(crate) async fn post_render(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<RenderResponse>, ServerError> {
    let cache = Arc::clone(&state.cache);
    let (key, has_map) = with_artifacts(&state, move |artifacts| {
        let key = cache.get_or_render(&body)?;
        let has_map = artifacts.fetch_map(&key)?.is_some();
        Ok((key, has_map))
    })
    .await?;

    Ok(Json(RenderResponse {
        url: format!("{DEFAULT_IMAGE_URL}?id={key}"),
        id: key.to_string(),
        has_map,
    }))
}
