//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use plantcache_render::{ArtifactServer, Embedder, RenderCache};
use plantcache_source::SourceResolver;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Get-or-render entry point for posted diagram text.
    pub(crate) cache: Arc<RenderCache>,
    /// Read side for images and maps.
    pub(crate) artifacts: ArtifactServer,
    /// Host-side flow producing HTML fragments.
    pub(crate) embedder: Arc<Embedder>,
}

impl AppState {
    /// Wire the cache, its read side and the embedder together.
    pub(crate) fn new(cache: Arc<RenderCache>, sources: Arc<dyn SourceResolver>) -> Self {
        let artifacts = ArtifactServer::new(Arc::clone(cache.store()));
        let embedder = Arc::new(Embedder::new(Arc::clone(&cache), sources));
        Self {
            cache,
            artifacts,
            embedder,
        }
    }
}
