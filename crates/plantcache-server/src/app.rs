//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/render",
            get(handlers::render::get_image).post(handlers::render::post_render),
        )
        .route("/render/map", get(handlers::render::get_map))
        .route("/embed", post(handlers::embed::post_embed))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::fixed_header(security::NO_SNIFF))
                .layer(security::fixed_header(security::DENY_FRAMING)),
        )
        .with_state(state)
}
