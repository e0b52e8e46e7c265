//! HTTP server for the plantcache diagram cache.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Rendered images and clickable maps by content key
//! - An endpoint rendering posted diagram text into the cache
//! - An endpoint producing embeddable HTML fragments
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::time::Duration;
//! use plantcache_config::SourceBackend;
//! use plantcache_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 7979,
//!         jar: PathBuf::from("/opt/plantuml.jar"),
//!         java_bin: PathBuf::from("java"),
//!         timeout: Duration::from_secs(60),
//!         cache_dir: PathBuf::from(".plantcache/cache"),
//!         source_root: PathBuf::from("."),
//!         source_backend: SourceBackend::Fs,
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum server (plantcache-server)
//!                       │
//!                       ├─► GET  /render, /render/map ──► ArtifactServer
//!                       │
//!                       ├─► POST /render ──► RenderCache ──► java -jar plantuml.jar
//!                       │
//!                       └─► POST /embed  ──► Embedder (source + cache + HTML)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use plantcache_config::{ConfigError, SourceBackend};
use plantcache_render::{ProcessInvoker, RenderCache};
use plantcache_source::{FsSourceResolver, GitSourceResolver, SourceResolver};
use plantcache_store::ArtifactStore;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// `PlantUML` jar path.
    pub jar: PathBuf,
    /// Java executable.
    pub java_bin: PathBuf,
    /// Bound on a single renderer run.
    pub timeout: Duration,
    /// Directory holding cached artifacts.
    pub cache_dir: PathBuf,
    /// Root that diagram references are resolved against.
    pub source_root: PathBuf,
    /// How diagram references are read.
    pub source_backend: SourceBackend,
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the cache directory cannot be created or the server
/// fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(ArtifactStore::open(&config.cache_dir)?);
    let invoker =
        ProcessInvoker::plantuml(&config.java_bin, &config.jar).timeout(config.timeout);
    let cache = Arc::new(RenderCache::new(store, invoker));

    let sources: Arc<dyn SourceResolver> = match config.source_backend {
        SourceBackend::Fs => Arc::new(FsSourceResolver::new(config.source_root.clone())),
        SourceBackend::Git => Arc::new(GitSourceResolver::new(config.source_root.clone())),
    };

    let state = Arc::new(AppState::new(cache, sources));
    let app = app::create_router(state);

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        cache_dir = %config.cache_dir.display(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a handler the server runs until killed
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from plantcache config.
///
/// # Errors
///
/// Returns `ConfigError::Validation` if the renderer is not usable
/// (jar undefined, missing, or not a `.jar` file).
pub fn server_config_from_config(
    config: &plantcache_config::Config,
) -> Result<ServerConfig, ConfigError> {
    let (renderer, jar) = config.require_renderer()?;

    Ok(ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        jar: jar.to_path_buf(),
        java_bin: renderer.java_bin.clone(),
        timeout: renderer.timeout(),
        cache_dir: config.cache_dir.clone(),
        source_root: config.source_resolved.root.clone(),
        source_backend: config.source_resolved.backend,
    })
}
