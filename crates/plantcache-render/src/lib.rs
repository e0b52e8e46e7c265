//! Cached `PlantUML` rendering for plantcache.
//!
//! Diagram text is rendered by an external program (the `PlantUML` jar run
//! by a JVM) and the results are cached by content, so the same text is
//! never rendered twice:
//!
//! ```text
//! text ──► RenderCache ──hit──► ContentKey
//!              │
//!             miss ──► ArtifactStore (markup) ──► RenderInvoker ──► image + map
//!
//! ContentKey ──► ArtifactServer ──► image bytes / map markup
//! ```
//!
//! # Architecture
//!
//! - [`invoker`]: `RenderInvoker` trait and the `ProcessInvoker` child-process runner
//! - [`cache`]: `RenderCache`, the get-or-render orchestration with per-key locking
//! - [`artifacts`]: `ArtifactServer`, fetching images and maps by key
//! - [`input`]: `DiagramInput`, telling inline diagrams from source references
//! - [`embed`]: `Embedder`, the host-facing flow producing HTML fragments
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use plantcache_render::{ArtifactServer, ProcessInvoker, RenderCache};
//! use plantcache_store::ArtifactStore;
//!
//! let store = Arc::new(ArtifactStore::open(".plantcache/cache")?);
//! let cache = RenderCache::new(
//!     Arc::clone(&store),
//!     ProcessInvoker::plantuml(Path::new("java"), Path::new("/opt/plantuml.jar")),
//! );
//!
//! let key = cache.get_or_render("@startuml\nA -> B: hi\n@enduml")?;
//! let image = ArtifactServer::new(store).fetch(&key)?;
//! assert_eq!(image.mime_type, "image/png");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod artifacts;
mod cache;
mod consts;
mod embed;
mod error;
mod input;
mod invoker;

pub use artifacts::{ArtifactServer, Image};
pub use cache::RenderCache;
pub use consts::{DEFAULT_IMAGE_URL, DEFAULT_TIMEOUT};
pub use embed::{Embedded, Embedder, error_html};
pub use error::Error;
pub use input::DiagramInput;
pub use invoker::{InvokeError, ProcessInvoker, RenderInvoker};
