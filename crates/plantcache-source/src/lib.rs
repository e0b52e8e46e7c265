//! Diagram source resolution for plantcache.
//!
//! Diagrams can be given inline or as a reference to a file kept elsewhere:
//! `path` for the latest version or `path@revision` for a specific one. This
//! crate provides the [`SourceResolver`] trait that turns such a reference
//! into text, plus two backends:
//!
//! - [`FsSourceResolver`]: files under a directory (working tree only)
//! - [`GitSourceResolver`]: files in a git repository at any revision
//! - [`MemorySource`]: in-memory sources for tests (behind `mock` feature)
//!
//! # Example
//!
//! ```no_run
//! use plantcache_source::{FsSourceResolver, SourceResolver};
//!
//! let resolver = FsSourceResolver::new("docs");
//! match resolver.resolve("diagrams/login.puml") {
//!     Some(text) => println!("{text}"),
//!     None => eprintln!("not found"),
//! }
//! ```

mod fs;
mod git;
#[cfg(feature = "mock")]
mod mock;
mod reference;

pub use fs::FsSourceResolver;
pub use git::GitSourceResolver;
#[cfg(feature = "mock")]
pub use mock::MemorySource;
pub use reference::SourceRef;

/// Resolves a `path[@revision]` reference into diagram text.
///
/// Implementations never fail loudly: a missing path, an unknown revision
/// or a backend error all resolve to `None`, which callers present as a
/// "not found" message. Backends log the underlying cause.
pub trait SourceResolver: Send + Sync {
    /// Resolve `reference` (`path` or `path@revision`).
    ///
    /// A reference without revision resolves to the latest version.
    fn resolve(&self, reference: &str) -> Option<String>;
}

/// Resolver used when no source backend is configured: nothing is found.
#[derive(Debug, Default)]
pub struct NoSources;

impl SourceResolver for NoSources {
    fn resolve(&self, reference: &str) -> Option<String> {
        tracing::debug!(reference, "No source backend configured");
        None
    }
}
