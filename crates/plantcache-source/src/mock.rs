//! In-memory source backend for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::SourceResolver;
use crate::reference::SourceRef;

/// In-memory sources keyed by `(path, revision)`.
///
/// A source added without revision is what a reference without revision
/// resolves to.
///
/// # Example
///
/// ```ignore
/// use plantcache_source::{MemorySource, SourceResolver};
///
/// let sources = MemorySource::new()
///     .with_source("seq.puml", "@startuml\nA -> B\n@enduml")
///     .with_revision("seq.puml", "1", "@startuml\nA -> C\n@enduml");
///
/// assert!(sources.resolve("seq.puml@1").is_some());
/// ```
#[derive(Debug, Default)]
pub struct MemorySource {
    sources: RwLock<HashMap<(String, Option<String>), String>>,
}

impl MemorySource {
    /// Create an empty source set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the latest version of `path`.
    #[must_use]
    pub fn with_source(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path.into(), None, text.into());
        self
    }

    /// Add `path` at a specific revision.
    #[must_use]
    pub fn with_revision(
        self,
        path: impl Into<String>,
        revision: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(path.into(), Some(revision.into()), text.into());
        self
    }

    fn insert(&self, path: String, revision: Option<String>, text: String) {
        self.sources
            .write()
            .unwrap()
            .insert((path, revision), text);
    }
}

impl SourceResolver for MemorySource {
    fn resolve(&self, reference: &str) -> Option<String> {
        let source = SourceRef::parse(reference);
        let key = (source.path.to_owned(), source.revision.map(str::to_owned));
        self.sources.read().unwrap().get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_resolves_latest_and_revisions() {
        let sources = MemorySource::new()
            .with_source("seq.puml", "latest")
            .with_revision("seq.puml", "1", "first");

        assert_eq!(sources.resolve("seq.puml").as_deref(), Some("latest"));
        assert_eq!(sources.resolve("seq.puml@1").as_deref(), Some("first"));
        assert_eq!(sources.resolve("seq.puml@2"), None);
        assert_eq!(sources.resolve("other.puml"), None);
    }
}
