//! Filesystem source backend.

use std::path::{Path, PathBuf};

use crate::SourceResolver;
use crate::reference::SourceRef;

/// Resolves references against files under a root directory.
///
/// The directory has no history, so only the latest version exists:
/// references carrying a revision are reported as not found.
#[derive(Debug, Clone)]
pub struct FsSourceResolver {
    root: PathBuf,
}

impl FsSourceResolver {
    /// Create a resolver rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Source root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceResolver for FsSourceResolver {
    fn resolve(&self, reference: &str) -> Option<String> {
        let source = SourceRef::parse(reference);
        if let Some(revision) = source.revision {
            tracing::warn!(
                reference,
                revision,
                "Filesystem sources have no revisions"
            );
            return None;
        }

        let path = self.root.join(source.relative_path()?);
        match std::fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Some(text),
                Err(_) => {
                    tracing::warn!(path = %path.display(), "Diagram source is not valid UTF-8");
                    None
                }
            },
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Diagram source not readable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsSourceResolver) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("docs")).unwrap();
        fs::write(
            tmp.path().join("docs/seq.puml"),
            "@startuml\nA -> B\n@enduml\n",
        )
        .unwrap();
        let resolver = FsSourceResolver::new(tmp.path());
        (tmp, resolver)
    }

    #[test]
    fn test_resolve_existing_file() {
        let (_tmp, resolver) = setup();

        assert_eq!(
            resolver.resolve("docs/seq.puml").as_deref(),
            Some("@startuml\nA -> B\n@enduml\n")
        );
    }

    #[test]
    fn test_resolve_with_leading_slash() {
        let (_tmp, resolver) = setup();

        assert!(resolver.resolve("/docs/seq.puml").is_some());
    }

    #[test]
    fn test_resolve_missing_file() {
        let (_tmp, resolver) = setup();

        assert_eq!(resolver.resolve("docs/missing.puml"), None);
    }

    #[test]
    fn test_resolve_with_revision_is_not_found() {
        let (_tmp, resolver) = setup();

        assert_eq!(resolver.resolve("docs/seq.puml@12"), None);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let (tmp, _) = setup();
        fs::write(tmp.path().join("outside.puml"), "secret").unwrap();
        let resolver = FsSourceResolver::new(tmp.path().join("docs"));

        assert_eq!(resolver.resolve("../outside.puml"), None);
    }

    #[test]
    fn test_resolve_directory_is_not_found() {
        let (_tmp, resolver) = setup();

        assert_eq!(resolver.resolve("docs"), None);
    }

    #[test]
    fn test_resolve_invalid_utf8_is_not_found() {
        let (tmp, resolver) = setup();
        fs::write(tmp.path().join("binary.puml"), [0xFF, 0xFE, 0x00]).unwrap();

        assert_eq!(resolver.resolve("binary.puml"), None);
    }
}
