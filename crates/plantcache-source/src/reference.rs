//! `path[@revision]` source references.

use std::path::{Component, Path, PathBuf};

/// A parsed source reference.
///
/// The textual form is `path` or `path@revision`; the split happens at the
/// first `@`, so revisions may themselves contain `@` (e.g. `HEAD@{1}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRef<'a> {
    /// Repository-relative path.
    pub path: &'a str,
    /// Requested revision; `None` means the latest available version.
    pub revision: Option<&'a str>,
}

impl<'a> SourceRef<'a> {
    /// Parse a `path[@revision]` string.
    ///
    /// An empty revision (`path@`) is treated as no revision.
    #[must_use]
    pub fn parse(reference: &'a str) -> Self {
        match reference.split_once('@') {
            Some((path, revision)) => Self {
                path,
                revision: Some(revision).filter(|r| !r.is_empty()),
            },
            None => Self {
                path: reference,
                revision: None,
            },
        }
    }

    /// The path as a relative path confined to the source root.
    ///
    /// Leading slashes are stripped (references are written relative to the
    /// repository root). Returns `None` for empty paths and for paths that
    /// contain `..` or other non-normal components.
    #[must_use]
    pub fn relative_path(&self) -> Option<PathBuf> {
        let trimmed = self.path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return None;
        }

        let mut relative = PathBuf::new();
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        (!relative.as_os_str().is_empty()).then_some(relative)
    }

    /// Whether the revision would be read as a command-line option by a
    /// version-control tool.
    #[must_use]
    pub fn has_option_like_revision(&self) -> bool {
        self.revision.is_some_and(|rev| rev.starts_with('-'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_path_only() {
        assert_eq!(
            SourceRef::parse("docs/seq.puml"),
            SourceRef {
                path: "docs/seq.puml",
                revision: None
            }
        );
    }

    #[test]
    fn test_parse_path_with_revision() {
        assert_eq!(
            SourceRef::parse("docs/seq.puml@42"),
            SourceRef {
                path: "docs/seq.puml",
                revision: Some("42")
            }
        );
    }

    #[test]
    fn test_parse_splits_at_first_at_sign() {
        let reference = SourceRef::parse("seq.puml@HEAD@{1}");

        assert_eq!(reference.path, "seq.puml");
        assert_eq!(reference.revision, Some("HEAD@{1}"));
    }

    #[test]
    fn test_parse_empty_revision_is_latest() {
        assert_eq!(SourceRef::parse("seq.puml@").revision, None);
    }

    #[test]
    fn test_relative_path_strips_leading_slash() {
        assert_eq!(
            SourceRef::parse("/trunk/seq.puml").relative_path(),
            Some(PathBuf::from("trunk/seq.puml"))
        );
    }

    #[test]
    fn test_relative_path_rejects_traversal() {
        assert_eq!(SourceRef::parse("../secret.puml").relative_path(), None);
        assert_eq!(SourceRef::parse("docs/../../x").relative_path(), None);
    }

    #[test]
    fn test_relative_path_rejects_empty() {
        assert_eq!(SourceRef::parse("").relative_path(), None);
        assert_eq!(SourceRef::parse("/").relative_path(), None);
        assert_eq!(SourceRef::parse("@42").relative_path(), None);
    }

    #[test]
    fn test_option_like_revision() {
        assert!(!SourceRef::parse("a.puml").has_option_like_revision());
        assert!(!SourceRef::parse("a.puml@main").has_option_like_revision());
        assert!(SourceRef::parse("a.puml@--output=x").has_option_like_revision());
    }
}
