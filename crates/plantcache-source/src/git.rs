//! Git source backend.
//!
//! Reads blobs from the object database with `gix`, resolving
//! `<revision>:<path>` the way `git rev-parse` does. No git executable is
//! needed at runtime.

use std::path::{Path, PathBuf};

use crate::SourceResolver;
use crate::reference::SourceRef;

/// Revision used when a reference does not name one.
const LATEST_REVISION: &str = "HEAD";

/// Resolves references against the history of a git repository.
///
/// The repository is opened per lookup, so a resolver can be created before
/// the repository exists and is shareable across threads.
#[derive(Debug, Clone)]
pub struct GitSourceResolver {
    repo: PathBuf,
}

impl GitSourceResolver {
    /// Create a resolver for the repository at `repo`.
    #[must_use]
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    /// Repository directory.
    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Read the blob named by `spec` (`<revision>:<path>`) as UTF-8 text.
    fn read_blob(&self, spec: &str) -> Option<String> {
        let repo = gix::open(&self.repo)
            .inspect_err(|e| {
                tracing::warn!(repo = %self.repo.display(), error = %e, "Cannot open repository");
            })
            .ok()?;

        let id = repo
            .rev_parse_single(spec)
            .inspect_err(|e| tracing::debug!(spec, error = %e, "No such node in repository"))
            .ok()?;
        let object = id
            .object()
            .inspect_err(|e| tracing::warn!(spec, error = %e, "Cannot read repository object"))
            .ok()?;
        if object.kind != gix::object::Kind::Blob {
            tracing::debug!(spec, kind = %object.kind, "Not a file in repository");
            return None;
        }

        match std::str::from_utf8(&object.data) {
            Ok(text) => Some(text.to_owned()),
            Err(_) => {
                tracing::warn!(spec, "Diagram source is not valid UTF-8");
                None
            }
        }
    }
}

/// Join path components with `/` as git expects in `<rev>:<path>`.
fn git_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl SourceResolver for GitSourceResolver {
    fn resolve(&self, reference: &str) -> Option<String> {
        let source = SourceRef::parse(reference);
        if source.has_option_like_revision() {
            tracing::warn!(reference, "Rejected option-like revision");
            return None;
        }

        let path = git_path(&source.relative_path()?);
        let revision = source.revision.unwrap_or(LATEST_REVISION);
        self.read_blob(&format!("{revision}:{path}"))
    }
}
