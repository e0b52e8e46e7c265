//! File-based artifact store.
//!
//! [`ArtifactStore`] keeps every artifact of a diagram as a flat file named
//! after its [`ContentKey`] with a kind-specific extension:
//!
//! ```text
//! {root}/
//! +-- 0a1b...e9.txt      # markup, written before rendering
//! +-- 0a1b...e9.png      # image, stored after a successful render
//! +-- 0a1b...e9.cmapx    # clickable map, optional
//! ```
//!
//! Artifacts are write-once: the key is derived from the markup, so every
//! writer of a given key and kind writes the same bytes. Writes go through a
//! temporary file that is renamed into place, which means readers never
//! observe a partially written artifact.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::key::ContentKey;

/// The three artifact kinds stored per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Raw diagram text, stored verbatim.
    Markup,
    /// Rendered raster image.
    Image,
    /// Clickable image map produced alongside the image (optional).
    Map,
}

impl ArtifactKind {
    /// File extension used on disk.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markup => "txt",
            Self::Image => "png",
            Self::Map => "cmapx",
        }
    }

    /// MIME type used when serving the artifact.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Markup => "text/plain; charset=utf-8",
            Self::Image => "image/png",
            Self::Map => "text/html; charset=utf-8",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Markup => "markup",
            Self::Image => "image",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// Artifact store error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The artifact does not exist.
    #[error("{kind} artifact not found for key {key}")]
    NotFound {
        /// Requested key.
        key: ContentKey,
        /// Requested kind.
        kind: ArtifactKind,
    },
    /// The cache directory could not be created.
    #[error("cannot create cache directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// An artifact could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// Target artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// An artifact exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl StoreError {
    /// Whether this error means "artifact absent" rather than a storage fault.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Filesystem-backed store rooted at the cache directory.
///
/// Every artifact enters the store through [`write`](Self::write); renderer
/// output is copied in only once the render has succeeded.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open the store at `root`, creating the directory (and its parents)
    /// if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::CreateDir {
            path: root.clone(),
            source,
        })?;
        tracing::debug!(root = %root.display(), "Opened artifact store");
        Ok(Self { root })
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk location of an artifact (whether or not it exists).
    #[must_use]
    pub fn path(&self, key: &ContentKey, kind: ArtifactKind) -> PathBuf {
        self.root
            .join(format!("{}.{}", key.as_str(), kind.extension()))
    }

    /// Check whether an artifact exists. Absence is not an error.
    #[must_use]
    pub fn exists(&self, key: &ContentKey, kind: ArtifactKind) -> bool {
        self.path(key, kind).is_file()
    }

    /// Persist an artifact and return its path.
    ///
    /// Writing the same bytes twice is harmless: the second write replaces
    /// the file with identical content.
    pub fn write(
        &self,
        key: &ContentKey,
        kind: ArtifactKind,
        bytes: &[u8],
    ) -> Result<PathBuf, StoreError> {
        let path = self.path(key, kind);
        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        tracing::debug!(key = %key, kind = %kind, bytes = bytes.len(), "Stored artifact");
        Ok(path)
    }

    /// Read an artifact, returning `None` when it is absent.
    ///
    /// This is a single lookup: there is no window between an existence
    /// check and the read.
    pub fn lookup(
        &self,
        key: &ContentKey,
        kind: ArtifactKind,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path(key, kind);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    /// Read an artifact, failing with [`StoreError::NotFound`] when absent.
    pub fn read(&self, key: &ContentKey, kind: ArtifactKind) -> Result<Vec<u8>, StoreError> {
        self.lookup(key, kind)?.ok_or_else(|| StoreError::NotFound {
            key: key.clone(),
            kind,
        })
    }
}
