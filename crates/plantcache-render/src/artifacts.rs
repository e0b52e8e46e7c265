//! Read side of the cache: fetching rendered artifacts by key.

use std::sync::Arc;

use plantcache_store::{ArtifactKind, ArtifactStore, ContentKey};

use crate::error::Error;

/// A rendered image ready to be sent to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
}

/// Serves rendered artifacts from the store.
///
/// Fetching never triggers rendering: a key whose render is still in flight
/// (or that was never rendered) is simply not found.
#[derive(Debug, Clone)]
pub struct ArtifactServer {
    store: Arc<ArtifactStore>,
}

impl ArtifactServer {
    /// Create a server reading from `store`.
    #[must_use]
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// Whether an image has been rendered for `key`.
    #[must_use]
    pub fn contains(&self, key: &ContentKey) -> bool {
        self.store.exists(key, ArtifactKind::Image)
    }

    /// Fetch the image for `key`.
    pub fn fetch(&self, key: &ContentKey) -> Result<Image, Error> {
        let bytes = self.store.read(key, ArtifactKind::Image)?;
        Ok(Image {
            bytes,
            mime_type: ArtifactKind::Image.mime_type(),
        })
    }

    /// Fetch the clickable map for `key`.
    ///
    /// A diagram without hotspots has no map; that is `Ok(None)`, not an
    /// error. Only storage faults are errors.
    pub fn fetch_map(&self, key: &ContentKey) -> Result<Option<String>, Error> {
        let map = self.store.lookup(key, ArtifactKind::Map)?;
        Ok(map.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}
