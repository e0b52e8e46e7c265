//! Render cache.
//!
//! [`RenderCache`] turns diagram text into a [`ContentKey`] whose image is
//! guaranteed to exist in the [`ArtifactStore`], invoking the renderer only
//! when it does not exist yet.
//!
//! Concurrent requests for the same text are serialized by a per-key lock
//! and re-check the store once they hold it, so a given text is rendered at
//! most once. Requests for different keys never wait on each other.
//!
//! The renderer runs in a staging directory inside the cache root. Its
//! output reaches the store only after a verified success, map first and
//! image last, so an image in the store always belongs to a complete render.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use plantcache_store::{ArtifactKind, ArtifactStore, ContentKey, StoreError};
use tempfile::TempDir;

use crate::error::Error;
use crate::invoker::RenderInvoker;

/// Content-addressed render cache.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use plantcache_render::{ProcessInvoker, RenderCache};
/// use plantcache_store::ArtifactStore;
///
/// let store = Arc::new(ArtifactStore::open(".plantcache/cache")?);
/// let invoker = ProcessInvoker::plantuml(Path::new("java"), Path::new("/opt/plantuml.jar"));
/// let cache = RenderCache::new(store, invoker);
///
/// let key = cache.get_or_render("@startuml\nA -> B\n@enduml")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RenderCache {
    store: Arc<ArtifactStore>,
    invoker: Box<dyn RenderInvoker>,
    /// Keys currently being rendered, one lock per key.
    in_flight: Mutex<HashMap<ContentKey, Arc<Mutex<()>>>>,
}

impl RenderCache {
    /// Create a cache over `store` that renders misses with `invoker`.
    pub fn new(store: Arc<ArtifactStore>, invoker: impl RenderInvoker + 'static) -> Self {
        Self {
            store,
            invoker: Box::new(invoker),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying artifact store.
    #[must_use]
    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Return the key of `text`, rendering it first if its image is missing.
    ///
    /// A cache hit costs one existence check. On a miss the markup is stored,
    /// the renderer runs, and the image is verified to exist; a failed render
    /// leaves no image behind, so the next request retries.
    pub fn get_or_render(&self, text: &str) -> Result<ContentKey, Error> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let key = ContentKey::compute(text.as_bytes());
        if self.store.exists(&key, ArtifactKind::Image) {
            tracing::debug!(key = %key, "Diagram cache hit");
            return Ok(key);
        }

        let entry = self.key_lock(&key);
        let _guard = entry.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.render_locked(&key, text).map(|()| key)
    }

    /// Render `text` under `key`. Must be called with the key lock held.
    fn render_locked(&self, key: &ContentKey, text: &str) -> Result<(), Error> {
        // Another request may have rendered this key while we waited.
        if self.store.exists(key, ArtifactKind::Image) {
            tracing::debug!(key = %key, "Diagram rendered by concurrent request");
            return Ok(());
        }

        self.store.write(key, ArtifactKind::Markup, text.as_bytes())?;

        let staging = TempDir::new_in(self.store.root()).map_err(|source| StoreError::Write {
            path: self.store.root().to_path_buf(),
            source,
        })?;
        let staged_markup = staging.path().join(key_file(key, ArtifactKind::Markup));
        fs::write(&staged_markup, text).map_err(|source| StoreError::Write {
            path: staged_markup.clone(),
            source,
        })?;

        let start = Instant::now();
        if let Err(e) = self.invoker.render(&staged_markup) {
            tracing::warn!(key = %key, error = %e, "Diagram rendering failed");
            return Err(e.into());
        }

        let Some(image) = read_staged(staging.path(), key, ArtifactKind::Image)? else {
            tracing::warn!(key = %key, "Renderer reported success but wrote no image");
            return Err(Error::Render {
                exit_code: Some(0),
                diagnostic: "renderer exited successfully but produced no image".to_owned(),
            });
        };
        let map = read_staged(staging.path(), key, ArtifactKind::Map)?;

        // Image last: its presence marks a complete render.
        if let Some(map) = &map {
            self.store.write(key, ArtifactKind::Map, map)?;
        }
        self.store.write(key, ArtifactKind::Image, &image)?;

        tracing::info!(
            key = %key,
            has_map = map.is_some(),
            elapsed_ms = start.elapsed().as_millis(),
            "Rendered diagram"
        );
        Ok(())
    }

    /// Get (or create) the lock for `key`.
    fn key_lock(&self, key: &ContentKey) -> InFlight<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(in_flight.entry(key.clone()).or_default());
        InFlight {
            cache: self,
            key: key.clone(),
            lock,
        }
    }

    /// Drop the lock entry for `key` once nobody else holds or awaits it.
    fn release_key_lock(&self, key: &ContentKey, lock: &Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held by the caller.
        if Arc::strong_count(lock) == 2 {
            in_flight.remove(key);
        }
    }

    #[cfg(test)]
    fn in_flight_count(&self) -> usize {
        self.in_flight.lock().unwrap().len()
    }
}

/// File name the renderer is expected to use for `kind` of `key`.
fn key_file(key: &ContentKey, kind: ArtifactKind) -> PathBuf {
    PathBuf::from(format!("{}.{}", key.as_str(), kind.extension()))
}

/// Read a renderer output from the staging directory, `None` if absent.
fn read_staged(
    staging: &Path,
    key: &ContentKey,
    kind: ArtifactKind,
) -> Result<Option<Vec<u8>>, StoreError> {
    let path = staging.join(key_file(key, kind));
    match fs::read(&path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read { path, source }),
    }
}

/// A caller's claim on a key lock; releases the map entry when dropped,
/// including while unwinding from a panicking renderer.
struct InFlight<'a> {
    cache: &'a RenderCache,
    key: ContentKey,
    lock: Arc<Mutex<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.cache.release_key_lock(&self.key, &self.lock);
    }
}
