//! Content-addressed artifact storage for plantcache.
//!
//! Every diagram is identified by a [`ContentKey`] derived from its markup.
//! The [`ArtifactStore`] keeps up to three artifacts per key, one per
//! [`ArtifactKind`]:
//!
//! - [`ArtifactKind::Markup`]: the raw diagram text
//! - [`ArtifactKind::Image`]: the rendered PNG
//! - [`ArtifactKind::Map`]: the optional clickable image map
//!
//! Artifacts are never deleted by this crate; retention is an operator
//! concern.
//!
//! # Example
//!
//! ```no_run
//! use plantcache_store::{ArtifactKind, ArtifactStore, ContentKey};
//!
//! let store = ArtifactStore::open(".plantcache/cache")?;
//! let key = ContentKey::compute(b"@startuml\nA -> B\n@enduml");
//!
//! if !store.exists(&key, ArtifactKind::Image) {
//!     store.write(&key, ArtifactKind::Markup, b"@startuml\nA -> B\n@enduml")?;
//! }
//! # Ok::<(), plantcache_store::StoreError>(())
//! ```

mod key;
mod store;

pub use key::{ContentKey, InvalidKey, KEY_LEN};
pub use store::{ArtifactKind, ArtifactStore, StoreError};
