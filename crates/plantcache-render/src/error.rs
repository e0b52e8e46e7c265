//! Error types for diagram rendering.

use plantcache_store::StoreError;

use crate::invoker::InvokeError;

/// Rendering and fetching error.
///
/// Every variant is recoverable at the request boundary: a failed render or
/// fetch affects only its own key.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No diagram text was supplied.
    #[error("No UML text defined")]
    EmptyInput,

    /// A referenced source or cache key does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The renderer failed or produced no usable output.
    #[error("Error running plantuml: {diagnostic}")]
    Render {
        /// Renderer exit code, if it ran to completion.
        exit_code: Option<i32>,
        /// Human-readable cause (renderer stderr, timeout, spawn failure).
        diagnostic: String,
    },

    /// The cache directory is unwritable or unreadable.
    #[error("Diagram cache error: {0}")]
    Storage(StoreError),
}

impl Error {
    /// Short machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::NotFound(_) => "not_found",
            Self::Render { .. } => "render",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Storage(err)
        }
    }
}

impl From<InvokeError> for Error {
    fn from(err: InvokeError) -> Self {
        Self::Render {
            exit_code: err.exit_code(),
            diagnostic: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plantcache_store::{ArtifactKind, ContentKey};

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: Error = StoreError::NotFound {
            key: ContentKey::compute(b"x"),
            kind: ArtifactKind::Image,
        }
        .into();

        assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_store_io_maps_to_storage() {
        let err: Error = StoreError::Write {
            path: "/cache/x.txt".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();

        assert!(matches!(err, Error::Storage(_)), "got {err:?}");
        assert_eq!(err.kind(), "storage");
    }

    #[test]
    fn test_invoke_error_keeps_exit_code() {
        let err: Error = InvokeError::Exited {
            code: Some(2),
            diagnostic: "Syntax Error?".to_owned(),
        }
        .into();

        let Error::Render {
            exit_code,
            diagnostic,
        } = &err
        else {
            panic!("expected render error, got {err:?}");
        };
        assert_eq!(*exit_code, Some(2));
        assert!(diagnostic.contains("Syntax Error?"));
        assert!(err.to_string().starts_with("Error running plantuml:"));
    }
}
