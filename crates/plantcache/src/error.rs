//! CLI error types.

use plantcache_config::ConfigError;
use plantcache_store::{InvalidKey, StoreError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] plantcache_render::Error),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Key(#[from] InvalidKey),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(String),
}
