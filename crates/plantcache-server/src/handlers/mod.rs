//! HTTP request handlers.

pub(crate) mod embed;
pub(crate) mod render;
