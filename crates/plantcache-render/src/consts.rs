//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default bound on a single renderer run (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How often a running renderer is polled for exit.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// JVM flag that disables the windowing toolkit.
pub(crate) const HEADLESS_FLAG: &str = "-Djava.awt.headless=true";

/// Charset the renderer is told to read the markup with.
pub(crate) const CHARSET: &str = "UTF-8";

/// Default URL path under which images are served.
pub const DEFAULT_IMAGE_URL: &str = "/render";
