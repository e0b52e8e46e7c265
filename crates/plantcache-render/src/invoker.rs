//! External renderer invocation.
//!
//! [`RenderInvoker`] is the narrow seam between the cache and the renderer:
//! it receives the path of a markup file in a staging directory and is expected to leave the
//! image (and optionally a map) next to it, named after the markup file with
//! the extension replaced. [`ProcessInvoker`] implements it by running a
//! child process built from an argument vector (no shell involved).

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::consts::{CHARSET, DEFAULT_TIMEOUT, HEADLESS_FLAG, POLL_INTERVAL};

/// Renders a markup file into sibling image and map files.
pub trait RenderInvoker: Send + Sync {
    /// Render the markup file at `markup_path`.
    ///
    /// Success only means the renderer reported success; callers verify that
    /// the expected output actually exists.
    fn render(&self, markup_path: &Path) -> Result<(), InvokeError>;
}

/// Renderer invocation failure.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// The renderer could not be started.
    #[error("cannot start {}: {source}", program.display())]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Waiting for the renderer failed.
    #[error("cannot wait for renderer: {0}")]
    Wait(io::Error),

    /// The renderer exited unsuccessfully.
    #[error("{}", describe_exit(*code, diagnostic))]
    Exited {
        /// Exit code (`None` when terminated by a signal).
        code: Option<i32>,
        /// Captured stderr output.
        diagnostic: String,
    },

    /// The renderer did not finish in time and was killed.
    #[error("renderer timed out after {}s", timeout.as_secs_f64())]
    TimedOut {
        /// The bound that was exceeded.
        timeout: Duration,
    },
}

impl InvokeError {
    /// Exit code of the renderer, if it exited on its own.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: Option<i32>, diagnostic: &str) -> String {
    let status = match code {
        Some(code) => format!("renderer exited with status {code}"),
        None => "renderer terminated by signal".to_owned(),
    };
    if diagnostic.is_empty() {
        status
    } else {
        format!("{status}: {diagnostic}")
    }
}

/// Runs the renderer as a child process.
///
/// The command line is `program [args...] <markup_path>`. Stdin is closed,
/// stdout is discarded and stderr is captured as the failure diagnostic.
/// The run is bounded by a timeout after which the child is killed.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use std::time::Duration;
/// use plantcache_render::ProcessInvoker;
///
/// let invoker = ProcessInvoker::plantuml(Path::new("java"), Path::new("/opt/plantuml.jar"))
///     .timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ProcessInvoker {
    /// Create an invoker running `program` with no fixed arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `PlantUML` preset:
    /// `<java_bin> -Djava.awt.headless=true -jar <jar> -charset UTF-8 <markup>`.
    #[must_use]
    pub fn plantuml(java_bin: &Path, jar: &Path) -> Self {
        Self::new(java_bin)
            .arg(HEADLESS_FLAG)
            .arg("-jar")
            .arg(jar)
            .arg("-charset")
            .arg(CHARSET)
    }

    /// Append a fixed argument placed before the markup path.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the bound on a single run.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The full argument list for a given markup file (program excluded).
    #[must_use]
    pub fn command_args(&self, markup_path: &Path) -> Vec<OsString> {
        let mut args = self.args.clone();
        args.push(markup_path.as_os_str().to_owned());
        args
    }
}

impl RenderInvoker for ProcessInvoker {
    fn render(&self, markup_path: &Path) -> Result<(), InvokeError> {
        let mut child = Command::new(&self.program)
            .args(self.command_args(markup_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stderr = capture_stderr(&mut child);

        let Some(status) = wait_with_timeout(&mut child, self.timeout)? else {
            // The reader is left detached: a killed child's descendants may
            // still hold the pipe open.
            tracing::warn!(
                markup = %markup_path.display(),
                timeout_secs = self.timeout.as_secs_f64(),
                "Renderer timed out, killed"
            );
            return Err(InvokeError::TimedOut {
                timeout: self.timeout,
            });
        };

        if status.success() {
            return Ok(());
        }

        let diagnostic = stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        Err(InvokeError::Exited {
            code: status.code(),
            diagnostic: diagnostic.trim().to_owned(),
        })
    }
}

/// Drain the child's stderr on a separate thread so a chatty renderer can't
/// block on a full pipe.
fn capture_stderr(child: &mut Child) -> Option<JoinHandle<String>> {
    let mut pipe = child.stderr.take()?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

/// Wait for the child to exit, killing it once `timeout` elapses.
///
/// Returns `None` if the child was killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<ExitStatus>, InvokeError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(InvokeError::Wait)? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
