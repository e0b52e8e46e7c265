//! `plantcache.toml` loading.
//!
//! A config file is taken from an explicit path or found by walking up from
//! the working directory. Without one, defaults apply relative to the
//! working directory. Relative paths in a file are resolved against the
//! directory containing it, and [`CliSettings`] are applied last.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 7979
//!
//! [renderer]
//! jar = "${PLANTUML_JAR}"
//! java_bin = "java"
//! timeout_secs = 60
//!
//! [cache]
//! dir = ".plantcache/cache"
//!
//! [source]
//! root = "."
//! backend = "fs"
//! ```
//!
//! `server.host`, `renderer.jar` and `renderer.java_bin` accept `${VAR}` and
//! `${VAR:-default}` references to environment variables.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Config file name looked up in the working directory and its ancestors.
const CONFIG_FILENAME: &str = "plantcache.toml";

/// Default cache directory, relative to the config file.
const DEFAULT_CACHE_DIR: &str = ".plantcache/cache";

/// Upper bound accepted for `renderer.timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Command-line overrides, applied after the file is loaded.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// `--host`.
    pub host: Option<String>,
    /// `--port`.
    pub port: Option<u16>,
    /// `--jar`.
    pub jar: Option<PathBuf>,
    /// `--java-bin`.
    pub java_bin: Option<PathBuf>,
    /// `--cache-dir`.
    pub cache_dir: Option<PathBuf>,
    /// `--source-root`.
    pub source_root: Option<PathBuf>,
}

/// Loaded plantcache configuration.
///
/// Path-valued sections are parsed into private raw structs and exposed
/// through the `*_resolved` fields once resolved against the config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen address.
    pub server: ServerConfig,
    renderer: RendererConfigRaw,
    cache: CacheConfigRaw,
    source: SourceConfigRaw,

    /// Renderer settings with resolved paths.
    #[serde(skip)]
    pub renderer_resolved: RendererConfig,
    /// Directory holding cached artifacts.
    #[serde(skip)]
    pub cache_dir: PathBuf,
    /// Diagram source settings with a resolved root.
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::relative_to(&std::env::current_dir().unwrap_or_default())
    }
}

/// `[server]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RendererConfigRaw {
    jar: Option<String>,
    java_bin: Option<String>,
    timeout_secs: Option<u64>,
}

/// `[renderer]` section.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Path to the `PlantUML` jar (`None` until configured).
    pub jar: Option<PathBuf>,
    /// Java executable (default: `java` from `PATH`).
    pub java_bin: PathBuf,
    /// Bound on a single renderer run, in seconds.
    pub timeout_secs: u64,
}

impl RendererConfig {
    /// Bound on a single renderer run.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            jar: None,
            java_bin: PathBuf::from("java"),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    root: Option<String>,
    backend: Option<SourceBackend>,
}

/// Where `path[@revision]` references are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceBackend {
    /// Plain files under the source root (no revisions).
    #[default]
    Fs,
    /// A git repository at the source root.
    Git,
}

/// `[source]` section.
#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
    /// Source root directory (or repository).
    pub root: PathBuf,
    /// Backend reading the sources.
    pub backend: SourceBackend,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly given config file does not exist.
    #[error("Config file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    /// The config file could not be read.
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid TOML for this schema.
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range, or the renderer is unusable.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// An environment variable reference could not be expanded.
    #[error("Cannot expand {field}: {message}")]
    EnvVar {
        /// Config key holding the reference (e.g. `renderer.jar`).
        field: String,
        /// What went wrong (e.g. `${PLANTUML_JAR} not set`).
        message: String,
    },
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}

impl Config {
    /// Load the configuration and apply `cli_settings` on top.
    ///
    /// With `config_path` that file must exist. Without it the nearest
    /// `plantcache.toml` in the working directory or its ancestors is used,
    /// falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit file is missing, or a file cannot be
    /// read, parsed, expanded or validated.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }
        Ok(config)
    }

    /// Nearest config file in `start` or one of its ancestors.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Defaults with paths relative to `base`.
    fn relative_to(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            renderer: RendererConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            source: SourceConfigRaw::default(),
            renderer_resolved: RendererConfig::default(),
            cache_dir: base.join(DEFAULT_CACHE_DIR),
            source_resolved: SourceConfig {
                root: base.to_path_buf(),
                backend: SourceBackend::Fs,
            },
            config_path: None,
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(&std::fs::read_to_string(path)?)?;
        config.expand_env_vars()?;
        config.resolve_paths(path.parent().unwrap_or(Path::new(".")));
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(jar) = &settings.jar {
            self.renderer_resolved.jar = Some(jar.clone());
        }
        if let Some(java_bin) = &settings.java_bin {
            self.renderer_resolved.java_bin.clone_from(java_bin);
        }
        if let Some(dir) = &settings.cache_dir {
            self.cache_dir.clone_from(dir);
        }
        if let Some(root) = &settings.source_root {
            self.source_resolved.root.clone_from(root);
        }
    }

    /// Renderer settings, checked to be usable, and the jar path.
    ///
    /// Not checked at load: commands that only read the cache need no jar.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the jar is unset, missing, or
    /// not a `.jar` file.
    pub fn require_renderer(&self) -> Result<(&RendererConfig, &Path), ConfigError> {
        let renderer = &self.renderer_resolved;
        let Some(jar) = renderer.jar.as_deref() else {
            return Err(invalid("renderer.jar option not defined"));
        };
        if !jar.is_file() {
            return Err(invalid(format!(
                "renderer.jar not found at '{}'",
                jar.display()
            )));
        }
        if jar.extension().is_none_or(|ext| ext != "jar") {
            return Err(invalid(format!(
                "'{}' is not the path of a JAR file",
                jar.display()
            )));
        }
        Ok((renderer, jar))
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(invalid("server.host cannot be empty"));
        }
        // Port 0 would bind a random port
        if self.server.port == 0 {
            return Err(invalid("server.port cannot be 0"));
        }

        let renderer = &self.renderer_resolved;
        if !(1..=MAX_TIMEOUT_SECS).contains(&renderer.timeout_secs) {
            return Err(invalid(format!(
                "renderer.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                renderer.timeout_secs
            )));
        }
        if renderer.java_bin.as_os_str().is_empty() {
            return Err(invalid("renderer.java_bin cannot be empty"));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.renderer.jar = self
            .renderer
            .jar
            .as_deref()
            .map(|jar| expand::expand_env(jar, "renderer.jar"))
            .transpose()?;
        self.renderer.java_bin = self
            .renderer
            .java_bin
            .as_deref()
            .map(|bin| expand::expand_env(bin, "renderer.java_bin"))
            .transpose()?;
        Ok(())
    }

    /// Resolve raw paths against `config_dir`.
    ///
    /// A `java_bin` without a path separator stays a bare name, looked up on
    /// `PATH` when the renderer runs.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = RendererConfig::default();
        let java_bin = match self.renderer.java_bin.as_deref() {
            Some(bin) if bin.contains(['/', '\\']) => config_dir.join(bin),
            Some(bin) => PathBuf::from(bin),
            None => defaults.java_bin,
        };
        self.renderer_resolved = RendererConfig {
            jar: self.renderer.jar.as_deref().map(|jar| config_dir.join(jar)),
            java_bin,
            timeout_secs: self.renderer.timeout_secs.unwrap_or(defaults.timeout_secs),
        };

        self.cache_dir = config_dir.join(self.cache.dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR));
        self.source_resolved = SourceConfig {
            root: config_dir.join(self.source.root.as_deref().unwrap_or(".")),
            backend: self.source.backend.unwrap_or_default(),
        };
    }
}
