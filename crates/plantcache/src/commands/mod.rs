//! CLI command implementations.

pub(crate) mod fetch;
pub(crate) mod render;
pub(crate) mod serve;

use std::path::PathBuf;

use clap::Args;
use plantcache_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use fetch::FetchArgs;
pub(crate) use render::RenderArgs;
pub(crate) use serve::ServeArgs;

/// Configuration options shared by all commands.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover plantcache.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the `PlantUML` jar (overrides config).
    #[arg(long, env = "PLANTUML_JAR")]
    jar: Option<PathBuf>,

    /// Java executable (overrides config).
    #[arg(long)]
    java_bin: Option<PathBuf>,

    /// Cache directory (overrides config).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Root directory or repository for diagram references (overrides config).
    #[arg(long)]
    source_root: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load the configuration with these options applied.
    ///
    /// `host` and `port` are only meaningful for `serve`.
    pub(crate) fn load(
        self,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            host,
            port,
            jar: self.jar,
            java_bin: self.java_bin,
            cache_dir: self.cache_dir,
            source_root: self.source_root,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}
