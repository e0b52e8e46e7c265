//! `plantcache serve` command implementation.

use clap::Args;
use plantcache_server::{run_server, server_config_from_config};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    /// Serve rendered diagrams until interrupted.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.config.load(self.host, self.port)?;
        // Renderer setup errors are reported before binding
        let server_config = server_config_from_config(&config)?;

        output.info(&format!(
            "Starting server on {}:{}",
            server_config.host, server_config.port
        ));
        output.info(&format!("PlantUML jar: {}", server_config.jar.display()));
        output.info(&format!(
            "Cache directory: {}",
            server_config.cache_dir.display()
        ));
        output.info(&format!(
            "Diagram sources: {} ({:?})",
            server_config.source_root.display(),
            server_config.source_backend
        ));

        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    }
}
