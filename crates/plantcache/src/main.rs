//! `plantcache` command line.
//!
//! `serve` runs the HTTP server, `render` fills the cache and prints the
//! key, `fetch` reads a cached image or clickable map back out.

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{FetchArgs, RenderArgs, ServeArgs};
use error::CliError;
use output::Output;

/// plantcache - Content-addressed `PlantUML` render cache.
#[derive(Parser)]
#[command(name = "plantcache", version, about)]
struct Cli {
    /// Log cache hits, renders and requests.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve(ServeArgs),
    /// Render a diagram into the cache.
    Render(RenderArgs),
    /// Fetch a cached image or map by key.
    Fetch(FetchArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // RUST_LOG applies unless --verbose asks for info
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => tokio::runtime::Runtime::new()
            .map_err(CliError::from)
            .and_then(|rt| rt.block_on(args.execute())),
        Commands::Render(args) => args.execute(),
        Commands::Fetch(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
