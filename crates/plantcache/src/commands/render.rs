//! `plantcache render` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use plantcache_config::{Config, SourceBackend};
use plantcache_render::{DiagramInput, Embedder, ProcessInvoker, RenderCache};
use plantcache_source::{FsSourceResolver, GitSourceResolver, SourceResolver};
use plantcache_store::{ArtifactKind, ArtifactStore};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Diagram file to render (`-` or omitted: read from stdin).
    #[arg(conflicts_with = "source")]
    file: Option<PathBuf>,

    /// Render a diagram reference (`path` or `path@revision`) from the source root.
    #[arg(short, long)]
    source: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// Prints the content key on stdout and the artifact paths on stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read or
    /// the diagram cannot be rendered.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.config.load(None, None)?;
        let (renderer, jar) = config.require_renderer()?;

        let store = Arc::new(ArtifactStore::open(&config.cache_dir)?);
        let invoker = ProcessInvoker::plantuml(&renderer.java_bin, jar).timeout(renderer.timeout());
        let cache = Arc::new(RenderCache::new(Arc::clone(&store), invoker));
        let embedder = Embedder::new(cache, source_resolver(&config));

        let input = match self.source {
            Some(reference) => DiagramInput::Source(reference),
            None => DiagramInput::Inline(read_input(self.file.as_deref())?),
        };
        let embedded = embedder.render(&input)?;

        output.result(embedded.key.as_str())?;
        output.success(&format!(
            "Image: {}",
            store.path(&embedded.key, ArtifactKind::Image).display()
        ));
        if embedded.map.is_some() {
            output.info(&format!(
                "Map: {}",
                store.path(&embedded.key, ArtifactKind::Map).display()
            ));
        }

        Ok(())
    }
}

/// Resolver for `path[@revision]` references as configured.
fn source_resolver(config: &Config) -> Arc<dyn SourceResolver> {
    let root = config.source_resolved.root.clone();
    match config.source_resolved.backend {
        SourceBackend::Fs => Arc::new(FsSourceResolver::new(root)),
        SourceBackend::Git => Arc::new(GitSourceResolver::new(root)),
    }
}

/// Read diagram text from `file`, or from stdin for `None` and `-`.
fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
