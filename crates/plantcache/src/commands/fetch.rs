//! `plantcache fetch` command implementation.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use plantcache_render::ArtifactServer;
use plantcache_store::{ArtifactStore, ContentKey};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the fetch command.
#[derive(Args)]
pub(crate) struct FetchArgs {
    /// Content key printed by `render`.
    key: String,

    /// Write to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Fetch the clickable map instead of the image.
    #[arg(long)]
    map: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

impl FetchArgs {
    /// Execute the fetch command.
    ///
    /// Fetching never renders: a key that was not rendered is not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is malformed or unknown, or the output
    /// cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let key = ContentKey::parse(&self.key)?;
        let config = self.config.load(None, None)?;
        let artifacts = ArtifactServer::new(Arc::new(ArtifactStore::open(&config.cache_dir)?));

        let Some(bytes) = read_artifact(&artifacts, &key, self.map)? else {
            output.warning("Diagram has no clickable map");
            return Ok(());
        };

        match self.output_file {
            Some(path) => {
                std::fs::write(&path, &bytes)?;
                output.success(&format!("Wrote {} ({} bytes)", path.display(), bytes.len()));
            }
            None if self.map => output.result(&String::from_utf8_lossy(&bytes))?,
            None => {
                if output.stdout_is_term() {
                    return Err(CliError::Validation(
                        "Refusing to write image data to a terminal; use --output".to_owned(),
                    ));
                }
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&bytes)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

/// Image bytes of `key`, or its map markup when `map` is set.
///
/// `None` means the diagram exists but has no clickable map.
fn read_artifact(
    artifacts: &ArtifactServer,
    key: &ContentKey,
    map: bool,
) -> Result<Option<Vec<u8>>, CliError> {
    if !map {
        return Ok(Some(artifacts.fetch(key)?.bytes));
    }
    if !artifacts.contains(key) {
        return Err(plantcache_render::Error::NotFound(format!("Diagram not found: {key}")).into());
    }
    Ok(artifacts.fetch_map(key)?.map(String::into_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use plantcache_store::ArtifactKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const MAP: &str = r#"<map id="plantuml_map" name="plantuml_map"></map>"#;

    #[derive(Parser)]
    struct FetchCli {
        #[command(flatten)]
        args: FetchArgs,
    }

    /// A config file and cache under a temp dir, holding one diagram with
    /// a map and one without.
    struct Fixture {
        tmp: TempDir,
        with_map: ContentKey,
        without_map: ContentKey,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            std::fs::write(tmp.path().join("plantcache.toml"), "").unwrap();
            let store = ArtifactStore::open(tmp.path().join(".plantcache/cache")).unwrap();

            let with_map = ContentKey::compute(b"@startuml\nA -> B\n@enduml");
            store.write(&with_map, ArtifactKind::Image, b"PNG-A").unwrap();
            store.write(&with_map, ArtifactKind::Map, MAP.as_bytes()).unwrap();
            let without_map = ContentKey::compute(b"@startuml\nB -> C\n@enduml");
            store.write(&without_map, ArtifactKind::Image, b"PNG-B").unwrap();

            Self {
                tmp,
                with_map,
                without_map,
            }
        }

        fn artifacts(&self) -> ArtifactServer {
            let store = ArtifactStore::open(self.tmp.path().join(".plantcache/cache")).unwrap();
            ArtifactServer::new(Arc::new(store))
        }

        /// Run `plantcache fetch <key> --output <file> [extra]` against the
        /// fixture config; returns the result and the output path.
        fn fetch_to_file(&self, key: &str, extra: &[&str]) -> (Result<(), CliError>, PathBuf) {
            let out = self.tmp.path().join("out");
            let config = self.tmp.path().join("plantcache.toml");
            let mut argv = vec![
                "fetch",
                key,
                "--config",
                config.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
            ];
            argv.extend_from_slice(extra);
            let cli = FetchCli::try_parse_from(argv).unwrap();
            (cli.args.execute(), out)
        }
    }

    #[test]
    fn test_read_image() {
        let fixture = Fixture::new();

        let bytes = read_artifact(&fixture.artifacts(), &fixture.with_map, false).unwrap();

        assert_eq!(bytes.as_deref(), Some(&b"PNG-A"[..]));
    }

    #[test]
    fn test_read_map() {
        let fixture = Fixture::new();

        let bytes = read_artifact(&fixture.artifacts(), &fixture.with_map, true).unwrap();

        assert_eq!(bytes.as_deref(), Some(MAP.as_bytes()));
    }

    #[test]
    fn test_read_map_of_diagram_without_map() {
        let fixture = Fixture::new();

        let bytes = read_artifact(&fixture.artifacts(), &fixture.without_map, true).unwrap();

        assert_eq!(bytes, None);
    }

    #[test]
    fn test_read_unknown_key_is_not_found() {
        let fixture = Fixture::new();
        let unknown = ContentKey::compute(b"never rendered");

        for map in [false, true] {
            let err = read_artifact(&fixture.artifacts(), &unknown, map).unwrap_err();
            assert!(
                matches!(err, CliError::Render(plantcache_render::Error::NotFound(_))),
                "got {err:?}"
            );
        }
    }

    #[test]
    fn test_fetch_writes_image_to_output_file() {
        let fixture = Fixture::new();

        let (result, out) = fixture.fetch_to_file(fixture.with_map.as_str(), &[]);

        result.unwrap();
        assert_eq!(std::fs::read(out).unwrap(), b"PNG-A");
    }

    #[test]
    fn test_fetch_writes_map_to_output_file() {
        let fixture = Fixture::new();

        let (result, out) = fixture.fetch_to_file(fixture.with_map.as_str(), &["--map"]);

        result.unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), MAP);
    }

    #[test]
    fn test_fetch_map_of_diagram_without_map_writes_nothing() {
        let fixture = Fixture::new();

        let (result, out) = fixture.fetch_to_file(fixture.without_map.as_str(), &["--map"]);

        result.unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_fetch_unknown_key_fails() {
        let fixture = Fixture::new();
        let unknown = ContentKey::compute(b"never rendered");

        let (result, out) = fixture.fetch_to_file(unknown.as_str(), &[]);

        assert!(result.unwrap_err().to_string().contains("not found"));
        assert!(!out.exists());
    }

    #[test]
    fn test_fetch_malformed_key_fails() {
        let fixture = Fixture::new();

        let (result, _out) = fixture.fetch_to_file("../../etc/passwd", &[]);

        assert!(matches!(result, Err(CliError::Key(_))));
    }
}
