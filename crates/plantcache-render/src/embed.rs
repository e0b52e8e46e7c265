//! HTML embedding of cached diagrams.
//!
//! [`Embedder`] runs the whole host-side flow for one diagram: resolve the
//! source if needed, render through the [`RenderCache`], and produce the
//! HTML fragment that shows the image with its clickable map. Failures are
//! rendered as an inline error message in place of the image.

use std::sync::Arc;

use plantcache_source::SourceResolver;
use plantcache_store::ContentKey;

use crate::artifacts::ArtifactServer;
use crate::cache::RenderCache;
use crate::consts::DEFAULT_IMAGE_URL;
use crate::error::Error;
use crate::input::DiagramInput;

/// A diagram that is ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedded {
    /// Key under which the image is served.
    pub key: ContentKey,
    /// Clickable map markup, if the diagram has hotspots.
    pub map: Option<String>,
}

impl Embedded {
    /// Name the `<img usemap>` attribute must point at.
    ///
    /// Taken from the map's own `name` attribute, falling back to
    /// `{key}_map`.
    #[must_use]
    pub fn map_name(&self) -> String {
        self.map
            .as_deref()
            .and_then(map_name_attr)
            .map_or_else(|| format!("{}_map", self.key), str::to_owned)
    }

    /// HTML fragment: the map (if any) followed by the image tag.
    #[must_use]
    pub fn to_html(&self, image_url: &str) -> String {
        let src = format!("{image_url}?id={}", self.key);
        match &self.map {
            Some(map) => format!(
                r##"{map}<img src="{}" usemap="#{}" alt="diagram">"##,
                escape_html(&src),
                escape_html(&self.map_name())
            ),
            None => format!(r#"<img src="{}" alt="diagram">"#, escape_html(&src)),
        }
    }
}

/// Extract the value of the first `name="..."` attribute in map markup.
fn map_name_attr(map: &str) -> Option<&str> {
    let start = map.find(" name=\"")? + " name=\"".len();
    let len = map[start..].find('"')?;
    Some(&map[start..start + len]).filter(|name| !name.is_empty())
}

/// Escape text for use in HTML content and attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Inline error message shown instead of a diagram.
#[must_use]
pub fn error_html(err: &Error) -> String {
    format!(
        r#"<figure class="diagram diagram-error"><pre>{}</pre></figure>"#,
        escape_html(&err.to_string())
    )
}

/// Resolves, renders and embeds diagrams.
pub struct Embedder {
    cache: Arc<RenderCache>,
    artifacts: ArtifactServer,
    sources: Arc<dyn SourceResolver>,
    image_url: String,
}

impl Embedder {
    /// Create an embedder serving images under the default `/render` URL.
    pub fn new(cache: Arc<RenderCache>, sources: Arc<dyn SourceResolver>) -> Self {
        let artifacts = ArtifactServer::new(Arc::clone(cache.store()));
        Self {
            cache,
            artifacts,
            sources,
            image_url: DEFAULT_IMAGE_URL.to_owned(),
        }
    }

    /// Set the URL path images are served under.
    #[must_use]
    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Resolve and render `input`.
    pub fn render(&self, input: &DiagramInput) -> Result<Embedded, Error> {
        let text = match input {
            DiagramInput::Inline(text) => text.clone(),
            DiagramInput::Source(reference) if reference.is_empty() => {
                return Err(Error::NotFound("Path not specified".to_owned()));
            }
            DiagramInput::Source(reference) => {
                self.sources.resolve(reference).ok_or_else(|| {
                    Error::NotFound(format!("File not found in repository: {reference}"))
                })?
            }
        };

        let key = self.cache.get_or_render(&text)?;
        let map = self.artifacts.fetch_map(&key)?;
        Ok(Embedded { key, map })
    }

    /// Resolve, render and return the HTML fragment for `input`.
    ///
    /// Never fails: errors become an inline message.
    pub fn expand(&self, input: &DiagramInput) -> String {
        match self.render(input) {
            Ok(embedded) => embedded.to_html(&self.image_url),
            Err(err) => {
                tracing::debug!(kind = err.kind(), error = %err, "Diagram replaced by error message");
                error_html(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use plantcache_source::MemorySource;
    use plantcache_store::ArtifactStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use crate::invoker::{InvokeError, RenderInvoker};

    const MAP: &str = r#"<map id="plantuml_map" name="plantuml_map"><area href="/wiki/Bob"></map>"#;

    /// Writes an image, and a map for diagrams mentioning a link.
    struct LinkAwareRenderer(Arc<AtomicUsize>);

    impl RenderInvoker for LinkAwareRenderer {
        fn render(&self, markup_path: &Path) -> Result<(), InvokeError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let markup = std::fs::read_to_string(markup_path).unwrap();
            if markup.contains("broken") {
                return Err(InvokeError::Exited {
                    code: Some(1),
                    diagnostic: "Syntax Error? <line 2>".to_owned(),
                });
            }
            std::fs::write(markup_path.with_extension("png"), b"png").unwrap();
            if markup.contains("[[") {
                std::fs::write(markup_path.with_extension("cmapx"), MAP).unwrap();
            }
            Ok(())
        }
    }

    fn setup() -> (TempDir, Embedder, Arc<AtomicUsize>) {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(ArtifactStore::open(tmp.path()).unwrap());
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(RenderCache::new(
            store,
            LinkAwareRenderer(Arc::clone(&calls)),
        ));
        let sources = MemorySource::new()
            .with_source("seq.puml", "@startuml\nA -> B\n@enduml")
            .with_revision("seq.puml", "1", "@startuml\nA -> C\n@enduml");
        (tmp, Embedder::new(cache, Arc::new(sources)), calls)
    }

    #[test]
    fn test_expand_inline_without_map() {
        let (_tmp, embedder, _calls) = setup();
        let text = "@startuml\nA -> B\n@enduml";
        let key = ContentKey::compute(text.as_bytes());

        let html = embedder.expand(&DiagramInput::detect(text, None));

        assert_eq!(html, format!(r#"<img src="/render?id={key}" alt="diagram">"#));
    }

    #[test]
    fn test_expand_inline_with_map() {
        let (_tmp, embedder, _calls) = setup();
        let text = "@startuml\nA -> B: [[/wiki/Bob]]\n@enduml";
        let key = ContentKey::compute(text.as_bytes());

        let html = embedder
            .image_url("/plantuml")
            .expand(&DiagramInput::detect(text, None));

        assert_eq!(
            html,
            format!(r##"{MAP}<img src="/plantuml?id={key}" usemap="#plantuml_map" alt="diagram">"##)
        );
    }

    #[test]
    fn test_source_and_inline_share_cache() {
        let (_tmp, embedder, calls) = setup();

        let from_source = embedder
            .render(&DiagramInput::detect("seq.puml", None))
            .unwrap();
        let inline = embedder
            .render(&DiagramInput::detect("@startuml\nA -> B\n@enduml", None))
            .unwrap();

        assert_eq!(from_source.key, inline.key);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_source_revision() {
        let (_tmp, embedder, _calls) = setup();

        let embedded = embedder
            .render(&DiagramInput::detect("seq.puml@1", None))
            .unwrap();

        assert_eq!(
            embedded.key,
            ContentKey::compute(b"@startuml\nA -> C\n@enduml")
        );
    }

    #[test]
    fn test_missing_source_message() {
        let (_tmp, embedder, calls) = setup();

        let html = embedder.expand(&DiagramInput::detect("missing.puml@3", None));

        assert_eq!(
            html,
            r#"<figure class="diagram diagram-error"><pre>File not found in repository: missing.puml@3</pre></figure>"#
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_path_message() {
        let (_tmp, embedder, _calls) = setup();

        let err = embedder
            .render(&DiagramInput::detect("", Some("")))
            .unwrap_err();

        assert_eq!(err.to_string(), "Path not specified");
    }

    #[test]
    fn test_empty_content_message() {
        let (_tmp, embedder, _calls) = setup();

        let html = embedder.expand(&DiagramInput::detect("  ", None));

        assert!(html.contains("No UML text defined"), "got {html}");
    }

    #[test]
    fn test_render_error_message_is_escaped() {
        let (_tmp, embedder, _calls) = setup();

        let html = embedder.expand(&DiagramInput::detect("@startuml\nbroken\n@enduml", None));

        assert!(html.starts_with(r#"<figure class="diagram diagram-error">"#));
        assert!(html.contains("Error running plantuml"));
        assert!(html.contains("Syntax Error? &lt;line 2&gt;"), "got {html}");
    }

    #[test]
    fn test_map_name_fallback() {
        let key = ContentKey::compute(b"x");
        let embedded = Embedded {
            key: key.clone(),
            map: Some("<map></map>".to_owned()),
        };

        assert_eq!(embedded.map_name(), format!("{key}_map"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
