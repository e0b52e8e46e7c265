//! Diagram input detection.
//!
//! A host hands over either the diagram itself or a reference to where it is
//! kept. Inline diagrams are recognised by their `@startuml` opener; anything
//! else is taken as a `path[@revision]` reference.

/// Opening directive of an inline `PlantUML` diagram.
const START_DIRECTIVE: &str = "@startuml";

/// What the host asked to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramInput {
    /// Diagram text given directly.
    Inline(String),
    /// Reference to a stored diagram: `path` or `path@revision`.
    Source(String),
}

impl DiagramInput {
    /// Classify host input.
    ///
    /// An explicit `path` argument always wins. Otherwise content starting
    /// with `@startuml` (after whitespace) is inline text, and any other
    /// content is itself a source reference. Inline text is trimmed of
    /// surrounding whitespace before rendering.
    #[must_use]
    pub fn detect(content: &str, path: Option<&str>) -> Self {
        if let Some(path) = path {
            return Self::Source(path.trim().to_owned());
        }

        let trimmed = content.trim();
        if trimmed.is_empty() || trimmed.starts_with(START_DIRECTIVE) {
            Self::Inline(trimmed.to_owned())
        } else {
            Self::Source(trimmed.to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_inline() {
        assert_eq!(
            DiagramInput::detect("\n  @startuml\nA -> B\n@enduml\n", None),
            DiagramInput::Inline("@startuml\nA -> B\n@enduml".to_owned())
        );
    }

    #[test]
    fn test_detect_reference_in_content() {
        assert_eq!(
            DiagramInput::detect("docs/seq.puml@42", None),
            DiagramInput::Source("docs/seq.puml@42".to_owned())
        );
    }

    #[test]
    fn test_detect_explicit_path_wins() {
        assert_eq!(
            DiagramInput::detect("@startuml\nA -> B\n@enduml", Some(" seq.puml ")),
            DiagramInput::Source("seq.puml".to_owned())
        );
    }

    #[test]
    fn test_detect_empty_content() {
        assert_eq!(
            DiagramInput::detect("   ", None),
            DiagramInput::Inline(String::new())
        );
    }

    #[test]
    fn test_detect_empty_path() {
        assert_eq!(
            DiagramInput::detect("", Some("")),
            DiagramInput::Source(String::new())
        );
    }
}
