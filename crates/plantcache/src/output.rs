//! Terminal output.
//!
//! Status lines go to stderr, styled by [`Tone`]. Command results (keys,
//! maps) go to stdout unstyled so they can be piped.

use std::io;

use console::{Style, Term};

/// Status line style.
#[derive(Clone, Copy)]
enum Tone {
    Plain,
    Good,
    Caution,
    Failure,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Good => Style::new().green(),
            Self::Caution => Style::new().yellow(),
            Self::Failure => Style::new().red(),
        }
    }
}

pub(crate) struct Output {
    status: Term,
    results: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            results: Term::stdout(),
        }
    }

    fn status_line(&self, tone: Tone, msg: &str) {
        // stderr gone: nowhere left to report
        let _ = self
            .status
            .write_line(&tone.style().apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.status_line(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.status_line(Tone::Good, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.status_line(Tone::Caution, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.status_line(Tone::Failure, msg);
    }

    /// Write a command result line to stdout.
    pub(crate) fn result(&self, line: &str) -> io::Result<()> {
        self.results.write_line(line)
    }

    /// Whether stdout is attached to a terminal.
    pub(crate) fn stdout_is_term(&self) -> bool {
        self.results.is_term()
    }
}
