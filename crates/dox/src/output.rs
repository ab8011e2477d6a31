//! Terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Converted documents and their diagnostics both go to stdout;
/// diagnostics are styled when attached to a terminal.
pub(crate) struct Output {
    term: Term,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stdout(),
            red: Style::new().red(),
        }
    }

    /// Print a converted document.
    pub(crate) fn document(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Print an `ERROR:` diagnostic line.
    pub(crate) fn error(&self, msg: &str) {
        let line = format!("ERROR: {msg}");
        let _ = self.term.write_line(&self.red.apply_to(line).to_string());
    }
}
