//! Error and diagnostic types for XML-to-Markdown conversion.

/// Error from a conversion running in fail-fast mode.
///
/// In the default degrade-and-report mode these conditions are recorded
/// as [`Diagnostic`]s instead and the conversion keeps its partial
/// output.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The XML tokenizer could not parse the document.
    #[error("XML parse error at line {line}, column {column}: {message}")]
    Xml {
        /// Tokenizer error message.
        message: String,
        /// 1-based line of the failure position.
        line: usize,
        /// 1-based column of the failure position.
        column: usize,
    },
}

/// A non-fatal problem encountered during conversion.
///
/// Diagnostics accumulate on the converter and are drained with
/// [`MarkdownConverter::take_diagnostics`](crate::MarkdownConverter::take_diagnostics).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable description of the problem.
    pub message: String,
    /// 1-based line in the source document.
    pub line: usize,
    /// 1-based column in the source document.
    pub column: usize,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}
