//! Formatting state for the conversion engine.

/// What kind of text a capture session produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureMode {
    /// Literal text runs are escaped for the Markdown renderer; the
    /// captured output is trimmed of surrounding whitespace.
    #[default]
    Markdown,
    /// Literal text runs pass through verbatim, untrimmed.
    Text,
}

/// The kind of list currently being rendered at this nesting level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    /// The item marker for this list kind.
    ///
    /// Numbered items always use `1.`; the renderer assigns ordinals.
    pub(crate) fn marker(self) -> &'static str {
        match self {
            Self::Bullet => "- ",
            Self::Numbered => "1. ",
        }
    }
}

/// Deferred action to run when the currently open element closes.
///
/// One entry is pushed per element open (including unrecognized
/// elements) and popped on the matching close, strictly LIFO. The
/// stack is what reconstructs hierarchical behavior from the flat
/// event stream.
#[derive(Debug)]
pub(crate) enum Closer {
    /// Nothing to do on close.
    None,
    /// Emit a literal string (e.g. `**` or `](href)`).
    Emit(String),
    /// End the open paragraph.
    Paragraph,
    /// Emit the closing code fence.
    CodeBlock,
    /// End a raw-HTML fragment; `block` records whether the open
    /// emitted a block prefix.
    RawHtml { block: bool },
    /// Pop one list level and restore the enclosing list kind.
    List { saved: Option<ListKind> },
    /// The open was forwarded to the external sink; forward the close.
    External,
}

/// Nesting context the converter holds while streaming events.
#[derive(Debug, Default)]
pub(crate) struct FormatState {
    /// List nesting depth; one unit is one list level (4 spaces).
    pub depth: usize,
    /// One-shot flag: skip the next block prefix emission. Set by a
    /// list-item marker so the item's first paragraph stays on the
    /// marker's line.
    pub skip_prefix: bool,
    pub in_paragraph: bool,
    pub in_code_block: bool,
    /// Inside a heading synthesized from `<hN>` raw HTML.
    pub in_heading: bool,
    /// Kind of the innermost active list, if any. Nested lists of the
    /// opposite kind save and restore this through [`Closer::List`].
    pub list: Option<ListKind>,
}

impl FormatState {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// The indentation prefix for the current list depth.
    pub(crate) fn indent(&self) -> String {
        "    ".repeat(self.depth)
    }

    /// Consume the one-shot suppression flag.
    ///
    /// Returns `true` if the next prefix emission should be skipped.
    pub(crate) fn take_skip_prefix(&mut self) -> bool {
        std::mem::take(&mut self.skip_prefix)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_indent_four_spaces_per_level() {
        let mut state = FormatState::default();
        assert_eq!(state.indent(), "");
        state.depth = 2;
        assert_eq!(state.indent(), "        ");
    }

    #[test]
    fn test_skip_prefix_is_one_shot() {
        let mut state = FormatState {
            skip_prefix: true,
            ..FormatState::default()
        };
        assert!(state.take_skip_prefix());
        assert!(!state.take_skip_prefix());
    }

    #[test]
    fn test_markers() {
        assert_eq!(ListKind::Bullet.marker(), "- ");
        assert_eq!(ListKind::Numbered.marker(), "1. ");
    }
}
