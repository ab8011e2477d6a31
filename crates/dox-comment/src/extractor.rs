//! Abort-early extraction of the raw signature text.

use std::collections::HashMap;

use dox_markdown::{CaptureMode, ElementSink, MarkdownConverter};

/// Extracts only the `Declaration` subtree's text, then stops the
/// parse.
///
/// Every element open re-arms a plain-text capture, discarding the
/// previous one, so whichever element is in scope when text arrives is
/// the one captured. When the `Declaration` subtree closes, the
/// capture is stored and the conversion aborted. This shortcut is only
/// correct for well-formed documents where `Declaration` is a direct,
/// simple-content child of the root.
#[derive(Debug, Default)]
pub struct DeclarationExtractor {
    declaration: Option<String>,
}

impl DeclarationExtractor {
    /// Create an extractor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The extracted signature text, if the document contained one.
    #[must_use]
    pub fn finish(self) -> Option<String> {
        self.declaration
    }
}

impl ElementSink for DeclarationExtractor {
    fn open_element(
        &mut self,
        md: &mut MarkdownConverter,
        _tag: &str,
        _attrs: &HashMap<String, String>,
    ) {
        md.begin_capture(CaptureMode::Text);
    }

    fn close_element(&mut self, md: &mut MarkdownConverter, tag: &str) {
        if tag == "Declaration" {
            self.declaration = Some(md.end_capture().trim().to_owned());
            md.abort();
        }
    }
}
