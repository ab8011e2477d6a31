//! Full-schema declaration builder.

use std::collections::HashMap;

use dox_markdown::{CaptureMode, ElementSink, MarkdownConverter};

use crate::types::{Declaration, Parameter};

/// Walks the full documentation-comment schema and builds a
/// [`Declaration`].
///
/// The first element encountered becomes the declaration's kind and
/// supplies the `file`/`line`/`column` attributes; `Name`, `USR`, and
/// `Declaration` subtrees are captured as plain text; parameter and
/// result discussions are captured as Markdown. A `Discussion` outside
/// any parameter is intentionally not part of the record.
#[derive(Debug, Default)]
pub struct DeclarationBuilder {
    decl: Declaration,
    seen_root: bool,
    current_param: Option<Parameter>,
    /// Whether this builder started the capture currently open on the
    /// converter. Guards against ending captures it does not own.
    capturing: bool,
}

impl DeclarationBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated record, once the document has been consumed.
    #[must_use]
    pub fn finish(self) -> Declaration {
        self.decl
    }

    fn begin(&mut self, md: &mut MarkdownConverter, mode: CaptureMode) {
        md.begin_capture(mode);
        self.capturing = true;
    }

    /// End the capture this builder owns, if any.
    fn end(&mut self, md: &mut MarkdownConverter) -> Option<String> {
        if !self.capturing {
            return None;
        }
        self.capturing = false;
        Some(md.end_capture())
    }
}

impl ElementSink for DeclarationBuilder {
    fn open_element(
        &mut self,
        md: &mut MarkdownConverter,
        tag: &str,
        attrs: &HashMap<String, String>,
    ) {
        if !self.seen_root {
            // The outermost element names the declaration kind and
            // carries the source location.
            self.seen_root = true;
            self.decl.kind = tag.to_owned();
            self.decl.file = attrs.get("file").cloned();
            self.decl.line = attrs.get("line").and_then(|v| v.parse().ok());
            self.decl.column = attrs.get("column").and_then(|v| v.parse().ok());
            tracing::debug!(kind = tag, "building declaration record");
            return;
        }
        match tag {
            "Parameter" => self.current_param = Some(Parameter::default()),
            "Name" | "USR" | "Declaration" => self.begin(md, CaptureMode::Text),
            "Discussion" => {
                // Top-level discussion is not part of the record.
                if self.current_param.is_some() {
                    self.begin(md, CaptureMode::Markdown);
                }
            }
            "ResultDiscussion" => self.begin(md, CaptureMode::Markdown),
            _ => {}
        }
    }

    fn close_element(&mut self, md: &mut MarkdownConverter, tag: &str) {
        match tag {
            "Parameter" => {
                if let Some(param) = self.current_param.take() {
                    self.decl.parameters.push(param);
                }
            }
            "Name" => {
                if let Some(text) = self.end(md) {
                    let text = text.trim().to_owned();
                    if let Some(param) = &mut self.current_param {
                        param.name = text;
                    } else {
                        self.decl.name = Some(text);
                    }
                }
            }
            "USR" => {
                if let Some(text) = self.end(md) {
                    self.decl.usr = Some(text.trim().to_owned());
                }
            }
            "Declaration" => {
                if let Some(text) = self.end(md) {
                    self.decl.declaration = Some(text.trim().to_owned());
                }
            }
            "Discussion" => {
                // A capture is only ever open here for a parameter's
                // discussion; the top-level one never started one.
                if let Some(markdown) = self.end(md)
                    && let Some(param) = &mut self.current_param
                {
                    param.discussion = Some(markdown);
                }
            }
            "ResultDiscussion" => {
                if let Some(markdown) = self.end(md) {
                    self.decl.result_discussion = Some(markdown);
                }
            }
            _ => {}
        }
    }
}
