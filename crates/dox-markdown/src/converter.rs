//! Event-driven XML-to-Markdown conversion engine.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{ConvertError, Diagnostic};
use crate::escape::escape_markdown;
use crate::html::{self, HeadingTag};
use crate::sink::ElementSink;
use crate::state::{CaptureMode, Closer, FormatState, ListKind};

/// Recognized documentation-comment elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Element {
    Para,
    Emphasis,
    Strong,
    CodeVoice,
    CodeListing,
    CodeLine,
    Link,
    RawHtml,
    BulletList,
    NumberedList,
    Item,
    Other,
}

impl Element {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "Para" => Self::Para,
            "emphasis" => Self::Emphasis,
            "strong" => Self::Strong,
            "codeVoice" => Self::CodeVoice,
            "CodeListing" => Self::CodeListing,
            "zCodeLineNumbered" => Self::CodeLine,
            "Link" => Self::Link,
            "rawHTML" => Self::RawHtml,
            "List-Bullet" => Self::BulletList,
            "List-Number" => Self::NumberedList,
            "Item" => Self::Item,
            _ => Self::Other,
        }
    }
}

/// Streaming XML-to-Markdown converter.
///
/// Consumes `quick-xml` events and emits Markdown into an internal
/// buffer owned by the current capture session. Recognized elements
/// (paragraphs, inline markup, code listings, lists, raw HTML) are
/// rendered directly; everything else is forwarded to the optional
/// [`ElementSink`].
///
/// A stack of deferred close actions, pushed on every element open and
/// popped on the matching close, reconstructs the hierarchical output
/// grammar from the flat event stream.
pub struct MarkdownConverter {
    out: String,
    mode: CaptureMode,
    state: FormatState,
    closers: Vec<Closer>,
    diagnostics: Vec<Diagnostic>,
    fail_fast: bool,
    abort: bool,
}

impl MarkdownConverter {
    /// Create a converter in the default degrade-and-report mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
            mode: CaptureMode::Markdown,
            state: FormatState::default(),
            closers: Vec::new(),
            diagnostics: Vec::new(),
            fail_fast: false,
            abort: false,
        }
    }

    /// Make [`convert`](Self::convert) return an error on malformed
    /// XML instead of recording a diagnostic and keeping the partial
    /// output.
    #[must_use]
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Start a capture session.
    ///
    /// Resets the output buffer, indent state, and formatting context.
    /// The mode selects whether literal text is escaped for Markdown
    /// or passed through verbatim.
    pub fn begin_capture(&mut self, mode: CaptureMode) {
        self.out.clear();
        self.mode = mode;
        self.state.reset();
    }

    /// End the capture session and return its output.
    ///
    /// Markdown captures are trimmed of surrounding whitespace; text
    /// captures are returned as-is.
    pub fn end_capture(&mut self) -> String {
        let out = std::mem::take(&mut self.out);
        match self.mode {
            CaptureMode::Markdown => out.trim().to_owned(),
            CaptureMode::Text => out,
        }
    }

    /// Stop delivering further events to this conversion.
    ///
    /// Used by sinks that only need a prefix of the document.
    pub fn abort(&mut self) {
        self.abort = true;
    }

    /// Diagnostics recorded by the most recent conversion.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Drive one full parse of `xml`, filling the active capture.
    ///
    /// Elements outside the recognized vocabulary are forwarded to
    /// `sink`, which may begin and end its own capture sessions over
    /// the subtrees it owns.
    ///
    /// # Errors
    ///
    /// Malformed XML is recorded as a diagnostic and the accumulated
    /// partial output is kept; an error is returned only in fail-fast
    /// mode.
    pub fn convert(
        &mut self,
        xml: &str,
        mut sink: Option<&mut dyn ElementSink>,
    ) -> Result<(), ConvertError> {
        self.closers.clear();
        self.diagnostics.clear();
        self.abort = false;

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        loop {
            if self.abort {
                tracing::debug!("conversion aborted by consumer");
                break;
            }
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let tag = decode_tag(&reader, e.name().as_ref());
                    let attrs = decode_attrs(&reader, &e);
                    self.open_element(&tag, &attrs, &mut sink);
                }
                Ok(Event::Empty(e)) => {
                    // Self-closing element: open and close back to back.
                    let tag = decode_tag(&reader, e.name().as_ref());
                    let attrs = decode_attrs(&reader, &e);
                    self.open_element(&tag, &attrs, &mut sink);
                    self.close_element(&tag, &mut sink);
                }
                Ok(Event::End(e)) => {
                    let tag = decode_tag(&reader, e.name().as_ref());
                    self.close_element(&tag, &mut sink);
                }
                Ok(Event::Text(e)) => match reader.decoder().decode(&e) {
                    Ok(text) => self.text(&text),
                    Err(err) => {
                        self.report(xml, reader.buffer_position(), &format!("text decoding failed: {err}"));
                    }
                },
                Ok(Event::GeneralRef(e)) => match reader.decoder().decode(&e) {
                    Ok(entity) => self.text(&decode_entity(&entity)),
                    Err(err) => {
                        self.report(xml, reader.buffer_position(), &format!("entity decoding failed: {err}"));
                    }
                },
                Ok(Event::CData(e)) => match std::str::from_utf8(&e) {
                    Ok(content) => self.cdata(content),
                    Err(err) => {
                        // The block's content is omitted from output.
                        self.report(xml, reader.buffer_position(), &format!("invalid UTF-8 in CDATA: {err}"));
                    }
                },
                Ok(Event::Eof) => break,
                Ok(Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_)) => {}
                Err(err) => {
                    let (line, column) = position(xml, reader.error_position());
                    let message = format!("XML parse error: {err}");
                    tracing::warn!(line, column, %err, "stopping at malformed XML");
                    self.diagnostics.push(Diagnostic {
                        message: message.clone(),
                        line,
                        column,
                    });
                    if self.fail_fast {
                        return Err(ConvertError::Xml {
                            message,
                            line,
                            column,
                        });
                    }
                    break;
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn open_element(
        &mut self,
        tag: &str,
        attrs: &HashMap<String, String>,
        sink: &mut Option<&mut dyn ElementSink>,
    ) {
        let closer = match Element::from_tag(tag) {
            Element::Emphasis => {
                self.emit("*");
                Closer::Emit("*".to_owned())
            }
            Element::Strong => {
                self.emit("**");
                Closer::Emit("**".to_owned())
            }
            Element::CodeVoice => {
                self.emit("`");
                Closer::Emit("`".to_owned())
            }
            Element::Link => {
                self.emit("[");
                let href = attrs.get("href").map_or("", String::as_str);
                Closer::Emit(format!("]({href})"))
            }
            Element::Para => {
                if !self.state.take_skip_prefix() {
                    self.emit("\n");
                    self.emit_indent();
                }
                self.state.in_paragraph = true;
                Closer::Paragraph
            }
            Element::CodeListing => {
                self.emit("\n");
                self.emit_indent();
                self.emit("```");
                if let Some(language) = attrs.get("language") {
                    self.emit(language);
                }
                self.emit("\n");
                self.state.in_code_block = true;
                Closer::CodeBlock
            }
            // Transparent wrapper around one CDATA code line.
            Element::CodeLine => Closer::None,
            Element::RawHtml => {
                let block = !self.state.in_paragraph;
                if block {
                    self.emit("\n");
                    self.emit_indent();
                }
                Closer::RawHtml { block }
            }
            Element::BulletList => self.open_list(ListKind::Bullet),
            Element::NumberedList => self.open_list(ListKind::Numbered),
            Element::Item => {
                // The marker aligns one level shallower than the
                // item's content.
                if self.state.depth > 0 {
                    self.state.depth -= 1;
                    self.emit_indent();
                    self.state.depth += 1;
                }
                let marker = self.state.list.map_or("- ", ListKind::marker);
                self.emit(marker);
                self.state.skip_prefix = true;
                Closer::None
            }
            Element::Other => {
                tracing::debug!(tag, "forwarding unrecognized element");
                if let Some(sink) = sink.as_deref_mut() {
                    sink.open_element(self, tag, attrs);
                }
                Closer::External
            }
        };
        self.closers.push(closer);
    }

    fn open_list(&mut self, kind: ListKind) -> Closer {
        let saved = self.state.list.take();
        if saved.is_none() {
            // The renderer requires a blank line before a list that is
            // not itself nested in a list.
            self.emit("\n");
        }
        self.state.list = Some(kind);
        self.state.depth += 1;
        Closer::List { saved }
    }

    fn close_element(&mut self, tag: &str, sink: &mut Option<&mut dyn ElementSink>) {
        match self.closers.pop() {
            Some(Closer::None) | None => {}
            Some(Closer::Emit(text)) => self.emit(&text),
            Some(Closer::Paragraph) => {
                self.emit("\n");
                self.state.in_paragraph = false;
            }
            Some(Closer::CodeBlock) => {
                self.emit_indent();
                self.emit("```\n");
                self.state.in_code_block = false;
            }
            Some(Closer::RawHtml { block }) => {
                if block && !self.state.in_heading {
                    self.emit("\n");
                }
                self.state.in_heading = false;
            }
            Some(Closer::List { saved }) => {
                self.state.depth -= 1;
                self.state.list = saved;
            }
            Some(Closer::External) => {
                if let Some(sink) = sink.as_deref_mut() {
                    sink.close_element(self, tag);
                }
            }
        }
    }

    /// Handle a literal character-data run.
    fn text(&mut self, text: &str) {
        match self.mode {
            CaptureMode::Markdown => {
                let escaped = escape_markdown(text);
                self.out.push_str(&escaped);
            }
            CaptureMode::Text => self.out.push_str(text),
        }
    }

    /// Handle a CDATA block: code-listing lines, sniffed raw HTML, or
    /// verbatim pass-through.
    fn cdata(&mut self, content: &str) {
        if self.state.in_code_block {
            // One source line per event; inner whitespace preserved.
            let content = content.strip_suffix('\n').unwrap_or(content);
            for line in content.split('\n') {
                self.emit_indent();
                self.emit(line);
                self.emit("\n");
            }
            return;
        }
        if let Some(image) = html::sniff_img(content) {
            self.emit(&image);
            return;
        }
        if html::is_hr(content) {
            self.emit("---");
            return;
        }
        match html::sniff_heading(content) {
            Some(HeadingTag::Open(level)) => {
                self.emit(&"#".repeat(level));
                self.emit(" ");
                // Suppresses the blank line after this raw-HTML block
                // so the heading text stays on the marker's line.
                self.state.in_heading = true;
            }
            Some(HeadingTag::Close) => {}
            None => self.emit(content),
        }
    }

    /// Append structural output (never escaped).
    fn emit(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn emit_indent(&mut self) {
        let indent = self.state.indent();
        self.out.push_str(&indent);
    }

    /// Report a non-fatal problem at the given byte offset.
    fn report(&mut self, xml: &str, offset: u64, message: &str) {
        let (line, column) = position(xml, offset);
        tracing::warn!(line, column, message, "conversion diagnostic");
        self.diagnostics.push(Diagnostic {
            message: message.to_owned(),
            line,
            column,
        });
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_tag(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

fn decode_attrs(reader: &Reader<&[u8]>, e: &BytesStart) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = reader.decoder().decode(attr.key.as_ref()).map_or_else(
            |_| String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            std::borrow::Cow::into_owned,
        );
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        attrs.insert(key, value);
    }
    attrs
}

/// Decode XML entity references to their character values.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        // Numeric character references
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown entity - preserve as-is
        _ => format!("&{entity};"),
    }
}

/// 1-based line/column for a byte offset into the source document.
fn position(input: &str, offset: u64) -> (usize, usize) {
    let offset = usize::try_from(offset)
        .unwrap_or(usize::MAX)
        .min(input.len());
    let bytes = &input.as_bytes()[..offset];
    let line = bytes.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    (line, offset - line_start + 1)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn convert_markdown(xml: &str) -> String {
        let mut converter = MarkdownConverter::new();
        converter.begin_capture(CaptureMode::Markdown);
        converter.convert(xml, None).unwrap();
        converter.end_capture()
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(convert_markdown("<Para>X</Para>"), "X");
    }

    #[test]
    fn test_adjacent_paragraphs() {
        assert_eq!(convert_markdown("<Para>X</Para><Para>Y</Para>"), "X\n\nY");
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            convert_markdown("<Para><emphasis>X</emphasis> <strong>Y</strong> <codeVoice>Z</codeVoice></Para>"),
            "*X* **Y** `Z`"
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            convert_markdown(r#"<Para><Link href="H">T</Link></Para>"#),
            "[T](H)"
        );
    }

    #[test]
    fn test_link_without_href() {
        assert_eq!(convert_markdown("<Para><Link>T</Link></Para>"), "[T]()");
    }

    #[test]
    fn test_escapes_markdown_characters() {
        assert_eq!(
            convert_markdown("<Para>a_b - c.d #e</Para>"),
            r"a\_b \- c\.d \#e"
        );
    }

    #[test]
    fn test_entity_references() {
        assert_eq!(
            convert_markdown("<Para>a &amp; b &#65;&#x42;</Para>"),
            "a & b AB"
        );
    }

    #[test]
    fn test_code_listing() {
        assert_eq!(
            convert_markdown("<CodeListing language=\"swift\"><![CDATA[let x = 1]]></CodeListing>"),
            "```swift\nlet x = 1\n```"
        );
    }

    #[test]
    fn test_code_listing_preserves_whitespace_unescaped() {
        let xml = "<CodeListing><zCodeLineNumbered><![CDATA[  a_b.c()]]></zCodeLineNumbered></CodeListing>";
        assert_eq!(convert_markdown(xml), "```\n  a_b.c()\n```");
    }

    #[test]
    fn test_bullet_list_after_paragraph() {
        let xml = "<Para>intro</Para>\
                   <List-Bullet>\
                   <Item><Para>item1</Para></Item>\
                   <Item><Para>item2</Para></Item>\
                   </List-Bullet>";
        assert_eq!(convert_markdown(xml), "intro\n\n- item1\n- item2");
    }

    #[test]
    fn test_numbered_list_markers_are_not_ordinal() {
        let xml = "<List-Number>\
                   <Item><Para>first</Para></Item>\
                   <Item><Para>second</Para></Item>\
                   </List-Number>";
        assert_eq!(convert_markdown(xml), "1. first\n1. second");
    }

    #[test]
    fn test_nested_list_indents_four_spaces() {
        let xml = "<List-Bullet>\
                   <Item><Para>outer</Para>\
                   <List-Bullet><Item><Para>inner</Para></Item></List-Bullet>\
                   </Item>\
                   <Item><Para>last</Para></Item>\
                   </List-Bullet>";
        assert_eq!(convert_markdown(xml), "- outer\n    - inner\n- last");
    }

    #[test]
    fn test_nested_list_restores_outer_kind() {
        let xml = "<List-Number>\
                   <Item><Para>one</Para>\
                   <List-Bullet><Item><Para>bullet</Para></Item></List-Bullet>\
                   </Item>\
                   <Item><Para>two</Para></Item>\
                   </List-Number>";
        assert_eq!(convert_markdown(xml), "1. one\n    - bullet\n1. two");
    }

    #[test]
    fn test_code_block_inside_list_item() {
        let xml = "<List-Bullet><Item><Para>item</Para>\
                   <CodeListing><![CDATA[code]]></CodeListing>\
                   </Item></List-Bullet>";
        assert_eq!(
            convert_markdown(xml),
            "- item\n\n    ```\n    code\n    ```"
        );
    }

    #[test]
    fn test_img_with_alt_and_title() {
        let xml = r#"<rawHTML><![CDATA[<img src="U" title="T" alt="A"/>]]></rawHTML>"#;
        assert_eq!(convert_markdown(xml), r#"![A](U "T")"#);
    }

    #[test]
    fn test_img_alt_before_title() {
        let xml = r#"<rawHTML><![CDATA[<img src="U" alt="A" title="T"/>]]></rawHTML>"#;
        assert_eq!(convert_markdown(xml), r#"![A](U "T")"#);
    }

    #[test]
    fn test_img_src_only() {
        let xml = r#"<rawHTML><![CDATA[<img src="U"/>]]></rawHTML>"#;
        assert_eq!(convert_markdown(xml), "![](U)");
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(
            convert_markdown("<rawHTML><![CDATA[<hr/>]]></rawHTML>"),
            "---"
        );
    }

    #[test]
    fn test_unrecognized_raw_html_passes_through() {
        assert_eq!(
            convert_markdown("<rawHTML><![CDATA[<br/>]]></rawHTML>"),
            "<br/>"
        );
    }

    #[test]
    fn test_heading_keeps_text_on_marker_line() {
        let xml = "<rawHTML><![CDATA[<h2>]]></rawHTML>\
                   Section\
                   <rawHTML><![CDATA[</h2>]]></rawHTML>\
                   <Para>after</Para>";
        assert_eq!(convert_markdown(xml), "## Section\n\n\nafter");
    }

    #[test]
    fn test_inline_raw_html_inside_paragraph() {
        let xml = "<Para>a<rawHTML><![CDATA[<br/>]]></rawHTML>b</Para>";
        assert_eq!(convert_markdown(xml), "a<br/>b");
    }

    #[test]
    fn test_text_capture_is_verbatim() {
        let mut converter = MarkdownConverter::new();
        converter.begin_capture(CaptureMode::Text);
        converter.convert("<Name>a_b.c()</Name>", None).unwrap();
        assert_eq!(converter.end_capture(), "a_b.c()");
    }

    #[test]
    fn test_malformed_xml_keeps_partial_output() {
        let mut converter = MarkdownConverter::new();
        converter.begin_capture(CaptureMode::Markdown);
        converter.convert("<Para>partial</Para", None).unwrap();
        assert!(!converter.diagnostics().is_empty());
        assert_eq!(converter.end_capture(), "partial");
    }

    #[test]
    fn test_fail_fast_returns_error() {
        let mut converter = MarkdownConverter::new().with_fail_fast(true);
        converter.begin_capture(CaptureMode::Markdown);
        let err = converter.convert("<Para>partial</Para", None).unwrap_err();
        assert!(matches!(err, ConvertError::Xml { .. }));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let xml = "<Para>X</Para><List-Bullet><Item><Para>i</Para></Item></List-Bullet>";
        let mut converter = MarkdownConverter::new();
        converter.begin_capture(CaptureMode::Markdown);
        converter.convert(xml, None).unwrap();
        let first = converter.end_capture();
        converter.begin_capture(CaptureMode::Markdown);
        converter.convert(xml, None).unwrap();
        assert_eq!(converter.end_capture(), first);
    }

    #[test]
    fn test_position_reporting() {
        assert_eq!(position("abc", 2), (1, 3));
        assert_eq!(position("a\nbc\nd", 5), (3, 1));
        assert_eq!(position("abc", 99), (1, 4));
    }

    // Extension point tests

    /// Captures the text of every `Grab` subtree it sees.
    #[derive(Default)]
    struct GrabSink {
        grabbed: Vec<String>,
        abort_after_first: bool,
    }

    impl ElementSink for GrabSink {
        fn open_element(
            &mut self,
            md: &mut MarkdownConverter,
            tag: &str,
            _attrs: &HashMap<String, String>,
        ) {
            if tag == "Grab" {
                md.begin_capture(CaptureMode::Text);
            }
        }

        fn close_element(&mut self, md: &mut MarkdownConverter, tag: &str) {
            if tag == "Grab" {
                self.grabbed.push(md.end_capture());
                if self.abort_after_first {
                    md.abort();
                }
            }
        }
    }

    #[test]
    fn test_sink_captures_subtree() {
        let mut converter = MarkdownConverter::new();
        let mut sink = GrabSink::default();
        converter
            .convert("<Doc><Grab>one</Grab><Grab>two</Grab></Doc>", Some(&mut sink))
            .unwrap();
        assert_eq!(sink.grabbed, vec!["one".to_owned(), "two".to_owned()]);
    }

    #[test]
    fn test_sink_abort_stops_event_delivery() {
        let mut converter = MarkdownConverter::new();
        let mut sink = GrabSink {
            abort_after_first: true,
            ..GrabSink::default()
        };
        converter
            .convert("<Doc><Grab>one</Grab><Grab>two</Grab></Doc>", Some(&mut sink))
            .unwrap();
        assert_eq!(sink.grabbed, vec!["one".to_owned()]);
    }

    #[test]
    fn test_unrecognized_element_children_still_render() {
        // No sink: the element is structurally skipped but its
        // recognized children are not.
        assert_eq!(
            convert_markdown("<Discussion><Para>body</Para></Discussion>"),
            "body"
        );
    }
}
