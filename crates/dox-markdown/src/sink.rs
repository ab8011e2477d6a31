//! Extension point for elements outside the recognized vocabulary.

use std::collections::HashMap;

use crate::MarkdownConverter;

/// Consumer for elements the converter does not itself recognize.
///
/// The converter forwards the open and close of every unrecognized
/// element, handing the sink mutable access to itself so the sink can
/// start and end capture sessions over the subtrees it owns, or call
/// [`MarkdownConverter::abort`] once it has what it needs.
///
/// Opens and closes arrive strictly nested; a sink that cares about
/// ancestry (e.g. "`Name` inside `Parameter`") tracks it itself.
pub trait ElementSink {
    /// An unrecognized element opened.
    fn open_element(
        &mut self,
        md: &mut MarkdownConverter,
        tag: &str,
        attrs: &HashMap<String, String>,
    );

    /// The matching close of a previously forwarded element.
    fn close_element(&mut self, md: &mut MarkdownConverter, tag: &str);
}
