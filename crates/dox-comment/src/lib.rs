//! Declaration extraction from documentation-comment XML.
//!
//! Built entirely on `dox-markdown`'s unrecognized-element extension
//! point: the consumers here understand the outer documentation-comment
//! schema (`Name`, `USR`, `Declaration`, `Parameter`, `Discussion`,
//! `ResultDiscussion`) and delegate all prose formatting to the
//! conversion engine.
//!
//! Two consumers are provided:
//!
//! - [`DeclarationBuilder`] walks the full schema and produces a
//!   [`Declaration`] record.
//! - [`DeclarationExtractor`] is the optimized path when only the raw
//!   signature text is needed; it aborts the parse as soon as the
//!   `Declaration` subtree closes.

mod builder;
mod extractor;
mod types;

pub use builder::DeclarationBuilder;
pub use extractor::DeclarationExtractor;
pub use types::{Declaration, Parameter};

use dox_markdown::MarkdownConverter;

/// Parse a full documentation-comment document into a [`Declaration`].
///
/// Malformed input degrades to a partial record; absent subtrees leave
/// their fields at the default value.
#[must_use]
pub fn parse_declaration(xml: &str) -> Declaration {
    let mut converter = MarkdownConverter::new();
    let mut builder = DeclarationBuilder::new();
    // Degrade-and-report mode never returns an error.
    let _ = converter.convert(xml, Some(&mut builder));
    builder.finish()
}

/// Extract only the raw signature text from a documentation-comment
/// document, stopping the parse as soon as it is found.
#[must_use]
pub fn extract_declaration(xml: &str) -> Option<String> {
    let mut converter = MarkdownConverter::new();
    let mut extractor = DeclarationExtractor::new();
    let _ = converter.convert(xml, Some(&mut extractor));
    extractor.finish()
}
