//! Streaming XML-to-Markdown conversion for documentation comments.
//!
//! This crate converts the XML representation of a source-code
//! documentation comment (as emitted by a compiler's AST-introspection
//! tool) into Markdown. The converter is a push-parser event consumer:
//! it streams `quick-xml` events and reconstructs the hierarchical
//! output grammar (paragraphs, fenced code blocks, nested lists,
//! headings synthesized from raw HTML) with an explicit stack of
//! deferred close actions.
//!
//! # Example
//!
//! ```
//! use dox_markdown::{CaptureMode, MarkdownConverter};
//!
//! let mut converter = MarkdownConverter::new();
//! converter.begin_capture(CaptureMode::Markdown);
//! converter.convert("<Para>Hello <strong>world</strong></Para>", None).unwrap();
//! assert_eq!(converter.end_capture(), "Hello **world**");
//! ```
//!
//! Elements outside the recognized vocabulary are forwarded to an
//! [`ElementSink`], which may start its own capture sessions over the
//! subtrees it cares about. That extension point is how schema-aware
//! consumers (e.g. declaration extraction) attach without the engine
//! knowing their schema.

mod converter;
mod error;
mod escape;
mod html;
mod sink;
mod state;

pub use converter::MarkdownConverter;
pub use error::{ConvertError, Diagnostic};
pub use escape::escape_markdown;
pub use sink::ElementSink;
pub use state::CaptureMode;
