//! Raw-HTML sniffing for CDATA fragments.
//!
//! The upstream introspection tool passes a small, fixed set of HTML
//! fragments through as CDATA: `<img>` tags, `<hr/>`, and `<hN>`
//! heading tags. These are targeted pattern matches over that known
//! vocabulary, not a general HTML parser.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern for `<img>` tags. The emitter always puts `src` first; the
/// optional `title` and `alt` attributes appear in either order.
static IMG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^<img src="([^"]*)"(?: title="(?<title>[^"]*)"| alt="(?<alt>[^"]*)"){0,2}\s*/>$"#,
    )
    .expect("invalid img regex")
});

/// Pattern for heading open/close tags (`<h2>`, `</h3>`, ...).
static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(/?)h([1-6])>$").expect("invalid heading regex"));

/// A recognized heading tag inside a raw-HTML fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HeadingTag {
    /// `<hN>` with its level.
    Open(usize),
    /// `</hN>`.
    Close,
}

/// Translate an `<img .../>` fragment into a Markdown image.
///
/// Returns `None` if the fragment is not a recognized image tag.
/// Absent `alt`/`title` attributes simply drop their output segment:
/// `<img src="U"/>` becomes `![](U)`.
pub(crate) fn sniff_img(content: &str) -> Option<String> {
    let caps = IMG_PATTERN.captures(content)?;
    let src = &caps[1];
    let alt = caps.name("alt").map_or("", |m| m.as_str());

    let mut md = format!("![{alt}]({src}");
    if let Some(title) = caps.name("title") {
        write!(md, " \"{}\"", title.as_str()).unwrap();
    }
    md.push(')');
    Some(md)
}

/// Whether the fragment is exactly a horizontal rule tag.
pub(crate) fn is_hr(content: &str) -> bool {
    content == "<hr/>"
}

/// Recognize a heading open/close tag.
pub(crate) fn sniff_heading(content: &str) -> Option<HeadingTag> {
    let caps = HEADING_PATTERN.captures(content)?;
    if caps[1].is_empty() {
        let level = caps[2].parse().expect("regex guarantees a digit");
        Some(HeadingTag::Open(level))
    } else {
        Some(HeadingTag::Close)
    }
}
