//! Markdown escaping for literal text runs.

/// Characters the downstream renderer treats as Markdown markup.
const SIGNIFICANT: &[char] = &['-', '_', '*', '+', '`', '.', '#'];

/// Escape Markdown-significant characters with a preceding backslash.
///
/// Applied to literal character data so the renderer shows it verbatim.
/// All other characters pass through unchanged.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if SIGNIFICANT.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escapes_all_significant_characters() {
        assert_eq!(escape_markdown("- _ * + ` . #"), r"\- \_ \* \+ \` \. \#");
    }

    #[test]
    fn test_leaves_other_characters_untouched() {
        assert_eq!(escape_markdown("plain text, 100% safe!"), "plain text, 100% safe!");
    }

    #[test]
    fn test_escapes_within_words() {
        assert_eq!(escape_markdown("snake_case.rs"), r"snake\_case\.rs");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(escape_markdown(""), "");
    }
}
