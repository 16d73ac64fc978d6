//! HTML helpers for Telegram payloads (restricted to the `<b>`/`<a>` subset).

use regex::Regex;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Reverse the entity escaping that feed sources apply to titles and bodies.
///
/// `&amp;` goes last so a single level of escaping is undone, not two.
pub fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Clean up feed text before composing: trim, turn `<br>` markup into real
/// newlines, then reverse source-side entity escaping.
pub fn clean_item_text(text: &str) -> String {
    let br = Regex::new(r"(?i)<br\s*/?>").expect("valid regex");
    let normalized = br.replace_all(text.trim(), "\n");
    unescape_entities(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn unescape_undoes_exactly_one_level() {
        assert_eq!(unescape_entities("Tom &amp; Jerry"), "Tom & Jerry");
        // Double-escaped input must come back single-escaped, not raw.
        assert_eq!(unescape_entities("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
    }

    #[test]
    fn converts_line_break_markup() {
        assert_eq!(clean_item_text("a<br>b<BR/>c<br />d"), "a\nb\nc\nd");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(clean_item_text("  hello &quot;world&quot;\n"), "hello \"world\"");
    }
}
