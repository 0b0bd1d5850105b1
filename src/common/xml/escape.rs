use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

// Use LeftmostLongest to ensure longer entities are matched first (e.g., &amp; instead of &lt;)
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("Failed to build XML unescaper")
});

// Same replacements the html5ever serializer performs, so that text we
// write is left untouched when re-serialized.
static HTML_TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "\u{00A0}", "<", ">"])
        .expect("Failed to build HTML text escaper")
});

static HTML_ATTR_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "\u{00A0}", "\""])
        .expect("Failed to build HTML attribute escaper")
});

/// Escape XML special characters.
///
/// # Examples
///
/// ```
/// use odthtml::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"it's\"</tag>"), "&lt;tag&gt;&quot;it&apos;s&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Unescape XML character data.
///
/// Replaces the five predefined entities and numeric character references
/// (`&#38;`, `&#x26;`). Unknown or malformed references are left unchanged.
///
/// # Examples
///
/// ```
/// use odthtml::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&quot;hello&apos;"), "\"hello'");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;"); // &amp; is matched first
/// assert_eq!(unescape_xml("&#65;&#x42;"), "AB");
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;"); // unknown entity
/// assert_eq!(unescape_xml("&amp"), "&amp"); // incomplete, no semicolon
/// ```
pub fn unescape_xml(s: &str) -> String {
    if !s.contains("&#") {
        return XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"]);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("&#") {
        out.push_str(&XML_UNESCAPER.replace_all(&rest[..pos], &["&", "<", ">", "\"", "'"]));
        let candidate = &rest[pos..];
        match decode_char_ref(candidate) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &candidate[consumed..];
            },
            None => {
                out.push_str("&#");
                rest = &candidate[2..];
            },
        }
    }
    out.push_str(&XML_UNESCAPER.replace_all(rest, &["&", "<", ">", "\"", "'"]));
    out
}

/// Decode a `&#NNN;` or `&#xHHH;` reference at the start of `s`.
fn decode_char_ref(s: &str) -> Option<(char, usize)> {
    let end = s.find(';')?;
    let body = &s[2..end];
    let code = match body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse::<u32>().ok()?,
    };
    Some((char::from_u32(code)?, end + 1))
}

/// Escape HTML text content.
///
/// # Examples
///
/// ```
/// use odthtml::common::xml::escape_html_text;
/// assert_eq!(escape_html_text("a < b & \"c\"\u{A0}"), "a &lt; b &amp; \"c\"&nbsp;");
/// ```
#[inline]
pub fn escape_html_text(s: &str) -> String {
    HTML_TEXT_ESCAPER.replace_all(s, &["&amp;", "&nbsp;", "&lt;", "&gt;"])
}

/// Escape an HTML attribute value for use inside double quotes.
///
/// # Examples
///
/// ```
/// use odthtml::common::xml::escape_html_attr;
/// assert_eq!(escape_html_attr(" a=\"<b>\""), " a=&quot;<b>&quot;");
/// ```
#[inline]
pub fn escape_html_attr(s: &str) -> String {
    HTML_ATTR_ESCAPER.replace_all(s, &["&amp;", "&nbsp;", "&quot;"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        let raw = "x < y && y > 'z' \"q\"";
        assert_eq!(unescape_xml(&escape_xml(raw)), raw);
    }

    #[test]
    fn test_unescape_bad_char_ref() {
        assert_eq!(unescape_xml("&#zz; &amp;"), "&#zz; &");
        assert_eq!(unescape_xml("&#xD800;"), "&#xD800;");
        assert_eq!(unescape_xml("tail &#"), "tail &#");
    }

    #[test]
    fn test_html_escapes_leave_other_quotes() {
        assert_eq!(escape_html_text("it's"), "it's");
        assert_eq!(escape_html_attr("it's"), "it's");
        assert_eq!(escape_html_attr("<&>"), "<&amp;>");
    }
}
