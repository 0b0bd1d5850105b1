//! Canonical form of a markup string.
//!
//! Two serializations of the same tree can differ in attribute order,
//! whitespace between attributes, empty-element syntax and the table
//! wrappers (`tbody`, `colgroup`) that HTML parsers insert. [`normalize`]
//! removes those differences so the round-trip checks can compare strings.
//!
//! The scanner understands quoted attribute values, so a `>` inside a value
//! does not end the tag. Anything that does not scan as a tag, comment,
//! declaration or processing instruction is treated as text.

use memchr::memchr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Tag(Tag<'a>),
    /// Comments, CDATA sections, declarations, processing instructions
    Other(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tag<'a> {
    close: bool,
    name: &'a str,
    attrs: Vec<Attr<'a>>,
    self_closing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Attr<'a> {
    name: &'a str,
    /// Value as written, quotes included
    value: Option<&'a str>,
}

/// Bring markup into canonical form.
///
/// Empty element pairs become self-closing tags, attributes are sorted and
/// separated by single spaces, and `tbody`/`colgroup` tags are dropped.
/// Text, comments and declarations are kept verbatim. The result is a
/// fixed point: normalizing it again returns it unchanged.
///
/// # Examples
///
/// ```
/// use odthtml::convert::normalize;
///
/// assert_eq!(
///     normalize("<td  b=\"2\" a=\"1\"></td>"),
///     "<td a=\"1\" b=\"2\"/>"
/// );
/// assert_eq!(normalize("<table><tbody><tr/></tbody></table>"), "<table><tr/></table>");
/// ```
pub fn normalize(markup: &str) -> String {
    let tokens: Vec<Token<'_>> = tokenize(markup)
        .into_iter()
        .filter(|token| !matches!(token, Token::Tag(tag) if is_parser_inserted(tag.name)))
        .collect();

    let mut out = String::with_capacity(markup.len());
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Text(text) | Token::Other(text) => out.push_str(text),
            Token::Tag(tag) => {
                if !tag.close && !tag.self_closing {
                    if let Some(Token::Tag(next)) = tokens.get(i + 1) {
                        if next.close && next.name == tag.name {
                            render_tag(&mut out, tag, true);
                            i += 2;
                            continue;
                        }
                    }
                }
                render_tag(&mut out, tag, tag.self_closing);
            },
        }
        i += 1;
    }
    out
}

fn is_parser_inserted(name: &str) -> bool {
    name == "tbody" || name == "colgroup"
}

fn render_tag(out: &mut String, tag: &Tag<'_>, self_closing: bool) {
    out.push('<');
    if tag.close {
        out.push('/');
        out.push_str(tag.name);
        out.push('>');
        return;
    }
    out.push_str(tag.name);

    let mut attrs = tag.attrs.clone();
    attrs.sort();
    for attr in &attrs {
        out.push(' ');
        out.push_str(attr.name);
        if let Some(value) = attr.value {
            out.push('=');
            out.push_str(value);
        }
    }

    // Keep a trailing `/` of the last attribute from reading as `/>`
    if let Some(last) = attrs.last() {
        let ends_with_slash = last.value.unwrap_or(last.name).ends_with('/');
        let unquoted = last
            .value
            .is_some_and(|value| !value.starts_with(['"', '\'']));
        if ends_with_slash || (self_closing && unquoted) {
            out.push(' ');
        }
    }
    out.push_str(if self_closing { "/>" } else { ">" });
}

fn tokenize(s: &str) -> Vec<Token<'_>> {
    let bytes = s.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(offset) = memchr(b'<', &bytes[pos..]) {
        let lt = pos + offset;
        match scan_markup(s, lt) {
            Some((token, end)) => {
                if text_start < lt {
                    tokens.push(Token::Text(&s[text_start..lt]));
                }
                tokens.push(token);
                pos = end;
                text_start = end;
            },
            None => pos = lt + 1,
        }
    }
    if text_start < s.len() {
        tokens.push(Token::Text(&s[text_start..]));
    }
    tokens
}

fn scan_markup(s: &str, at: usize) -> Option<(Token<'_>, usize)> {
    let rest = &s[at..];
    let end = if rest.starts_with("<!--") {
        rest[4..].find("-->")? + 7
    } else if rest.starts_with("<![CDATA[") {
        rest[9..].find("]]>")? + 12
    } else if rest.starts_with("<!") || rest.starts_with("<?") {
        rest[2..].find('>')? + 3
    } else {
        return scan_tag(s, at);
    };
    Some((Token::Other(&rest[..end]), at + end))
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b':' | b'-' | b'_' | b'.')
}

fn scan_tag(s: &str, at: usize) -> Option<(Token<'_>, usize)> {
    let b = s.as_bytes();
    let mut i = at + 1;
    let close = b.get(i) == Some(&b'/');
    if close {
        i += 1;
    }

    let name_start = i;
    if !b.get(i).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    while b.get(i).copied().is_some_and(is_name_char) {
        i += 1;
    }
    let name = &s[name_start..i];

    let mut attrs = Vec::new();
    loop {
        while b.get(i).copied().is_some_and(is_space) {
            i += 1;
        }
        let self_closing = match *b.get(i)? {
            b'>' => false,
            b'/' if b.get(i + 1) == Some(&b'>') => true,
            _ => {
                let (attr, next) = scan_attr(s, i)?;
                attrs.push(attr);
                i = next;
                continue;
            },
        };
        let end = if self_closing { i + 2 } else { i + 1 };
        let tag = Tag {
            close,
            name,
            attrs,
            self_closing,
        };
        return Some((Token::Tag(tag), end));
    }
}

fn scan_attr(s: &str, start: usize) -> Option<(Attr<'_>, usize)> {
    let b = s.as_bytes();
    // The first character always belongs to the name, even if it is `=`
    let mut i = start + s[start..].chars().next().map_or(1, char::len_utf8);
    while let Some(&c) = b.get(i) {
        if is_space(c) || c == b'=' || c == b'>' || (c == b'/' && b.get(i + 1) == Some(&b'>')) {
            break;
        }
        i += 1;
    }
    let name = &s[start..i];

    let mut j = i;
    while b.get(j).copied().is_some_and(is_space) {
        j += 1;
    }
    if b.get(j) != Some(&b'=') {
        return Some((Attr { name, value: None }, i));
    }
    j += 1;
    while b.get(j).copied().is_some_and(is_space) {
        j += 1;
    }

    match b.get(j) {
        Some(&quote @ (b'"' | b'\'')) => {
            let close = j + 1 + memchr(quote, &b[j + 1..])?;
            let value = Some(&s[j..=close]);
            Some((Attr { name, value }, close + 1))
        },
        _ => {
            let value_start = j;
            while let Some(&c) = b.get(j) {
                if is_space(c) || c == b'>' {
                    break;
                }
                j += 1;
            }
            let value = (j > value_start).then(|| &s[value_start..j]);
            Some((Attr { name, value }, j))
        },
    }
}
