//! Owned markup tree shared by the XML and HTML sides.
//!
//! Both `content.xml` and the edited HTML are loaded into the same
//! [`Node`] shape so the transcoders can walk either with one recursion.
//! Trees are built fresh for each conversion and never mutated afterwards.

use crate::common::error::{Error, Result};
use crate::common::xml::{escape_xml, unescape_xml};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use scraper::{ElementRef, Html};

/// A node of a markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct element children, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }
}

/// Parse an XML document into its root element.
///
/// Entity and character references are resolved, CDATA sections become
/// text, and comments, processing instructions and the doctype are dropped.
pub fn parse_xml(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    // Raw text with references kept escaped until the run ends
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let raw = reader.decoder().decode(&e)?;
                text.push_str(&raw);
            },
            Event::GeneralRef(e) => {
                let name = e.decode()?;
                text.push('&');
                text.push_str(&name);
                text.push(';');
            },
            Event::CData(e) => {
                let raw = reader.decoder().decode(&e)?;
                text.push_str(&escape_xml(&raw));
            },
            Event::Start(e) => {
                flush_text(&mut text, &mut stack);
                stack.push(start_element(&reader, &e)?);
            },
            Event::Empty(e) => {
                flush_text(&mut text, &mut stack);
                let element = start_element(&reader, &e)?;
                close_element(element, &mut stack, &mut root)?;
            },
            Event::End(_) => {
                flush_text(&mut text, &mut stack);
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::ParseError("unexpected closing tag".to_string()))?;
                close_element(element, &mut stack, &mut root)?;
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::ParseError(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::ParseError("document has no root element".to_string()))
}

fn start_element(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Element> {
    let decoder = reader.decoder();
    let name = decoder.decode(e.name().as_ref())?.into_owned();
    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = decoder.decode(attr.key.as_ref())?;
        let value = decoder.decode(&attr.value)?;
        element.attrs.push((key.into_owned(), unescape_xml(&value)));
    }
    Ok(element)
}

fn flush_text(text: &mut String, stack: &mut [Element]) {
    if text.is_empty() {
        return;
    }
    // Text outside the root element is insignificant
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Text(unescape_xml(text)));
    }
    text.clear();
}

fn close_element(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(Error::ParseError(
                "document has more than one root element".to_string(),
            ));
        },
    }
    Ok(())
}

/// An HTML document parsed by html5ever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    /// Serialized `<!DOCTYPE ...>` declaration, if the input had one
    pub doctype: Option<String>,
    pub root: Element,
}

/// Parse HTML the way a browser would.
///
/// Parsing never fails: html5ever repairs the markup, inserting implied
/// elements (`head`, `body`, `tbody`) where needed. Comments are dropped.
pub fn parse_html(html: &str) -> HtmlDocument {
    let document = Html::parse_document(html);
    HtmlDocument {
        doctype: doctype_string(&document),
        root: build_html_element(document.root_element()),
    }
}

/// Parse and serialize HTML again, as a browser's `outerHTML` would.
pub fn reserialize_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = doctype_string(&document).unwrap_or_default();
    out.push_str(&document.root_element().html());
    out
}

fn doctype_string(document: &Html) -> Option<String> {
    let doctype = document
        .tree
        .root()
        .children()
        .find_map(|node| node.value().as_doctype().cloned())?;

    let mut out = String::from("<!DOCTYPE ");
    out.push_str(doctype.name());
    let public_id = doctype.public_id();
    let system_id = doctype.system_id();
    if !public_id.is_empty() {
        out.push_str(" PUBLIC \"");
        out.push_str(public_id);
        out.push('"');
    } else if !system_id.is_empty() {
        out.push_str(" SYSTEM");
    }
    if !system_id.is_empty() {
        out.push_str(" \"");
        out.push_str(system_id);
        out.push('"');
    }
    out.push('>');
    Some(out)
}

fn build_html_element(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let mut out = Element::new(value.name());
    out.attrs = value
        .attrs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            out.children.push(Node::Element(build_html_element(child_element)));
        } else if let Some(text) = child.value().as_text() {
            out.children.push(Node::Text(text.text.to_string()));
        }
    }
    out
}

/// Serialize a node as XML, always writing explicit end tags.
pub fn write_xml(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_xml(text)),
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            write_xml_attrs(&element.attrs, out);
            out.push('>');
            for child in &element.children {
                write_xml(child, out);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        },
    }
}

/// Serialize attributes as ` key="value"` pairs.
pub fn write_xml_attrs(attrs: &[(String, String)], out: &mut String) {
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_xml(value));
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xml_resolves_references() {
        let root = parse_xml(
            "<?xml version=\"1.0\"?>\n<a x=\"1 &amp; 2\"><b>fish &amp; chips&#33;</b><c/><![CDATA[<raw>]]></a>",
        )
        .unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("x"), Some("1 & 2"));
        assert_eq!(root.children.len(), 3);

        let b = root.child_elements().next().unwrap();
        assert_eq!(b.children, vec![Node::Text("fish & chips!".to_string())]);
        assert_eq!(root.children[2], Node::Text("<raw>".to_string()));
    }

    #[test]
    fn test_parse_xml_keeps_whitespace() {
        let root = parse_xml("<a> <b/> </a>").unwrap();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0], Node::Text(" ".to_string()));
    }

    #[test]
    fn test_parse_xml_rejects_malformed() {
        assert!(matches!(parse_xml("<a><b></a>"), Err(Error::ParseError(_))));
        assert!(matches!(parse_xml("<a>"), Err(Error::ParseError(_))));
        assert!(matches!(parse_xml("<a/><b/>"), Err(Error::ParseError(_))));
        assert!(matches!(parse_xml(""), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_write_xml_escapes() {
        let mut element = Element::new("text:p");
        element.attrs.push(("text:style-name".to_string(), "a\"b".to_string()));
        element.children.push(Node::Text("x < y".to_string()));
        element.children.push(Node::Element(Element::new("text:s")));

        let mut out = String::new();
        write_xml(&Node::Element(element), &mut out);
        assert_eq!(
            out,
            "<text:p text:style-name=\"a&quot;b\">x &lt; y<text:s></text:s></text:p>"
        );
    }

    #[test]
    fn test_parse_html_keeps_prefixed_names() {
        let doc = parse_html(
            "<!DOCTYPE html><html xmlns:text=\"urn:text\"><body><text:h class=\"H\">Title</text:h></body></html>",
        );
        assert_eq!(doc.doctype.as_deref(), Some("<!DOCTYPE html>"));
        assert_eq!(doc.root.name, "html");
        assert_eq!(doc.root.attr("xmlns:text"), Some("urn:text"));

        let body = doc.root.child_elements().find(|e| e.name == "body").unwrap();
        let heading = body.child_elements().next().unwrap();
        assert_eq!(heading.name, "text:h");
        assert_eq!(heading.attr("class"), Some("H"));
        assert_eq!(heading.children, vec![Node::Text("Title".to_string())]);
    }

    #[test]
    fn test_reserialize_inserts_implied_elements() {
        let out = reserialize_html("<!DOCTYPE html><p>a&nbsp;b</p>");
        assert_eq!(
            out,
            "<!DOCTYPE html><html><head></head><body><p>a&nbsp;b</p></body></html>"
        );
        assert_eq!(reserialize_html("<p>x</p>"), "<html><head></head><body><p>x</p></body></html>");
    }
}
