//! Edited HTML → ODT `content.xml`.
//!
//! Reverses [`super::to_html`]: mapped elements get their ODT names back,
//! fused elements are split into the original pair, comment-wrapped style
//! markup is restored from `<style>` blocks and everything the HTML parser
//! added (`head`, `tbody`, `colgroup`) is unwrapped.

use super::mapping::{
    DEFAULT_ROOT_ATTRIBUTES, MappingKind, attribute_to_odt, element_to_odt,
};
use super::to_html::{AFTER_ATTR, BASELINE_ATTR, BEFORE_ATTR, CHILD_ATTRS_ATTR};
use crate::common::dom::{Element, Node, parse_html};
use crate::common::xml::{escape_xml, unescape_xml};
use memchr::memmem;

/// XML declaration written at the start of `content.xml`.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Convert an HTML document into `content.xml` markup.
///
/// Elements are always written with explicit end tags; empty pairs are
/// equivalent to self-closing tags once normalized.
///
/// # Examples
///
/// ```
/// use odthtml::convert::to_odt::to_odt;
///
/// let xml = to_odt("<p class=\"P1\">fish &amp; chips</p>");
/// assert!(xml.ends_with(
///     "<text:p text:style-name=\"P1\">fish &amp; chips</text:p></office:text></office:body></office:document-content>"
/// ));
/// ```
pub fn to_odt(html: &str) -> String {
    let document = parse_html(html);
    let mut out = String::with_capacity(html.len() + XML_DECLARATION.len());
    out.push_str(XML_DECLARATION);
    element(&document.root, &mut out);
    out
}

fn node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Element(child) => element(child, out),
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => out.push_str(&escape_xml(text)),
    }
}

fn contents(element: &Element) -> String {
    let raw_text = element.name == "script";
    let mut out = String::new();
    for child in &element.children {
        node(child, raw_text, &mut out);
    }
    out
}

fn element(element: &Element, out: &mut String) {
    let name = element.name.as_str();
    let mut attrs: Vec<(&str, &str)> = element
        .attrs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    let body = match name {
        "html" => {
            for (key, value) in DEFAULT_ROOT_ATTRIBUTES {
                if !attrs.iter().any(|(k, _)| k == key) {
                    attrs.push((*key, *value));
                }
            }
            contents(element)
        },
        "style" => {
            if element.attr(BASELINE_ATTR).is_some() {
                return;
            }
            style_payloads(element)
        },
        "span" => {
            let body = contents(element);
            if element.attr("style") == Some("white-space:pre") && body == "\t" {
                out.push_str("<text:tab></text:tab>");
                return;
            }
            body
        },
        "img" => {
            attrs.retain(|(key, _)| *key != "src");
            contents(element)
        },
        "object" => {
            attrs.retain(|(key, _)| *key != "data");
            contents(element)
        },
        _ => contents(element),
    };

    let data_type = take_attr(&mut attrs, "data-type");
    let Some(mapping) = element_to_odt(name, data_type) else {
        if name.contains(':') {
            write_element(out, name, &attrs, &body);
        } else {
            // Parser-inserted or foreign HTML element
            out.push_str(&body);
        }
        return;
    };

    match mapping.kind {
        MappingKind::Collapsed { parent, child } => {
            let child_attrs = take_attr(&mut attrs, CHILD_ATTRS_ATTR).unwrap_or_default();
            let before = take_attr(&mut attrs, BEFORE_ATTR).unwrap_or_default();
            let after = take_attr(&mut attrs, AFTER_ATTR).unwrap_or_default();

            let mut inner = String::with_capacity(body.len() + 64);
            inner.push_str(before);
            inner.push('<');
            inner.push_str(child);
            inner.push_str(child_attrs);
            inner.push('>');
            inner.push_str(&body);
            inner.push_str("</");
            inner.push_str(child);
            inner.push('>');
            inner.push_str(after);
            write_element(out, parent, &attrs, &inner);
        },
        MappingKind::Simple | MappingKind::Typed { .. } => {
            write_element(out, mapping.odt, &attrs, &body);
        },
    }
}

fn take_attr<'a>(attrs: &mut Vec<(&'a str, &'a str)>, name: &str) -> Option<&'a str> {
    let index = attrs.iter().position(|(key, _)| *key == name)?;
    Some(attrs.remove(index).1)
}

fn write_element(out: &mut String, odt_name: &str, attrs: &[(&str, &str)], body: &str) {
    out.push('<');
    out.push_str(odt_name);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(attribute_to_odt(key, odt_name));
        out.push_str("=\"");
        out.push_str(&escape_xml(value));
        out.push('"');
    }
    out.push('>');
    out.push_str(body);
    out.push_str("</");
    out.push_str(odt_name);
    out.push('>');
}

/// ODT markup stored in the `/* ... */` comments of a stylesheet.
///
/// The CSS between the comments is derived data and is dropped.
fn style_payloads(element: &Element) -> String {
    let css: String = element
        .children
        .iter()
        .filter_map(|node| match node {
            Node::Text(text) => Some(text.as_str()),
            Node::Element(_) => None,
        })
        .collect();

    let mut out = String::with_capacity(css.len() / 2);
    let bytes = css.as_bytes();
    let mut pos = 0;
    while let Some(open) = memmem::find(&bytes[pos..], b"/*") {
        let start = pos + open + 2;
        let Some(close) = memmem::find(&bytes[start..], b"*/") else {
            break;
        };
        let payload = &css[start..start + close];
        if payload.starts_with("&lt;") && payload.ends_with("&gt;") {
            out.push_str(&unescape_xml(payload));
        } else {
            out.push_str(payload);
        }
        pos = start + close + 2;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_xml(html_body: &str) -> String {
        let xml = to_odt(&format!("<!DOCTYPE html><html><head></head><body>{html_body}</body></html>"));
        let start = xml.find("<office:text>").unwrap() + "<office:text>".len();
        let end = xml.rfind("</office:text>").unwrap();
        xml[start..end].to_string()
    }

    #[test]
    fn test_root_gets_default_namespaces() {
        let xml = to_odt("<!DOCTYPE html><html office:version=\"1.3\"><head></head><body></body></html>");
        assert!(xml.starts_with(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<office:document-content office:version=\"1.3\" xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\""
        ));
        assert!(xml.contains(" xmlns:xlink=\"http://www.w3.org/1999/xlink\">"));
        assert!(!xml.contains("office:version=\"1.2\""));
        assert!(xml.ends_with("<office:body><office:text></office:text></office:body></office:document-content>"));
    }

    #[test]
    fn test_collapsed_body_is_split() {
        let xml = to_odt(concat!(
            "<html><body data-odt-child=\" text:use-soft-page-breaks=&quot;true&quot;\" ",
            "data-odt-before=\"<office:forms></office:forms>\"><p>x</p></body></html>"
        ));
        assert!(xml.contains(concat!(
            "<office:body><office:forms></office:forms>",
            "<office:text text:use-soft-page-breaks=\"true\"><text:p>x</text:p></office:text>",
            "</office:body>"
        )));
    }

    #[test]
    fn test_image_frame_is_split() {
        assert_eq!(
            body_xml(
                "<p><img draw:name=\"f\" data-odt-child=\" xlink:href=&quot;Pictures/1.svm&quot;\" src=\"data:image/svg+xml;base64,AA\"></p>"
            ),
            "<text:p><draw:frame draw:name=\"f\"><draw:image xlink:href=\"Pictures/1.svm\"></draw:image></draw:frame></text:p>"
        );
    }

    #[test]
    fn test_tab_span_and_prefixed_names() {
        assert_eq!(
            body_xml("<p>a<span style=\"white-space:pre\">\t</span>b<text:s text:c=\"2\"></text:s></p>"),
            "<text:p>a<text:tab></text:tab>b<text:s text:c=\"2\"></text:s></text:p>"
        );
        assert_eq!(
            body_xml("<p><span style=\"white-space:pre\">\t\t</span></p>"),
            "<text:p><text:span style=\"white-space:pre\">\t\t</text:span></text:p>"
        );
    }

    #[test]
    fn test_tables_unwrap_parser_elements() {
        assert_eq!(
            body_xml(
                "<table class=\"T\"><col span=\"2\"><tr><td class=\"C\" colspan=\"2\"></td><td data-type=\"covered\"></td></tr></table>"
            ),
            concat!(
                "<table:table table:style-name=\"T\">",
                "<table:table-column table:number-columns-repeated=\"2\"></table:table-column>",
                "<table:table-row><table:table-cell table:style-name=\"C\" table:number-columns-spanned=\"2\"></table:table-cell>",
                "<table:covered-table-cell></table:covered-table-cell></table:table-row></table:table>"
            )
        );
    }

    #[test]
    fn test_style_payloads_are_restored() {
        let xml = to_odt(concat!(
            "<html><head><style data-odt-baseline=\"\">p { margin: 0; }</style>",
            "<style>/*<style:style style:name=\"P1\">*/\n[class=\"P1\"] {\n",
            "/*<style:text-properties fo:font-weight=\"bold\">*/\nfont-weight: bold;\n\n/*</style:text-properties>*/",
            "\n}\n/*</style:style>*/</style>",
            "<style data-type=\"fonts\">/*&lt;style:font-face style:name=&quot;A&quot;&gt;*/\n\n/*</style:font-face>*/</style>",
            "</head><body></body></html>"
        ));
        assert!(!xml.contains("margin"));
        assert!(xml.contains(concat!(
            "<office:automatic-styles><style:style style:name=\"P1\">",
            "<style:text-properties fo:font-weight=\"bold\"></style:text-properties>",
            "</style:style></office:automatic-styles>",
            "<office:font-face-decls><style:font-face style:name=\"A\"></style:font-face></office:font-face-decls>"
        )));
    }

    #[test]
    fn test_scripts_are_verbatim_and_text_escaped() {
        let xml = to_odt(concat!(
            "<html><head><script><office:script script:language=\"ooo:Basic\">a &amp; b</office:script></script></head>",
            "<body><p>it's &lt;x&gt;</p><object href=\"./Object 1\" data=\"about:blank\"></object></body></html>"
        ));
        assert!(xml.contains(
            "<office:scripts><office:script script:language=\"ooo:Basic\">a &amp; b</office:script></office:scripts>"
        ));
        assert!(xml.contains("<text:p>it&apos;s &lt;x&gt;</text:p>"));
        assert!(xml.contains("<draw:object xlink:href=\"./Object 1\"></draw:object>"));
    }

    #[test]
    fn test_kept_names_pass_through() {
        assert_eq!(
            body_xml("<p>a<text:note><text:note-body><text:p class=\"F\">n</text:p></text:note-body></text:note></p>"),
            "<text:p>a<text:note><text:note-body><text:p text:style-name=\"F\">n</text:p></text:note-body></text:note></text:p>"
        );
    }
}
