//! ODT document tree → editable HTML.
//!
//! The output is shaped so that html5ever parses and re-serializes it
//! without changes, which is what lets the round-trip checks compare the
//! two strings. Everything HTML has no element for is kept in a form the
//! reverse pass can restore: unknown ODT elements keep their prefixed names,
//! style definitions live as comment-wrapped ODT markup inside `<style>`,
//! and collapsed pairs carry their child and siblings in `data-odt-*`
//! attributes.

use super::mapping::{
    ElementMapping, attribute_to_html, collapsed_child, element_to_html, is_void, style_to_css,
};
use crate::common::dom::{Element, Node, write_xml, write_xml_attrs};
use crate::common::xml::{escape_html_attr, escape_html_text, escape_xml};
use log::warn;
use std::borrow::Cow;

/// Attribute marking the injected stylesheet, dropped again on the way back.
pub const BASELINE_ATTR: &str = "data-odt-baseline";

/// Serialized ODT attributes of the fused child of a collapsed pair.
pub const CHILD_ATTRS_ATTR: &str = "data-odt-child";
/// Serialized ODT siblings preceding the fused child.
pub const BEFORE_ATTR: &str = "data-odt-before";
/// Serialized ODT siblings following the fused child.
pub const AFTER_ATTR: &str = "data-odt-after";

/// Placeholder for the `data` attribute HTML requires on `<object>`.
pub const OBJECT_DATA: &str = "about:blank";

/// Markup standing in for `text:tab`.
pub const TAB_HTML: &str = "<span style=\"white-space:pre\">\t</span>";

/// Stylesheet giving the HTML a rendering close to the document's.
pub const BASELINE_CSS: &str = r#"
p {
	margin: 0;
	min-height: 1em;
}
table {
	border-collapse: collapse;
}
office\:annotation {
	display: none;
}
text\:note-citation, text\:note-body {
	vertical-align: super;
	font-size: .83em;
}
text\:note-body:before {
	content: "\A0(";
}
text\:note-body:after {
	content: ")";
}
text\:tracked-changes {
	display: none;
}
td[data-type="covered"] {
	display: none;
}
"#;

const PROPERTY_ELEMENTS: &[&str] = &[
    "style:paragraph-properties",
    "style:text-properties",
    "style:table-properties",
    "style:table-column-properties",
    "style:table-cell-properties",
    "style:graphic-properties",
];

const COMMENTED_PREFIXES: &[&str] = &["style:", "svg:font-face-", "text:list-level-style-"];

/// Source of `src` values for images stored in the archive.
pub trait ImageResolver {
    /// Displayable URL for the archive entry at `path`, `None` when the
    /// entry does not exist.
    fn resolve_image(&self, path: &str) -> Option<String>;
}

/// ODT names kept instead of their HTML equivalents inside a subtree.
///
/// Notes and annotations are nested inside paragraphs, where an HTML parser
/// would end the outer `<p>` at the first inner one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Renames {
    pub keep_paragraphs: bool,
    pub keep_lists: bool,
}

impl Renames {
    fn for_element(self, name: &str) -> Self {
        match name {
            "text:note-body" => Self {
                keep_paragraphs: true,
                ..self
            },
            "office:annotation" | "draw:text-box" => Self {
                keep_paragraphs: true,
                keep_lists: true,
            },
            _ => self,
        }
    }

    fn html_name(self, mapping: &ElementMapping) -> &'static str {
        match mapping.odt {
            "text:p" if self.keep_paragraphs => mapping.odt,
            "text:list" | "text:list-item" if self.keep_lists => mapping.odt,
            _ => mapping.html,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Html,
    /// Inside `<style>`: everything is comment-wrapped ODT markup
    Style,
}

/// Convert a parsed `content.xml` into an HTML document.
///
/// # Examples
///
/// ```
/// use odthtml::common::dom::parse_xml;
/// use odthtml::convert::to_html::{ImageResolver, to_html};
///
/// struct NoImages;
/// impl ImageResolver for NoImages {
///     fn resolve_image(&self, _path: &str) -> Option<String> {
///         None
///     }
/// }
///
/// let root = parse_xml(
///     "<office:document-content><office:body><office:text><text:p>Hi</text:p></office:text></office:body></office:document-content>",
/// )?;
/// let html = to_html(&root, &NoImages);
/// assert!(html.starts_with("<!DOCTYPE html><html><head><style data-odt-baseline=\"\">"));
/// assert!(html.ends_with("</style></head><body><p>Hi</p></body></html>"));
/// # Ok::<(), odthtml::Error>(())
/// ```
pub fn to_html(root: &Element, images: &dyn ImageResolver) -> String {
    let mut writer = HtmlWriter {
        images,
        out: String::with_capacity(4096),
    };
    writer.out.push_str("<!DOCTYPE html>");
    writer.element(root, Renames::default(), Context::Html);
    writer.out
}

struct HtmlWriter<'r> {
    images: &'r dyn ImageResolver,
    out: String,
}

impl HtmlWriter<'_> {
    fn node(&mut self, node: &Node, renames: Renames, context: Context) {
        match node {
            Node::Element(element) => self.element(element, renames, context),
            Node::Text(text) => {
                let text = strip_invalid_chars(text);
                match context {
                    Context::Html => self.out.push_str(&escape_html_text(&text)),
                    Context::Style => {
                        self.out.push_str("/*");
                        self.out.push_str(&escape_xml(&text));
                        self.out.push_str("*/");
                    },
                }
            },
        }
    }

    fn children(&mut self, children: &[Node], renames: Renames, context: Context) {
        for child in children {
            self.node(child, renames, context);
        }
    }

    fn element(&mut self, element: &Element, renames: Renames, context: Context) {
        if context == Context::Html {
            if let Some((index, child, mapping)) = find_collapsed(element) {
                self.collapsed(element, index, child, mapping, renames);
                return;
            }
        }

        let name = element.name.as_str();
        let inner = renames.for_element(name);
        match name {
            "text:tab" if context == Context::Html => {
                self.out.push_str(TAB_HTML);
                return;
            },
            "style:style" | "text:list-style" => {
                let class = element.attr("style:name").unwrap_or_default();
                self.commented(element, |w| {
                    w.out.push_str("[class=\"");
                    w.out.push_str(class);
                    w.out.push_str("\"] {\n");
                    w.children(&element.children, inner, Context::Style);
                    w.out.push_str("\n}");
                });
                return;
            },
            _ if PROPERTY_ELEMENTS.contains(&name) => {
                self.commented(element, |w| {
                    for (key, value) in &element.attrs {
                        w.out.push_str(&style_to_css(key, value));
                        w.out.push('\n');
                    }
                    w.children(&element.children, inner, Context::Style);
                });
                return;
            },
            _ => {},
        }

        if context == Context::Style || COMMENTED_PREFIXES.iter().any(|p| name.starts_with(p)) {
            self.commented(element, |w| w.children(&element.children, inner, context));
            return;
        }

        self.simple(element, renames, inner);
    }

    fn simple(&mut self, element: &Element, renames: Renames, inner: Renames) {
        let mapping = element_to_html(&element.name);
        let html_name = mapping.map_or(element.name.as_str(), |m| renames.html_name(m));

        self.out.push('<');
        self.out.push_str(html_name);
        if let Some(data_type) = mapping.and_then(ElementMapping::data_type) {
            self.push_attr("data-type", data_type);
        }
        for (key, value) in &element.attrs {
            self.push_attr(attribute_to_html(key), value);
        }
        if element.name == "draw:object" {
            self.push_attr("data", OBJECT_DATA);
        }
        self.out.push('>');

        if html_name == "html" {
            self.out.push_str("<head><style ");
            self.out.push_str(BASELINE_ATTR);
            self.out.push_str("=\"\">");
            self.out.push_str(BASELINE_CSS);
            self.out.push_str("</style>");
            let mut head_open = true;
            for child in &element.children {
                if head_open && renders_as_body(child) {
                    self.out.push_str("</head>");
                    head_open = false;
                }
                self.node(child, inner, Context::Html);
            }
            if head_open {
                self.out.push_str("</head>");
            }
        } else if is_void(html_name) {
            return;
        } else if html_name == "script" {
            for child in &element.children {
                write_xml(child, &mut self.out);
            }
        } else if html_name == "style" {
            self.children(&element.children, inner, Context::Style);
        } else {
            self.children(&element.children, inner, Context::Html);
        }

        self.out.push_str("</");
        self.out.push_str(html_name);
        self.out.push('>');
    }

    fn collapsed(
        &mut self,
        parent: &Element,
        index: usize,
        child: &Element,
        mapping: &ElementMapping,
        renames: Renames,
    ) {
        self.out.push('<');
        self.out.push_str(mapping.html);
        for (key, value) in &parent.attrs {
            self.push_attr(attribute_to_html(key), value);
        }

        let mut odt = String::new();
        write_xml_attrs(&child.attrs, &mut odt);
        self.push_attr_nonempty(CHILD_ATTRS_ATTR, &odt);

        odt.clear();
        for node in &parent.children[..index] {
            write_xml(node, &mut odt);
        }
        self.push_attr_nonempty(BEFORE_ATTR, &odt);

        odt.clear();
        for node in &parent.children[index + 1..] {
            write_xml(node, &mut odt);
        }
        self.push_attr_nonempty(AFTER_ATTR, &odt);

        if child.name == "draw:image" {
            if let Some(src) = child.attr("xlink:href").and_then(|href| self.image_src(href)) {
                self.push_attr("src", &src);
            }
        }
        self.out.push('>');

        if is_void(mapping.html) {
            return;
        }
        let inner = renames.for_element(&parent.name).for_element(&child.name);
        self.children(&child.children, inner, Context::Html);
        self.out.push_str("</");
        self.out.push_str(mapping.html);
        self.out.push('>');
    }

    fn image_src(&self, href: &str) -> Option<String> {
        if is_external(href) {
            return Some(href.to_string());
        }
        let path = href.strip_prefix("./").unwrap_or(href);
        let src = self.images.resolve_image(path);
        if src.is_none() {
            warn!("Image {path} is missing from the archive");
        }
        src
    }

    /// `/*<name attrs>*/` + body + `/*</name>*/`
    fn commented(&mut self, element: &Element, body: impl FnOnce(&mut Self)) {
        self.out.push_str("/*<");
        self.out.push_str(&element.name);
        write_xml_attrs(&element.attrs, &mut self.out);
        self.out.push_str(">*/\n");
        body(self);
        self.out.push_str("\n/*</");
        self.out.push_str(&element.name);
        self.out.push_str(">*/");
    }

    fn push_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape_html_attr(value));
        self.out.push('"');
    }

    fn push_attr_nonempty(&mut self, name: &str, value: &str) {
        if !value.is_empty() {
            self.push_attr(name, value);
        }
    }
}

fn find_collapsed(element: &Element) -> Option<(usize, &Element, &'static ElementMapping)> {
    element
        .children
        .iter()
        .enumerate()
        .find_map(|(index, node)| match node {
            Node::Element(child) => {
                collapsed_child(&element.name, &child.name).map(|mapping| (index, child, mapping))
            },
            Node::Text(_) => None,
        })
}

fn renders_as_body(node: &Node) -> bool {
    let Node::Element(element) = node else {
        return false;
    };
    let html = match find_collapsed(element) {
        Some((_, _, mapping)) => Some(mapping.html),
        None => element_to_html(&element.name).map(|mapping| mapping.html),
    };
    html == Some("body")
}

/// `scheme:` references point outside the archive.
pub fn is_external(href: &str) -> bool {
    match href.find(':') {
        Some(colon) => colon > 0 && href[..colon].bytes().all(|b| b.is_ascii_alphabetic()),
        None => false,
    }
}

/// Remove characters XML 1.0 does not allow.
fn strip_invalid_chars(text: &str) -> Cow<'_, str> {
    fn valid(c: char) -> bool {
        matches!(c, '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
    }
    if text.chars().all(valid) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| valid(*c)).collect())
    }
}
