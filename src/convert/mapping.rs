//! Name tables between ODT and HTML.
//!
//! Each table is declared once in ODT → HTML direction as an ordered `phf`
//! map; the HTML → ODT direction is derived lazily from the same entries.
//! When two ODT names map to the same HTML name, the one declared first is
//! the one restored (`class` becomes `text:style-name`, `width` becomes
//! `style:width`).

use once_cell::sync::Lazy;
use phf::{OrderedMap, phf_ordered_map};
use std::collections::HashMap;

/// How an ODT element is represented in HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    /// One element renamed to one element
    Simple,
    /// A parent with a specific first-level child, fused into one element
    Collapsed {
        parent: &'static str,
        child: &'static str,
    },
    /// Renamed, with the ODT name told apart by a `data-type` attribute
    Typed { data_type: &'static str },
}

/// One row of the element table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMapping {
    /// Table key: the ODT name, or `parent>>child` for collapsed pairs
    pub odt: &'static str,
    pub html: &'static str,
    pub kind: MappingKind,
}

impl ElementMapping {
    const fn simple(odt: &'static str, html: &'static str) -> Self {
        Self {
            odt,
            html,
            kind: MappingKind::Simple,
        }
    }

    const fn collapsed(
        odt: &'static str,
        parent: &'static str,
        child: &'static str,
        html: &'static str,
    ) -> Self {
        Self {
            odt,
            html,
            kind: MappingKind::Collapsed { parent, child },
        }
    }

    const fn typed(odt: &'static str, html: &'static str, data_type: &'static str) -> Self {
        Self {
            odt,
            html,
            kind: MappingKind::Typed { data_type },
        }
    }

    /// `data-type` value written on the HTML side.
    pub fn data_type(&self) -> Option<&'static str> {
        match self.kind {
            MappingKind::Typed { data_type } => Some(data_type),
            _ => None,
        }
    }
}

static ELEMENTS: OrderedMap<&'static str, ElementMapping> = phf_ordered_map! {
    "office:document-content" => ElementMapping::simple("office:document-content", "html"),
    "office:body>>office:text" => ElementMapping::collapsed("office:body>>office:text", "office:body", "office:text", "body"),

    "office:scripts" => ElementMapping::simple("office:scripts", "script"),

    "text:p" => ElementMapping::simple("text:p", "p"),
    "text:span" => ElementMapping::simple("text:span", "span"),
    "text:a" => ElementMapping::simple("text:a", "a"),
    "text:list" => ElementMapping::simple("text:list", "ol"),
    "text:list-item" => ElementMapping::simple("text:list-item", "li"),
    "text:line-break" => ElementMapping::simple("text:line-break", "br"),

    "table:table" => ElementMapping::simple("table:table", "table"),
    "table:table-header-rows" => ElementMapping::simple("table:table-header-rows", "thead"),
    "table:table-row" => ElementMapping::simple("table:table-row", "tr"),
    "table:table-column" => ElementMapping::simple("table:table-column", "col"),
    "table:table-cell" => ElementMapping::simple("table:table-cell", "td"),
    "table:covered-table-cell" => ElementMapping::typed("table:covered-table-cell", "td", "covered"),

    "draw:frame>>draw:image" => ElementMapping::collapsed("draw:frame>>draw:image", "draw:frame", "draw:image", "img"),
    "draw:object" => ElementMapping::simple("draw:object", "object"),

    "office:automatic-styles" => ElementMapping::simple("office:automatic-styles", "style"),
    "office:font-face-decls" => ElementMapping::typed("office:font-face-decls", "style", "fonts"),
};

static ATTRIBUTES: OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "text:style-name" => "class",
    "table:style-name" => "class",
    "table:number-columns-spanned" => "colspan",
    "table:number-rows-spanned" => "rowspan",
    "table:number-columns-repeated" => "span",
    "xlink:href" => "href",
    "xml:id" => "id",
};

static STYLES: OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "fo:text-align" => "text-align",
    "style:font-name" => "font-family",
    "fo:font-size" => "font-size",
    "fo:font-weight" => "font-weight",
    "fo:font-style" => "font-style",
    "fo:color" => "color",
    "fo:padding" => "padding",
    "fo:padding-top" => "padding-top",
    "fo:padding-right" => "padding-right",
    "fo:padding-bottom" => "padding-bottom",
    "fo:padding-left" => "padding-left",
    "fo:border" => "border",
    "fo:border-top" => "border-top",
    "fo:border-right" => "border-right",
    "fo:border-bottom" => "border-bottom",
    "fo:border-left" => "border-left",
    "style:width" => "width",
    "style:column-width" => "width",
};

/// Namespace declarations restored on the root element when missing.
pub static DEFAULT_ROOT_ATTRIBUTES: &[(&str, &str)] = &[
    (
        "xmlns:office",
        "urn:oasis:names:tc:opendocument:xmlns:office:1.0",
    ),
    ("xmlns:style", "urn:oasis:names:tc:opendocument:xmlns:style:1.0"),
    ("xmlns:text", "urn:oasis:names:tc:opendocument:xmlns:text:1.0"),
    ("xmlns:table", "urn:oasis:names:tc:opendocument:xmlns:table:1.0"),
    (
        "xmlns:draw",
        "urn:oasis:names:tc:opendocument:xmlns:drawing:1.0",
    ),
    ("xmlns:xlink", "http://www.w3.org/1999/xlink"),
    ("office:version", "1.2"),
];

static VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

// Keyed by `html` or `html/data-type`
static ELEMENTS_REVERSE: Lazy<HashMap<String, &'static ElementMapping>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for mapping in ELEMENTS.values() {
        let key = match mapping.data_type() {
            Some(data_type) => format!("{}/{}", mapping.html, data_type),
            None => mapping.html.to_string(),
        };
        map.entry(key).or_insert(mapping);
    }
    map
});

static COLLAPSED: Lazy<HashMap<(&'static str, &'static str), &'static ElementMapping>> =
    Lazy::new(|| {
        ELEMENTS
            .values()
            .filter_map(|mapping| match mapping.kind {
                MappingKind::Collapsed { parent, child } => Some(((parent, child), mapping)),
                _ => None,
            })
            .collect()
    });

static ATTRIBUTES_REVERSE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| reverse_first_wins(&ATTRIBUTES));

fn reverse_first_wins(
    table: &'static OrderedMap<&'static str, &'static str>,
) -> HashMap<&'static str, &'static str> {
    let mut map = HashMap::new();
    for (odt, html) in table.entries() {
        map.entry(*html).or_insert(*odt);
    }
    map
}

/// Mapping for a plain ODT element name.
pub fn element_to_html(odt: &str) -> Option<&'static ElementMapping> {
    ELEMENTS.get(odt)
}

/// Mapping for an HTML element, preferring the one matching `data_type`.
pub fn element_to_odt(html: &str, data_type: Option<&str>) -> Option<&'static ElementMapping> {
    if let Some(data_type) = data_type {
        let typed = format!("{html}/{data_type}");
        if let Some(mapping) = ELEMENTS_REVERSE.get(typed.as_str()) {
            return Some(*mapping);
        }
    }
    ELEMENTS_REVERSE.get(html).copied()
}

/// Collapsed mapping registered for this parent/child pair.
pub fn collapsed_child(parent: &str, child: &str) -> Option<&'static ElementMapping> {
    COLLAPSED.get(&(parent, child)).copied()
}

/// HTML name of an ODT attribute. Unmapped names pass through.
pub fn attribute_to_html(name: &str) -> &str {
    ATTRIBUTES.get(name).copied().unwrap_or(name)
}

/// ODT name of an HTML attribute on an element that becomes `odt_element`.
pub fn attribute_to_odt<'a>(name: &'a str, odt_element: &str) -> &'a str {
    if name == "class" && odt_element.starts_with("table:") {
        return "table:style-name";
    }
    ATTRIBUTES_REVERSE.get(name).copied().unwrap_or(name)
}

/// CSS declaration(s) for one ODT style property.
///
/// # Examples
///
/// ```
/// use odthtml::convert::mapping::style_to_css;
///
/// assert_eq!(style_to_css("fo:font-weight", "bold"), "font-weight: bold;");
/// assert_eq!(style_to_css("style:wrap", "none"), "style--wrap: none;");
/// ```
pub fn style_to_css(name: &str, value: &str) -> String {
    if name == "style:text-underline-style" && value == "solid" {
        return format!("text-decoration: underline; style--text-underline-style: {value};");
    }
    if name == "style:text-position" {
        let mut parts = value.split(' ');
        let mut css = format!("vertical-align: {};", parts.next().unwrap_or_default());
        if let Some(size) = parts.next() {
            css.push_str("font-size: ");
            css.push_str(size);
            css.push(';');
        }
        css.push_str(" style--text-position: ");
        css.push_str(value);
        css.push(';');
        return css;
    }
    match STYLES.get(name) {
        Some(css) => format!("{css}: {value};"),
        None => format!("{}: {value};", name.replacen(':', "--", 1)),
    }
}

/// Whether an HTML element has no content and no end tag.
pub fn is_void(html: &str) -> bool {
    VOID_ELEMENTS.contains(&html)
}
