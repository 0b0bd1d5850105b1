//! Markup escaping shared by the XML and HTML writers.

pub mod escape;

pub use escape::{escape_html_attr, escape_html_text, escape_xml, unescape_xml};
