//! Shared SVG utilities for metafile rendering
//!
//! All functions write directly to an output buffer instead of returning
//! intermediate strings.

use crate::images::svm::surface::{Matrix, Rgb};
use std::fmt::Write;

/// Fast number formatter that writes directly to a string buffer.
/// Integers are written without a fraction, floats are rounded to two
/// decimals with `ryu` and trailing zeros trimmed.
///
/// # Examples
///
/// ```
/// use odthtml::images::svg_utils::write_num;
///
/// let mut buf = String::new();
/// write_num(&mut buf, 10.0);  // writes "10"
/// write_num(&mut buf, 10.5);  // writes "10.5"
/// write_num(&mut buf, 10.123); // writes "10.12"
/// assert_eq!(buf, "1010.510.12");
/// ```
#[inline]
pub fn write_num(buf: &mut String, n: f64) {
    let rounded = (n * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 && rounded.abs() < 1e10 {
        // Avoid "-0"
        let _ = write!(buf, "{}", rounded as i64);
        return;
    }

    let mut buffer = ryu::Buffer::new();
    let s = buffer.format(rounded);
    if s.contains('.') && !s.contains('e') {
        buf.push_str(s.trim_end_matches('0').trim_end_matches('.'));
    } else {
        buf.push_str(s);
    }
}

/// Write a color in `#rrggbb` format.
///
/// # Examples
///
/// ```
/// use odthtml::images::svg_utils::write_rgb;
/// use odthtml::images::svm::surface::Rgb;
///
/// let mut buf = String::new();
/// write_rgb(&mut buf, Rgb { r: 255, g: 0, b: 16 });
/// assert_eq!(buf, "#ff0010");
/// ```
#[inline]
pub fn write_rgb(buf: &mut String, color: Rgb) {
    let _ = write!(buf, "#{:02x}{:02x}{:02x}", color.r, color.g, color.b);
}

/// Write ` transform="matrix(...)"` unless the matrix is the identity.
pub fn write_transform_attr(buf: &mut String, m: &Matrix) {
    if *m == Matrix::IDENTITY {
        return;
    }
    buf.push_str(" transform=\"matrix(");
    for (i, v) in [m.a, m.b, m.c, m.d, m.e, m.f].into_iter().enumerate() {
        if i > 0 {
            buf.push(' ');
        }
        write_num(buf, v);
    }
    buf.push_str(")\"");
}

/// Write a CSS font-family list. Every family is single-quoted so the
/// value can sit inside a double-quoted attribute.
pub fn write_font_families(buf: &mut String, families: &[String]) {
    for (i, family) in families.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        let family = family.trim();
        if matches!(family, "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy") {
            buf.push_str(family);
            continue;
        }
        buf.push('\'');
        for ch in family.chars() {
            match ch {
                '\'' => buf.push_str("\\'"),
                '"' => buf.push_str("&quot;"),
                '&' => buf.push_str("&amp;"),
                '<' => buf.push_str("&lt;"),
                _ => buf.push(ch),
            }
        }
        buf.push('\'');
    }
}
