// Embedded image handling
//
// Images referenced from an ODT document are inlined into the HTML as
// `data:` URLs. Raster formats are passed through untouched; StarView
// Metafiles are decoded and redrawn as SVG.
//
// # Architecture
//
// - `svm`: StarView Metafile decoder and renderer
// - `svg_utils`: number and color formatting shared by the SVG writer

pub mod svg_utils;
pub mod svm;

pub use svm::{DecodedImage, SvmOptions, decode_svm};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Build a base64 `data:` URL.
pub fn data_url(mime_type: &str, data: &[u8]) -> String {
    let mut url = String::with_capacity(data.len() * 4 / 3 + 32);
    url.push_str("data:");
    url.push_str(mime_type);
    url.push_str(";base64,");
    STANDARD.encode_string(data, &mut url);
    url
}

/// Guess the MIME type of an embedded image from its leading bytes.
///
/// Unrecognized data is reported as PNG.
///
/// # Examples
///
/// ```
/// use odthtml::images::sniff_mime_type;
///
/// assert_eq!(sniff_mime_type(b"\xFF\xD8\xFF\xE0rest"), "image/jpeg");
/// assert_eq!(sniff_mime_type(b"<?xml version=\"1.0\"?><svg/>"), "image/svg+xml");
/// assert_eq!(sniff_mime_type(b"????"), "image/png");
/// ```
pub fn sniff_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        return "image/png";
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if data.starts_with(svm::constants::SIGNATURE) {
        return "image/x-svm";
    }
    if data.starts_with(b"BM") {
        return "image/bmp";
    }

    let head = &data[..data.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{FEFF}').trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return "image/svg+xml";
    }

    "image/png"
}
