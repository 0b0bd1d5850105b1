//! StarView Metafile (SVM) decoder
//!
//! SVM is the native vector format of StarOffice/LibreOffice. Documents
//! written by older versions embed it as `Pictures/*.svm` images. The format
//! is a `VCLMTF` signature, a versioned header and a list of versioned
//! action records.
//!
//! # Architecture
//!
//! - `parser`: [`SvmReader`], the bounds-checked cursor that decodes records
//! - `replay`: [`Renderer`], which replays records onto a [`Surface`]
//! - `surface`: the drawing surface trait and its value types
//! - `svg_surface`: [`SvgSurface`], recording the drawing as SVG
//! - `bitmap`: masked bitmap compositing and the fallback placeholder
//!
//! Action kinds without a replay (clip regions, arcs, gradients, hatches,
//! ...) are skipped and named in [`DecodedImage::unsupported`].
//!
//! # Example
//!
//! ```no_run
//! use odthtml::images::svm::decode_svm;
//!
//! let data = std::fs::read("drawing.svm")?;
//! let image = decode_svm(&data)?;
//! println!("{}x{} px, skipped: {:?}", image.width, image.height, image.unsupported);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bitmap;
pub mod constants;
pub mod parser;
pub mod replay;
pub mod surface;
pub mod svg_surface;

pub use parser::{SvmError, SvmReader, SvmResult};
pub use replay::Renderer;
pub use surface::{RasterImage, Surface};
pub use svg_surface::SvgSurface;

use crate::common::error::Result;
use log::warn;

/// Options for metafile decoding
#[derive(Debug, Clone)]
pub struct SvmOptions {
    /// Width of the placeholder produced when decoding fails
    pub placeholder_width: u32,
    /// Height of the placeholder produced when decoding fails
    pub placeholder_height: u32,
}

impl Default for SvmOptions {
    fn default() -> Self {
        Self {
            placeholder_width: 64,
            placeholder_height: 64,
        }
    }
}

/// A decoded metafile, ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
    /// Pixel size declared by the header
    pub width: f64,
    pub height: f64,
    /// Skipped action kinds, deduplicated, in first-seen order
    pub unsupported: Vec<String>,
}

impl DecodedImage {
    /// `data:` URL of the encoded image.
    pub fn to_data_url(&self) -> String {
        RasterImage::new(self.mime_type, self.data.clone()).to_data_url()
    }
}

/// Decode a metafile into SVG.
pub(crate) fn decode(data: &[u8]) -> SvmResult<DecodedImage> {
    decode_nested(data, 0)
}

/// Decode a metafile found `depth` levels inside other metafiles.
pub(crate) fn decode_nested(data: &[u8], depth: usize) -> SvmResult<DecodedImage> {
    let mut reader = SvmReader::new(data)?;
    let header = reader.header()?;
    let mut surface = SvgSurface::new(header.width, header.height);
    let unsupported = Renderer::nested(&mut surface, depth).replay(&mut reader, &header)?;
    Ok(DecodedImage {
        mime_type: "image/svg+xml",
        data: surface.finish().into_bytes(),
        width: header.width,
        height: header.height,
        unsupported,
    })
}

/// Decode a StarView Metafile into an SVG image.
///
/// Unsupported actions never fail the decode; they are logged and listed
/// in [`DecodedImage::unsupported`].
pub fn decode_svm(data: &[u8]) -> Result<DecodedImage> {
    let image = decode(data)?;
    if !image.unsupported.is_empty() {
        warn!(
            "SVM action types are unsupported and were ignored: {}",
            image.unsupported.join(", ")
        );
    }
    Ok(image)
}

/// Decode a metafile, substituting a placeholder PNG on fatal errors.
pub fn decode_svm_or_placeholder(data: &[u8], options: &SvmOptions) -> Result<DecodedImage> {
    match decode_svm(data) {
        Ok(image) => Ok(image),
        Err(e) => {
            warn!("SVM image could not be decoded, using a placeholder: {e}");
            let png = bitmap::placeholder(options.placeholder_width, options.placeholder_height)?;
            Ok(DecodedImage {
                mime_type: png.mime_type,
                data: png.data,
                width: f64::from(options.placeholder_width),
                height: f64::from(options.placeholder_height),
                unsupported: Vec::new(),
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::images::svm::constants::{MAX_NESTING_DEPTH, action};
    use crate::images::svm::parser::tests::metafile;

    #[test]
    fn test_decode_draws_rect_as_svg() {
        let mut b = metafile(2540, 2540, 2);
        b.record(action::FILLCOLOR, 1, |r| {
            r.u32(0x336699).u8(1);
        });
        b.record(action::RECT, 1, |r| {
            r.i32(0).i32(0).i32(1270).i32(1270);
        });
        let image = decode_svm(&b.bytes).unwrap();
        let svg = String::from_utf8(image.data.clone()).unwrap();
        assert_eq!(image.mime_type, "image/svg+xml");
        assert!(svg.contains("width=\"96\" height=\"96\""));
        assert!(svg.contains("<path d=\"M0 0L48 0L48 48L0 48Z\" fill=\"#336699\"/>"));
        assert!(image.to_data_url().starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_nested_metafile_is_drawn_as_image() {
        let mut inner = metafile(1270, 1270, 1);
        inner.record(action::ARC, 1, |r| {
            r.raw(&[0; 32]);
        });
        let mut b = metafile(2540, 2540, 2);
        b.record(action::FLOATTRANSPARENT, 1, |r| {
            r.raw(&inner.bytes);
            r.i32(0).i32(0).u32(1270).u32(1270);
            r.compat(1, |g| {
                g.raw(&[0; 26]);
            });
        });
        b.record(action::LINECOLOR, 1, |r| {
            r.u32(0).u8(1);
        });
        let image = decode_svm(&b.bytes).unwrap();
        let svg = String::from_utf8(image.data).unwrap();
        assert!(svg.contains("<image x=\"0\" y=\"0\" width=\"48\" height=\"48\""));
        assert!(svg.contains("xlink:href=\"data:image/svg+xml;base64,"));
        assert_eq!(image.unsupported, ["META_ARC_ACTION"]);
    }

    /// `levels` metafiles, each drawing the next one through a transparency record.
    fn nested_chain(levels: usize) -> Vec<u8> {
        let mut bytes = metafile(1270, 1270, 0).bytes;
        for _ in 0..levels {
            let mut b = metafile(2540, 2540, 1);
            b.record(action::FLOATTRANSPARENT, 1, |r| {
                r.raw(&bytes);
                r.i32(0).i32(0).u32(1270).u32(1270);
                r.compat(1, |g| {
                    g.raw(&[0; 26]);
                });
            });
            bytes = b.bytes;
        }
        bytes
    }

    #[test]
    fn test_nesting_depth_is_limited() {
        let deepest = nested_chain(MAX_NESTING_DEPTH);
        let image = decode_svm(&deepest).unwrap();
        assert!(image.unsupported.is_empty());

        let too_deep = nested_chain(MAX_NESTING_DEPTH + 1);
        let image = decode_svm(&too_deep).unwrap();
        assert_eq!(image.unsupported, ["META_FLOATTRANSPARENT_ACTION"]);

        // Nothing past the limit is embedded, so the output stops growing
        let far_too_deep = nested_chain(MAX_NESTING_DEPTH + 12);
        let bounded = decode_svm(&far_too_deep).unwrap();
        assert_eq!(bounded.data.len(), image.data.len());
    }

    #[test]
    fn test_fatal_error_and_placeholder() {
        let err = decode_svm(b"VCLMTF\x01").unwrap_err();
        assert!(matches!(err, Error::SvmFatal(SvmError::Truncated(_))));

        let options = SvmOptions {
            placeholder_width: 8,
            placeholder_height: 4,
        };
        let image = decode_svm_or_placeholder(b"garbage", &options).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.width, 8.0);
        assert!(image.data.starts_with(b"\x89PNG"));
    }
}
