//! odthtml - Verified lossless OpenDocument Text ⇄ HTML transcoding
//!
//! This library opens an ODT package, renders its `content.xml` as an HTML
//! document that a browser or editor can work with, and converts edited HTML
//! back into the package. Every ODT construct is carried through the HTML so
//! that an unedited document converts back into the same package.
//!
//! # Features
//!
//! - **Verified conversions**: [`Document::get_html`] and [`Document::set_html`]
//!   refuse conversions that would not survive the opposite direction
//! - **Style rendering**: automatic styles become CSS, with the original
//!   markup kept alongside in comments
//! - **StarView Metafiles**: legacy `.svm` pictures are redrawn as SVG
//! - **Normalization**: a canonical markup form for comparing documents
//!
//! # Example - Editing a document
//!
//! ```no_run
//! use odthtml::Document;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("report.odt")?;
//! let mut document = Document::open(&bytes)?;
//!
//! let html = document.get_html()?;
//! document.set_html(&html.replace("Draft", "Final"))?;
//!
//! std::fs::write("report-final.odt", document.get_archive_bytes()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Decoding a metafile
//!
//! ```no_run
//! use odthtml::decode_svm;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = decode_svm(&std::fs::read("logo.svm")?)?;
//! std::fs::write("logo.svg", &image.data)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Comparing markup
//!
//! ```
//! use odthtml::normalize;
//!
//! assert_eq!(
//!     normalize("<p b=\"2\" a=\"1\"></p>"),
//!     normalize("<p a=\"1\" b=\"2\"/>")
//! );
//! ```

/// Shared infrastructure: errors, XML helpers, the markup tree model
pub mod common;

/// ODT ⇄ HTML transcoding and markup normalization
pub mod convert;

/// Embedded image handling, including the StarView Metafile decoder
pub mod images;

/// ODF packages and the document façade
pub mod odf;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use convert::normalize;
pub use images::{DecodedImage, SvmOptions, decode_svm};
pub use odf::{Archive, Document, DocumentOptions};
