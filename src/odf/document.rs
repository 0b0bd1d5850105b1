//! The editable ODT document.
//!
//! [`Document`] owns the unpacked package and converts its main content
//! entry to HTML and back. The verified entry points ([`Document::get_html`],
//! [`Document::set_html`]) refuse any conversion that would not survive the
//! opposite direction; the `_unsafe` variants skip that check.

use super::package::Archive;
use super::verify;
use crate::common::dom::parse_xml;
use crate::common::{Error, Result};
use crate::convert::{ImageResolver, to_html, to_odt};
use crate::images::svm::constants::SIGNATURE;
use crate::images::svm::decode_svm_or_placeholder;
use crate::images::{DecodedImage, SvmOptions, data_url, sniff_mime_type};
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashMap;

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Archive entry holding the document body
    pub content_path: String,
    /// Redraw embedded StarView Metafiles as SVG
    ///
    /// When disabled, metafiles are embedded as they are.
    pub decode_metafiles: bool,
    /// Metafile decoder options
    pub svm: SvmOptions,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            content_path: "content.xml".to_string(),
            decode_metafiles: true,
            svm: SvmOptions::default(),
        }
    }
}

/// An OpenDocument text document opened for HTML editing.
///
/// # Example
///
/// ```no_run
/// use odthtml::Document;
///
/// let bytes = std::fs::read("letter.odt")?;
/// let mut document = Document::open(&bytes)?;
/// let html = document.get_html()?;
/// document.set_html(&html.replace("Dear", "Hello"))?;
/// std::fs::write("letter-edited.odt", document.get_archive_bytes()?)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Document {
    pub(crate) archive: Archive,
    pub(crate) options: DocumentOptions,
    metafiles: RefCell<HashMap<String, DecodedImage>>,
    diagnostics: RefCell<Vec<String>>,
}

impl Document {
    /// Open an ODT package from its ZIP bytes.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::open_with_options(bytes, DocumentOptions::default())
    }

    /// Open an ODT package with custom options.
    pub fn open_with_options(bytes: &[u8], options: DocumentOptions) -> Result<Self> {
        Ok(Self::from_archive(Archive::from_bytes(bytes)?, options))
    }

    /// Wrap an already unpacked package.
    pub fn from_archive(archive: Archive, options: DocumentOptions) -> Self {
        Self {
            archive,
            options,
            metafiles: RefCell::new(HashMap::new()),
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// The document as HTML, checked to convert back losslessly.
    pub fn get_html(&self) -> Result<String> {
        verify::verified_read(self, &self.archive)
    }

    /// The document as HTML, without the round-trip check.
    pub fn get_html_unsafe(&self) -> Result<String> {
        self.render_html(&self.archive)
    }

    /// Replace the document body, refusing HTML that doesn't round-trip.
    ///
    /// The document is left untouched when the check fails.
    pub fn set_html(&mut self, html: &str) -> Result<()> {
        let candidate = verify::verified_write(self, html)?;
        self.archive = candidate;
        Ok(())
    }

    /// Replace the document body without the round-trip check.
    pub fn set_html_unsafe(&mut self, html: &str) {
        let mut archive = std::mem::take(&mut self.archive);
        self.write_content(&mut archive, html);
        self.archive = archive;
    }

    /// The package serialized as ZIP bytes.
    pub fn get_archive_bytes(&self) -> Result<Vec<u8>> {
        self.archive.to_bytes()
    }

    /// The unpacked package.
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Metafile action kinds skipped so far, deduplicated.
    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.borrow().clone()
    }

    pub(crate) fn content_path(&self) -> &str {
        &self.options.content_path
    }

    pub(crate) fn render_html(&self, archive: &Archive) -> Result<String> {
        let path = self.content_path();
        let bytes = archive
            .get(path)
            .ok_or_else(|| Error::ParseError(format!("{path} is missing from the archive")))?;
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| Error::ParseError(format!("{path} is not valid UTF-8: {e}")))?;
        let root = parse_xml(xml)?;
        let images = ArchiveImages {
            archive,
            document: self,
        };
        Ok(to_html(&root, &images))
    }

    pub(crate) fn write_content(&self, archive: &mut Archive, html: &str) {
        archive.set(self.content_path(), to_odt(html).into_bytes());
    }

    fn metafile_src(&self, path: &str, data: &[u8]) -> Option<String> {
        if let Some(image) = self.metafiles.borrow().get(path) {
            debug!("Using cached rendering of metafile {path}");
            return Some(image.to_data_url());
        }

        let image = match decode_svm_or_placeholder(data, &self.options.svm) {
            Ok(image) => image,
            Err(e) => {
                warn!("Metafile {path} could not be embedded: {e}");
                return None;
            },
        };
        {
            let mut diagnostics = self.diagnostics.borrow_mut();
            for name in &image.unsupported {
                if !diagnostics.contains(name) {
                    diagnostics.push(name.clone());
                }
            }
        }
        let src = image.to_data_url();
        self.metafiles.borrow_mut().insert(path.to_string(), image);
        Some(src)
    }
}

/// Resolves image paths against one archive, with per-document metafile
/// memoization.
struct ArchiveImages<'d> {
    archive: &'d Archive,
    document: &'d Document,
}

impl ImageResolver for ArchiveImages<'_> {
    fn resolve_image(&self, path: &str) -> Option<String> {
        let data = self.archive.get(path)?;
        if self.document.options.decode_metafiles && data.starts_with(SIGNATURE) {
            return self.document.metafile_src(path, data);
        }
        Some(data_url(sniff_mime_type(data), data))
    }
}
