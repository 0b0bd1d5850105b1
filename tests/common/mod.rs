#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

pub const MIMETYPE: &str = "application/vnd.oasis.opendocument.text";

pub const STYLES_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<office:document-styles xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\" office:version=\"1.2\"/>";

const ROOT_OPEN: &str = concat!(
    "<office:document-content xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\" ",
    "xmlns:style=\"urn:oasis:names:tc:opendocument:xmlns:style:1.0\" ",
    "xmlns:text=\"urn:oasis:names:tc:opendocument:xmlns:text:1.0\" ",
    "xmlns:table=\"urn:oasis:names:tc:opendocument:xmlns:table:1.0\" ",
    "xmlns:draw=\"urn:oasis:names:tc:opendocument:xmlns:drawing:1.0\" ",
    "xmlns:xlink=\"http://www.w3.org/1999/xlink\" ",
    "xmlns:fo=\"urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0\" ",
    "office:version=\"1.2\">"
);

/// `content.xml` with the given automatic styles and body text.
pub fn content_xml(styles: &str, body: &str) -> String {
    let styles = if styles.is_empty() {
        String::new()
    } else {
        format!("<office:automatic-styles>{styles}</office:automatic-styles>")
    };
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{ROOT_OPEN}{styles}<office:body><office:text>{body}</office:text></office:body></office:document-content>"
    )
}

/// ZIP bytes of a package holding `entries` after the usual `mimetype`.
pub fn odt(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    writer.start_file("mimetype", stored).expect("start mimetype");
    writer.write_all(MIMETYPE.as_bytes()).expect("write mimetype");
    for (path, data) in entries {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        writer.start_file(*path, options).expect("start entry");
        writer.write_all(data).expect("write entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Package with `content.xml` and a plain `styles.xml`.
pub fn simple_odt(styles: &str, body: &str) -> Vec<u8> {
    let content = content_xml(styles, body);
    odt(&[
        ("content.xml", content.as_bytes()),
        ("styles.xml", STYLES_XML.as_bytes()),
    ])
}

/// Little-endian writer for synthetic StarView Metafiles.
#[derive(Default)]
pub struct Svm {
    pub bytes: Vec<u8>,
}

impl Svm {
    /// Signature and header for a `width` x `height` (1/100 mm) drawing.
    pub fn new(width: u32, height: u32, actions: u32) -> Self {
        let mut svm = Self::default();
        svm.raw(b"VCLMTF").compat(1, |h| {
            h.u32(0)
                .compat(1, |m| {
                    m.u16(0).i32(0).i32(0).u32(1).u32(1).u32(1).u32(1).u8(1);
                })
                .u32(width)
                .u32(height)
                .u32(actions);
        });
        svm
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.bytes.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn raw(&mut self, v: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(v);
        self
    }

    /// Version and length prefix around the bytes written by `body`.
    pub fn compat(&mut self, version: u16, body: impl FnOnce(&mut Self)) -> &mut Self {
        let mut inner = Self::default();
        body(&mut inner);
        self.u16(version).u32(inner.bytes.len() as u32);
        self.bytes.extend_from_slice(&inner.bytes);
        self
    }

    pub fn record(&mut self, code: u16, version: u16, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.u16(code).compat(version, body)
    }
}
