//! ODF package (ZIP archive) handling.
//!
//! The whole package is held in memory as an ordered list of entries, so
//! that entries the transcoder never touches are written back byte for
//! byte and in their original order.

use crate::common::{Error, Result};
use std::io::{Cursor, Read, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Name of the entry holding the package MIME type.
pub const MIMETYPE_PATH: &str = "mimetype";

/// In-memory ODF package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    entries: Vec<(String, Vec<u8>)>,
}

impl Archive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every entry of a ZIP archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| Error::InvalidFormat("Invalid ZIP archive".to_string()))?;

        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push((file.name().to_string(), data));
        }
        Ok(Self { entries })
    }

    /// Serialize into ZIP bytes.
    ///
    /// `mimetype` is written first and stored uncompressed, as ODF readers
    /// expect; the other entries keep their order and are deflated.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        if let Some(mimetype) = self.get(MIMETYPE_PATH) {
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            writer.start_file(MIMETYPE_PATH, options)?;
            writer.write_all(mimetype)?;
        }

        for (path, data) in &self.entries {
            if path == MIMETYPE_PATH {
                continue;
            }
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            if path.ends_with('/') {
                writer.add_directory(path.as_str(), options)?;
            } else {
                writer.start_file(path.as_str(), options)?;
                writer.write_all(data)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Contents of the entry at `path`.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, data)| data.as_slice())
    }

    /// Check whether an entry exists.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Replace an entry in place, or append it if it is new.
    pub fn set(&mut self, path: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|(name, _)| name == path) {
            Some((_, existing)) => *existing = data,
            None => self.entries.push((path.to_string(), data)),
        }
    }

    /// Entry paths in archive order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries in archive order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
