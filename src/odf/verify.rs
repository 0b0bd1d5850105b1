//! Round-trip verification.
//!
//! A conversion is accepted only if converting its output back reproduces
//! the input, compared after [`normalize`]. Reading checks that the HTML
//! survives an HTML parser unchanged and converts back into the same
//! package; writing checks that the new package reads back as the HTML that
//! was written. Both work on scratch copies of the archive.

use super::document::Document;
use super::package::Archive;
use crate::common::dom::reserialize_html;
use crate::common::{Error, Result};
use crate::convert::normalize;
use log::debug;

const INVALID_HTML: &str = "produced invalid HTML.";
const ROUNDTRIP_FAILED: &str = "roundtrip failed.";

/// HTML for `archive`, checked to convert back into the same package.
pub(crate) fn verified_read(document: &Document, archive: &Archive) -> Result<String> {
    let html = document.render_html(archive)?;

    let tidied = reserialize_html(&html);
    if normalize(&tidied) != normalize(&html) {
        debug!("Re-serialized HTML differs from the generated HTML");
        return Err(Error::RoundTripRead(INVALID_HTML.to_string()));
    }

    let mut scratch = archive.clone();
    document.write_content(&mut scratch, &tidied);
    if !same_package(archive, &scratch, document.content_path()) {
        debug!("Converting the HTML back changed the package");
        return Err(Error::RoundTripRead(ROUNDTRIP_FAILED.to_string()));
    }

    let regenerated = document.render_html(&scratch).map_err(|e| {
        debug!("Regenerating HTML from the converted package failed: {e}");
        Error::RoundTripRead(ROUNDTRIP_FAILED.to_string())
    })?;
    if normalize(&regenerated) != normalize(&html) {
        debug!("Regenerated HTML differs from the first conversion");
        return Err(Error::RoundTripRead(ROUNDTRIP_FAILED.to_string()));
    }

    debug!("Read round trip verified ({} bytes of HTML)", html.len());
    Ok(html)
}

/// The package `html` converts into, checked to read back as `html`.
///
/// The document itself is not modified.
pub(crate) fn verified_write(document: &Document, html: &str) -> Result<Archive> {
    let mut candidate = document.archive.clone();
    document.write_content(&mut candidate, html);

    let rederived = verified_read(document, &candidate).map_err(|e| match e {
        Error::RoundTripRead(message) => Error::RoundTripWrite(message),
        other => Error::RoundTripWrite(other.to_string()),
    })?;
    if normalize(&rederived) != normalize(html) {
        debug!("HTML read back from the new package differs from the input");
        return Err(Error::RoundTripWrite(ROUNDTRIP_FAILED.to_string()));
    }

    debug!("Write round trip verified");
    Ok(candidate)
}

/// Same entries in the same order, with the content entry compared in
/// normalized form and every other entry byte for byte.
fn same_package(original: &Archive, converted: &Archive, content_path: &str) -> bool {
    original.len() == converted.len()
        && original
            .entries()
            .zip(converted.entries())
            .all(|((path_a, data_a), (path_b, data_b))| {
                if path_a != path_b {
                    return false;
                }
                if path_a == content_path {
                    normalize(&String::from_utf8_lossy(data_a))
                        == normalize(&String::from_utf8_lossy(data_b))
                } else {
                    data_a == data_b
                }
            })
}
