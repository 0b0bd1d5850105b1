//! Unified error type for odthtml.
//!
//! Every fallible operation of the crate returns [`Result`], so callers only
//! deal with one error enum regardless of whether the failure came from the
//! ZIP container, the XML/HTML markup, the round-trip check or the metafile
//! decoder.
use thiserror::Error;

use crate::images::svm::SvmError;

/// Main error type for odthtml operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed markup, or the main document entry is missing
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The bytes are not a ZIP container
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The produced HTML does not survive the reverse transcoding
    #[error("Couldn't parse ODT file: {0}")]
    RoundTripRead(String),

    /// The supplied HTML does not survive the reverse transcoding
    #[error("Couldn't generate ODT file: {0}")]
    RoundTripWrite(String),

    /// The StarView Metafile decoder gave up
    #[error("SVM error: {0}")]
    SvmFatal(#[from] SvmError),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Bitmap decoding or encoding error
    #[error("Image error: {0}")]
    ImageError(String),
}

/// Result type for odthtml operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_messages() {
        let read = Error::RoundTripRead("roundtrip failed.".to_string());
        assert_eq!(read.to_string(), "Couldn't parse ODT file: roundtrip failed.");

        let write = Error::RoundTripWrite("roundtrip failed.".to_string());
        assert_eq!(
            write.to_string(),
            "Couldn't generate ODT file: roundtrip failed."
        );
    }

    #[test]
    fn test_svm_error_converts() {
        let err: Error = SvmError::BadSignature.into();
        assert!(matches!(err, Error::SvmFatal(SvmError::BadSignature)));
    }
}
