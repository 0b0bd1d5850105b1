//! OpenDocument Text packages.
//!
//! - `package`: the ZIP container, held in memory entry by entry
//! - `document`: [`Document`], the HTML editing façade over one package
//! - `verify`: the round-trip checks behind the verified conversions

pub mod document;
pub mod package;
mod verify;

pub use document::{Document, DocumentOptions};
pub use package::Archive;
