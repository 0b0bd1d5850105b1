//! Common types and utilities shared by the transcoder and the decoders.
//!
//! This module provides the unified error type, the owned markup tree used
//! on both the XML and the HTML side, escaping helpers and bounds-checked
//! binary reads.

// Submodule declarations
pub mod binary;
pub mod dom;
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use dom::{Element, Node};
pub use error::{Error, Result};
