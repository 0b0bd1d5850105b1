//! Unified error types for odthtml.
//!
//! This module provides a single error type that covers archive, markup,
//! round-trip and metafile failures.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
