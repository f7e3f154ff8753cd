//! Public error type for text extraction.
//!
//! Each internal layer has its own error enum; everything that reaches the
//! caller is converted into [`ExtractionError`].

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{ExtractionError, Result};
