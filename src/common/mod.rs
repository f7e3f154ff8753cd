//! Shared primitives: bounds-checked binary reads, byte scanning, text
//! cleanup and the public error type.

// Submodule declarations
pub mod binary;
pub mod error;
pub mod scan;
pub mod text;

// Re-exports for convenience
pub use error::{ExtractionError, Result};
