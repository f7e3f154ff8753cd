//! Docsalvage - text recovery for legacy Microsoft Word (.doc) files
//!
//! This library pulls readable text out of Word 97-2003 binary documents,
//! including damaged ones and ones written by tools that bend the format.
//!
//! # Features
//!
//! - **Structural path**: compound-file reader, FIB and piece-table decoding
//! - **Heuristic path**: six independent byte-pattern scans that run even when
//!   the structure is intact
//! - **Deterministic selection**: every candidate is scored and exactly one
//!   wins, independent of scheduling
//! - **Zero-copy parsing**: scans borrow the input buffer
//!
//! # Example - Extracting text
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("document.doc")?;
//! let text = docsalvage::extract_text(&bytes)?;
//! println!("Document text: {}", text);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Custom options and a report
//!
//! ```no_run
//! use docsalvage::{ExtractOptions, Extractor, HeuristicStrategy};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ExtractOptions::new()
//!     .with_strategies(vec![HeuristicStrategy::Utf16Interleave, HeuristicStrategy::Frequency])
//!     .with_parallel(false);
//! let bytes = std::fs::read("document.doc")?;
//! let report = Extractor::new(options).extract_with_report(&bytes)?;
//! println!("{} chars from {}", report.text.len(), report.source.as_str());
//! if let Some(reason) = &report.structural_failure {
//!     println!("piece table unusable: {}", reason);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level OLE access
//!
//! ```no_run
//! use docsalvage::ole::CompoundFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("document.doc")?;
//! let cfb = CompoundFile::parse(&bytes)?;
//! let stream = cfb.open_stream("WordDocument")?;
//! println!("WordDocument is {} bytes", stream.len());
//! # Ok(())
//! # }
//! ```

/// Shared primitives and the public error type
pub mod common;

/// Extraction options
pub mod config;

/// Extraction orchestration
pub mod extract;

/// Heuristic text recovery
pub mod heuristic;

/// OLE2 compound files and the Word binary format
pub mod ole;

/// Candidate scoring and selection
pub mod select;

#[cfg(test)]
mod test_support;

// Re-export the main API at the crate root
pub use common::error::{ExtractionError, Result};
pub use config::ExtractOptions;
pub use extract::{Extraction, Extractor, extract_structural, extract_text};
pub use heuristic::HeuristicStrategy;
pub use ole::doc;
pub use select::{Candidate, Origin};
