/// Constants for OLE file format
pub mod consts;

/// Compound-file header
pub mod header;

/// Sector-chain and directory reader
pub mod file;

/// PLCF views
pub mod plcf;

/// Legacy Word document (.doc) reader
///
/// This module locates the `WordDocument` stream and reconstructs its body
/// text through the piece table.
pub mod doc;

// Re-export public types for convenient access
pub use file::{CompoundFile, DirectoryEntry, OleError, is_ole_file};
pub use header::CfbHeader;
