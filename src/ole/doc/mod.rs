/// Word (.doc) document support.
///
/// This module recovers the body text of Microsoft Word documents in the
/// legacy binary format (.doc files), which uses OLE2 structured storage.
///
/// # Architecture
///
/// - `Package`: the compound file, its `WordDocument` stream and FIB
/// - `Document`: piece-table text decoding over a package
///
/// # DOC File Structure
///
/// A .doc file is an OLE2 structured storage containing several streams:
/// - **WordDocument**: Main document stream containing the FIB and text
/// - **1Table** or **0Table**: Contains the piece table and formatting
/// - **Data**: Contains embedded objects and images
/// - **\x05SummaryInformation**: Document metadata
///
/// Only the first two are read here.
///
/// # Example
///
/// ```rust,no_run
/// use docsalvage::ole::doc::Package;
///
/// let bytes = std::fs::read("document.doc")?;
/// let package = Package::parse(&bytes)?;
/// let text = package.document().text()?;
/// println!("Document text ({:?} layout): {}", text.layout, text.text);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod document;
pub mod package;
pub mod parts;

pub use document::{Document, StructuralText};
pub use package::{DocError, Package};
pub use parts::fib::Fib;
pub use parts::piece_table::{ClxLayout, PieceTable, TextPiece};
