/// Package implementation for legacy Word documents (.doc).
use super::document::Document;
use super::parts::fib::Fib;
use crate::common::binary::BinaryError;
use crate::ole::consts::WORD_DOCUMENT_STREAM;
use crate::ole::{CompoundFile, OleError};
use thiserror::Error;
use tracing::debug;

/// Error types for DOC file parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocError {
    /// Container-level failure
    #[error(transparent)]
    Ole(#[from] OleError),
    /// The WordDocument stream is shorter than the FIB fields we read
    #[error("FIB needs 162 bytes, stream has {0}")]
    FibTooShort(usize),
    /// The FIB identifier is not the Word 97+ magic
    #[error("Unknown FIB identifier {0:#06x}")]
    UnknownIdent(u16),
    /// The FIB declares no CLX
    #[error("FIB declares no CLX")]
    MissingClx,
    /// The CLX (or its piece-table block) lies outside its stream
    #[error("CLX region at {offset} (length {len}) is out of bounds")]
    ClxOutOfBounds { offset: usize, len: usize },
    /// The CLX ended before a piece-table block
    #[error("No piece table block in CLX")]
    PieceTableNotFound,
    #[error("Unexpected CLX tag {tag:#04x} at offset {offset}")]
    UnexpectedClxTag { tag: u8, offset: usize },
    #[error("Piece table has no pieces")]
    EmptyPieceTable,
    /// Every piece decoded to nothing
    #[error("Piece table produced no text")]
    NoText,
    #[error(transparent)]
    Binary(#[from] BinaryError),
}

/// Result type for DOC operations.
pub type Result<T> = std::result::Result<T, DocError>;

/// A Word (.doc) package.
///
/// Wraps a parsed compound file together with its `WordDocument` stream and
/// FIB. All state is local to one input buffer.
///
/// # Examples
///
/// ```rust,no_run
/// use docsalvage::ole::doc::Package;
///
/// let bytes = std::fs::read("document.doc")?;
/// let package = Package::parse(&bytes)?;
/// let text = package.document().text()?;
/// println!("{}", text.text);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Package<'a> {
    cfb: CompoundFile<'a>,
    word_document: Vec<u8>,
    fib: Fib,
}

impl<'a> Package<'a> {
    /// Open the compound file, read `WordDocument` and parse its FIB.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let cfb = CompoundFile::parse(data)?;
        let word_document = cfb.open_stream(WORD_DOCUMENT_STREAM)?;
        let fib = Fib::parse(&word_document)?;

        debug!(
            stream_len = word_document.len(),
            ident = fib.ident,
            version = fib.version,
            fc_min = fib.fc_min,
            fc_mac = fib.fc_mac,
            "opened WordDocument stream"
        );
        if !fib.is_word_document() {
            debug!(ident = fib.ident, "FIB identifier mismatch");
        }

        Ok(Self {
            cfb,
            word_document,
            fib,
        })
    }

    #[inline]
    pub fn compound_file(&self) -> &CompoundFile<'a> {
        &self.cfb
    }

    /// Bytes of the `WordDocument` stream.
    #[inline]
    pub fn word_document(&self) -> &[u8] {
        &self.word_document
    }

    #[inline]
    pub fn fib(&self) -> &Fib {
        &self.fib
    }

    /// Read the table stream the FIB selects (`0Table` or `1Table`).
    pub fn table_stream(&self) -> Result<Vec<u8>> {
        Ok(self.cfb.open_stream(self.fib.table_stream_name())?)
    }

    /// Text view of the document body.
    #[inline]
    pub fn document(&self) -> Document<'_, 'a> {
        Document::new(self)
    }
}
