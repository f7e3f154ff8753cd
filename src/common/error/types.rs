//! Public error type for text extraction.
use thiserror::Error;

/// Error returned by the extraction entry points.
///
/// Structural failures (everything except [`ExtractionError::NoExtractableText`],
/// [`ExtractionError::Cancelled`] and [`ExtractionError::Io`]) only reach the
/// caller through the structural-only API; the full cascade downgrades them
/// to a fallback.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The input does not start with the compound-file signature
    #[error("Not an OLE compound document")]
    NotACompoundDocument,

    /// The container has no stream with the given name
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// Container structure is damaged (bad header, FAT or sector chain)
    #[error("Corrupted file: {0}")]
    Corrupted(String),

    /// The FIB or piece table could not be decoded
    #[error("Piece table error: {0}")]
    PieceTable(String),

    /// Neither structural decoding nor any heuristic produced usable text
    #[error("No extractable text found")]
    NoExtractableText,

    /// The cancel flag was raised between stages
    #[error("Extraction cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Whether the failure came from the structural path (container or
    /// Word-level parsing) rather than from the cascade as a whole.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ExtractionError::NotACompoundDocument
                | ExtractionError::StreamNotFound(_)
                | ExtractionError::Corrupted(_)
                | ExtractionError::PieceTable(_)
        )
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
