//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the public [`ExtractionError`].
use super::types::ExtractionError;
use crate::common::binary::BinaryError;
use crate::ole::OleError;
use crate::ole::doc::DocError;

impl From<OleError> for ExtractionError {
    fn from(err: OleError) -> Self {
        match err {
            OleError::NotCompoundDocument => ExtractionError::NotACompoundDocument,
            OleError::StreamNotFound(name) => ExtractionError::StreamNotFound(name),
            other => ExtractionError::Corrupted(other.to_string()),
        }
    }
}

impl From<DocError> for ExtractionError {
    fn from(err: DocError) -> Self {
        match err {
            DocError::Ole(ole_err) => ExtractionError::from(ole_err),
            other => ExtractionError::PieceTable(other.to_string()),
        }
    }
}

impl From<BinaryError> for ExtractionError {
    fn from(err: BinaryError) -> Self {
        ExtractionError::Corrupted(err.to_string())
    }
}
