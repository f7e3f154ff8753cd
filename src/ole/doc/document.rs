/// Document - text view over a parsed Word package.
use super::package::{DocError, Package, Result};
use super::parts::piece_table::{ClxLayout, PieceTable};
use super::parts::text::decode_pieces;
use serde::Serialize;
use tracing::debug;

/// Layouts tried by [`Document::text`], in order
pub const LAYOUT_ORDER: [ClxLayout; 2] = [ClxLayout::Compact, ClxLayout::Standard];

/// Text recovered through the piece table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralText {
    /// Decoded pieces joined in CP order
    pub text: String,
    /// CLX layout that produced the text
    pub layout: ClxLayout,
}

/// A Word document body.
///
/// # Examples
///
/// ```rust,no_run
/// use docsalvage::ole::doc::{ClxLayout, Package};
///
/// let bytes = std::fs::read("document.doc")?;
/// let package = Package::parse(&bytes)?;
/// let doc = package.document();
///
/// // Try every CLX layout
/// println!("{}", doc.text()?.text);
///
/// // Or a single one
/// println!("{}", doc.text_with_layout(ClxLayout::Standard)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Document<'p, 'a> {
    package: &'p Package<'a>,
}

impl<'p, 'a> Document<'p, 'a> {
    pub(crate) fn new(package: &'p Package<'a>) -> Self {
        Self { package }
    }

    /// Decode the body text, trying each layout in [`LAYOUT_ORDER`].
    ///
    /// The first layout that yields non-empty text wins. When every layout
    /// fails, the first layout's error is returned.
    pub fn text(&self) -> Result<StructuralText> {
        let mut first_error = None;

        for layout in LAYOUT_ORDER {
            match self.text_with_layout(layout) {
                Ok(text) => {
                    debug!(layout = layout.as_str(), chars = text.len(), "piece table decoded");
                    return Ok(StructuralText { text, layout });
                }
                Err(e) => {
                    debug!(layout = layout.as_str(), error = %e, "piece table layout failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        Err(first_error.unwrap_or(DocError::MissingClx))
    }

    /// Decode the body text using one CLX layout.
    pub fn text_with_layout(&self, layout: ClxLayout) -> Result<String> {
        let table = self.piece_table(layout)?;
        let fib = self.package.fib();
        let buffer = match layout {
            ClxLayout::Compact => self.package.compound_file().data(),
            ClxLayout::Standard => self.package.word_document(),
        };

        let text = decode_pieces(&table, buffer, fib.text_span());
        if text.is_empty() {
            return Err(DocError::NoText);
        }
        Ok(text)
    }

    /// Locate and parse the piece table for `layout`.
    pub fn piece_table(&self, layout: ClxLayout) -> Result<PieceTable> {
        let fib = self.package.fib();

        match layout {
            ClxLayout::Compact => {
                if fib.fc_clx == 0 || fib.lcb_clx == 0 {
                    return Err(DocError::MissingClx);
                }
                let stream = self.package.word_document();
                let offset = fib.fc_clx as usize;
                let region = stream.get(offset..).filter(|r| !r.is_empty()).ok_or(
                    DocError::ClxOutOfBounds {
                        offset,
                        len: fib.lcb_clx as usize,
                    },
                )?;
                PieceTable::parse(region, layout)
            }
            ClxLayout::Standard => {
                if !fib.is_word_document() {
                    return Err(DocError::UnknownIdent(fib.ident));
                }
                let (fc, lcb) = fib
                    .table_clx
                    .filter(|&(_, lcb)| lcb > 0)
                    .ok_or(DocError::MissingClx)?;
                let table_stream = self.package.table_stream()?;
                let (offset, len) = (fc as usize, lcb as usize);
                let region = offset
                    .checked_add(len)
                    .and_then(|end| table_stream.get(offset..end))
                    .ok_or(DocError::ClxOutOfBounds { offset, len })?;
                PieceTable::parse(region, layout)
            }
        }
    }
}
