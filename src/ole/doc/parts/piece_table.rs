/// Piece table (CLX) parser.
///
/// The CLX is a tagged sequence of blocks: zero or more property blocks
/// (tag `0x01`) followed by the piece-table block (tag `0x02`). The piece
/// table itself is a PLCF of character positions with one 8-byte piece
/// descriptor per piece.
///
/// Two encodings of the CLX are understood; see [`ClxLayout`].
use super::super::package::{DocError, Result};
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::ole::plcf::Plcf;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Size of a piece descriptor in bytes
pub const PIECE_DESCRIPTOR_SIZE: usize = 8;

/// Tag of a property (grpprl) block
const TAG_PRC: u8 = 0x01;
/// Tag of the piece-table block
const TAG_PCDT: u8 = 0x02;

/// Bit 30 of a descriptor's offset: set means single-byte text
const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3FFF_FFFF;

/// How a CLX region is encoded and what its piece offsets address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClxLayout {
    /// CLX inside the WordDocument stream at FIB offset 154. Property
    /// blocks carry a 4-byte length, the descriptor offset is its first
    /// field, and offsets address the whole input file.
    Compact,
    /// CLX in the table stream via FibRgFcLcb slot 33. Property blocks carry
    /// a 2-byte length, the descriptor offset follows a 2-byte flags word,
    /// single-byte offsets are stored doubled, and offsets address the
    /// WordDocument stream.
    Standard,
}

impl ClxLayout {
    #[inline]
    fn prc_length_width(self) -> usize {
        match self {
            ClxLayout::Compact => 4,
            ClxLayout::Standard => 2,
        }
    }

    #[inline]
    fn fc_field_offset(self) -> usize {
        match self {
            ClxLayout::Compact => 0,
            ClxLayout::Standard => 2,
        }
    }

    /// Human-readable name used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ClxLayout::Compact => "compact",
            ClxLayout::Standard => "standard",
        }
    }
}

/// One piece: a CP range and where its characters are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPiece {
    /// Start character position (CP)
    pub cp_start: u32,
    /// End character position (CP), exclusive
    pub cp_end: u32,
    /// Byte offset of the first character in the addressed buffer
    pub offset: usize,
    /// UTF-16LE (2 bytes/char) when true, single-byte otherwise
    pub is_unicode: bool,
}

impl TextPiece {
    /// Character count, or `None` when the CP range is inverted.
    #[inline]
    pub fn char_count(&self) -> Option<u32> {
        self.cp_end.checked_sub(self.cp_start)
    }

    /// Bytes per stored character.
    #[inline]
    pub fn width(&self) -> usize {
        if self.is_unicode { 2 } else { 1 }
    }
}

/// Parsed piece table, pieces kept in storage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceTable {
    layout: ClxLayout,
    pieces: Vec<TextPiece>,
}

impl PieceTable {
    /// Walk the CLX at the start of `clx` and parse its piece table.
    ///
    /// Property blocks are skipped. Running past the end of the region
    /// before a piece-table block is [`DocError::PieceTableNotFound`]; any
    /// tag other than `0x01`/`0x02` is [`DocError::UnexpectedClxTag`].
    pub fn parse(clx: &[u8], layout: ClxLayout) -> Result<Self> {
        let mut offset = 0usize;

        loop {
            let Some(&tag) = clx.get(offset) else {
                return Err(DocError::PieceTableNotFound);
            };
            match tag {
                TAG_PRC => {
                    let width = layout.prc_length_width();
                    let size = match width {
                        2 => read_u16_le(clx, offset + 1).map(usize::from),
                        _ => read_u32_le(clx, offset + 1).map(|v| v as usize),
                    }
                    .map_err(|_| DocError::PieceTableNotFound)?;
                    trace!(offset, size, "skipping CLX property block");
                    offset = offset
                        .checked_add(1 + width)
                        .and_then(|o| o.checked_add(size))
                        .ok_or(DocError::PieceTableNotFound)?;
                }
                TAG_PCDT => {
                    let lcb = read_u32_le(clx, offset + 1)
                        .map_err(|_| DocError::PieceTableNotFound)?
                        as usize;
                    let start = offset + 5;
                    let plcf_bytes = start
                        .checked_add(lcb)
                        .and_then(|end| clx.get(start..end))
                        .ok_or(DocError::ClxOutOfBounds {
                            offset: start,
                            len: lcb,
                        })?;
                    return Self::from_plcf(plcf_bytes, layout);
                }
                other => {
                    return Err(DocError::UnexpectedClxTag { tag: other, offset });
                }
            }
        }
    }

    fn from_plcf(data: &[u8], layout: ClxLayout) -> Result<Self> {
        let plcf = Plcf::parse(data, PIECE_DESCRIPTOR_SIZE).ok_or(DocError::EmptyPieceTable)?;
        if plcf.count() == 0 {
            return Err(DocError::EmptyPieceTable);
        }

        let mut pieces = Vec::with_capacity(plcf.count());
        for i in 0..plcf.count() {
            let (Some((cp_start, cp_end)), Some(descriptor)) = (plcf.range(i), plcf.property(i))
            else {
                continue;
            };
            let raw = read_u32_le(descriptor, layout.fc_field_offset())?;
            let is_unicode = (raw & FC_COMPRESSED) == 0;
            let fc = raw & FC_MASK;
            let fc = match (layout, is_unicode) {
                (ClxLayout::Standard, false) => fc / 2,
                _ => fc,
            };

            pieces.push(TextPiece {
                cp_start,
                cp_end,
                offset: fc as usize,
                is_unicode,
            });
        }

        Ok(Self { layout, pieces })
    }

    #[inline]
    pub fn layout(&self) -> ClxLayout {
        self.layout
    }

    /// Pieces in the order they are stored in the table.
    #[inline]
    pub fn pieces(&self) -> &[TextPiece] {
        &self.pieces
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Pieces sorted by ascending `cp_start` (document reading order).
    pub fn pieces_in_order(&self) -> Vec<&TextPiece> {
        let mut ordered: Vec<&TextPiece> = self.pieces.iter().collect();
        ordered.sort_by_key(|p| p.cp_start);
        ordered
    }
}
