/// Piece text decoding.
///
/// Each piece is decoded on its own and then joined in CP order. Decoding
/// never fails as a whole: a piece whose bytes cannot be addressed safely is
/// skipped and the rest of the document still comes through.
use super::piece_table::{PieceTable, TextPiece};
use tracing::debug;

/// Separator placed between decoded pieces
pub const PIECE_SEPARATOR: &str = "\n\n";

/// Map one stored character to its contribution to the text.
///
/// Printable ASCII passes through, the paragraph mark (CR) becomes a newline,
/// tab stays a tab. Every other unit, including LF and Word's field and cell
/// marks, contributes nothing.
#[inline]
pub fn piece_char(unit: u16) -> Option<char> {
    match unit {
        0x20..=0x7E => Some(unit as u8 as char),
        0x0D => Some('\n'),
        0x09 => Some('\t'),
        _ => None,
    }
}

/// Decode one piece from `buffer`.
///
/// `max_chars` is the FIB's declared text span (`fcMac - fcMin`), when
/// there is one. Returns `None` when the CP range is inverted, exceeds that
/// span, or the byte range falls outside `buffer`.
pub fn decode_piece(piece: &TextPiece, buffer: &[u8], max_chars: Option<u32>) -> Option<String> {
    let Some(chars) = piece.char_count() else {
        debug!(
            cp_start = piece.cp_start,
            cp_end = piece.cp_end,
            "skipping piece with inverted CP range"
        );
        return None;
    };
    if let Some(limit) = max_chars
        && chars > limit
    {
        debug!(chars, limit, "skipping piece longer than the FIB text span");
        return None;
    }

    let width = piece.width();
    let Some(bytes) = (chars as usize)
        .checked_mul(width)
        .and_then(|len| piece.offset.checked_add(len))
        .and_then(|end| buffer.get(piece.offset..end))
    else {
        debug!(
            offset = piece.offset,
            chars,
            buffer_len = buffer.len(),
            "skipping piece outside the buffer"
        );
        return None;
    };

    let text = if piece.is_unicode {
        bytes
            .chunks_exact(2)
            .filter_map(|pair| piece_char(u16::from_le_bytes([pair[0], pair[1]])))
            .collect()
    } else {
        bytes.iter().filter_map(|&b| piece_char(b as u16)).collect()
    };
    Some(text)
}

/// Decode every piece in CP order and join the non-empty results.
///
/// Each piece's text is trimmed before joining; pieces that decode to
/// nothing are dropped.
pub fn decode_pieces(table: &PieceTable, buffer: &[u8], max_chars: Option<u32>) -> String {
    table
        .pieces_in_order()
        .into_iter()
        .filter_map(|piece| decode_piece(piece, buffer, max_chars))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(PIECE_SEPARATOR)
}
