/// File Information Block (FIB) reader.
///
/// The FIB sits at offset 0 of the WordDocument stream. Only the fields the
/// text path needs are read, each as a fixed-offset little-endian integer:
///
/// - Bytes 0-1: wIdent (0xA5EC for Word 97 and later)
/// - Bytes 2-3: nFib (version)
/// - Bytes 10-11: flags (bit 8 encrypted, bit 9 selects 1Table)
/// - Bytes 24-27 / 28-31: fcMin / fcMac (text boundaries)
/// - Bytes 154-157 / 158-161: fcClx / lcbClx (compact CLX location)
/// - Bytes 418-425: FibRgFcLcb slot 33, the CLX location in the table stream
use super::super::package::{DocError, Result};
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::ole::consts::{TABLE_STREAM_0, TABLE_STREAM_1};

/// wIdent of a Word 97+ document body
pub const WORD_IDENT: u16 = 0xA5EC;

/// Bytes needed to read every compact field
const COMPACT_FIB_SIZE: usize = 162;

/// Start of the FibRgFcLcb array and the slot holding fcClx/lcbClx
const RG_FC_LCB_BASE: usize = 154;
const CLX_SLOT: usize = 33;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fib {
    pub ident: u16,
    pub version: u16,
    pub flags: u16,
    pub fc_min: u32,
    pub fc_mac: u32,
    pub fc_clx: u32,
    pub lcb_clx: u32,
    /// fcClx/lcbClx from FibRgFcLcb slot 33, when the stream is long enough
    pub table_clx: Option<(u32, u32)>,
}

impl Fib {
    /// Read the FIB from the start of the WordDocument stream.
    ///
    /// Only bounds are checked. A wrong identifier is kept as-is; see
    /// [`Fib::is_word_document`].
    pub fn parse(word_document: &[u8]) -> Result<Self> {
        if word_document.len() < COMPACT_FIB_SIZE {
            return Err(DocError::FibTooShort(word_document.len()));
        }

        let slot = RG_FC_LCB_BASE + CLX_SLOT * 8;
        let table_clx = match (
            read_u32_le(word_document, slot),
            read_u32_le(word_document, slot + 4),
        ) {
            (Ok(fc), Ok(lcb)) => Some((fc, lcb)),
            _ => None,
        };

        Ok(Self {
            ident: read_u16_le(word_document, 0)?,
            version: read_u16_le(word_document, 2)?,
            flags: read_u16_le(word_document, 10)?,
            fc_min: read_u32_le(word_document, 24)?,
            fc_mac: read_u32_le(word_document, 28)?,
            fc_clx: read_u32_le(word_document, 154)?,
            lcb_clx: read_u32_le(word_document, 158)?,
            table_clx,
        })
    }

    /// Whether the identifier is the Word 97+ magic.
    #[inline]
    pub fn is_word_document(&self) -> bool {
        self.ident == WORD_IDENT
    }

    /// fEncrypted, bit 8 of the flags word.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        (self.flags & 0x0100) != 0
    }

    /// Table stream selected by fWhichTblStm (bit 9).
    #[inline]
    pub fn table_stream_name(&self) -> &'static str {
        if (self.flags & 0x0200) != 0 {
            TABLE_STREAM_1
        } else {
            TABLE_STREAM_0
        }
    }

    /// Length of the declared text range, if `fcMac > fcMin`.
    #[inline]
    pub fn text_span(&self) -> Option<u32> {
        self.fc_mac.checked_sub(self.fc_min).filter(|&span| span > 0)
    }
}
