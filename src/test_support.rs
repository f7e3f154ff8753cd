//! Synthetic Word documents for unit tests.
//!
//! [`DocBuilder`] lays out a minimal 512-byte-sector compound file:
//!
//! - sector 0: the FAT
//! - sector 1: the directory (`Root Entry`, the Word stream, optional table stream)
//! - sector 2 onward: the `WordDocument` stream, padded to the mini-stream
//!   cutoff like Word does
//! - with the standard layout: one mini-FAT sector, then the mini stream
//!   holding `1Table`
//!
//! Inside `WordDocument` the FIB sits at 0, the compact CLX at [`CLX_AT`] and
//! the piece text at [`TEXT_AT`].
use crate::ole::consts::*;

const SECTOR: usize = 512;
const MINI_SECTOR: usize = 64;
const MINI_STREAM_CUTOFF: usize = 4096;
const FATSECT: u32 = 0xFFFF_FFFD;
const NOSTREAM: u32 = 0xFFFF_FFFF;

/// Stream offset of the compact CLX
pub const CLX_AT: usize = 512;
/// Stream offset of the first text byte (fcMin)
pub const TEXT_AT: usize = 1024;
/// File offset of the `WordDocument` stream (sector 2)
pub const STREAM_AT: usize = 3 * SECTOR;

#[derive(Debug, Clone)]
struct Piece {
    bytes: Vec<u8>,
    chars: u32,
    is_unicode: bool,
}

/// Builder for a compound file holding one Word body.
#[derive(Debug, Clone)]
pub struct DocBuilder {
    pieces: Vec<Piece>,
    cps: Option<Vec<u32>>,
    stream_name: String,
    ident: u16,
    prc_blocks: Vec<Vec<u8>>,
    standard: bool,
    raw_offsets: Vec<(usize, u32)>,
}

impl Default for DocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocBuilder {
    pub fn new() -> Self {
        Self {
            pieces: Vec::new(),
            cps: None,
            stream_name: WORD_DOCUMENT_STREAM.to_string(),
            ident: 0xA5EC,
            prc_blocks: Vec::new(),
            standard: false,
            raw_offsets: Vec::new(),
        }
    }

    /// Append a UTF-16LE piece.
    pub fn text_piece(mut self, text: &str) -> Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.pieces.push(Piece {
            bytes: units.iter().flat_map(|u| u.to_le_bytes()).collect(),
            chars: units.len() as u32,
            is_unicode: true,
        });
        self
    }

    /// Append a single-byte piece.
    pub fn ansi_piece(mut self, text: &str) -> Self {
        self.pieces.push(Piece {
            bytes: text.as_bytes().to_vec(),
            chars: text.len() as u32,
            is_unicode: false,
        });
        self
    }

    /// Override the CP array (must hold `pieces + 1` entries).
    pub fn cps(mut self, cps: Vec<u32>) -> Self {
        self.cps = Some(cps);
        self
    }

    /// Rename the Word stream's directory entry.
    pub fn stream_name(mut self, name: &str) -> Self {
        self.stream_name = name.to_string();
        self
    }

    pub fn ident(mut self, ident: u16) -> Self {
        self.ident = ident;
        self
    }

    /// Insert a property block before the piece table.
    pub fn prc_block(mut self, bytes: &[u8]) -> Self {
        self.prc_blocks.push(bytes.to_vec());
        self
    }

    /// Put the CLX in `1Table` (FibRgFcLcb slot 33) and leave the compact
    /// fields empty.
    pub fn standard_layout(mut self) -> Self {
        self.standard = true;
        self
    }

    /// Replace the stored offset word of piece `index`.
    pub fn raw_descriptor_offset(mut self, index: usize, raw: u32) -> Self {
        self.raw_offsets.push((index, raw));
        self
    }

    fn piece_offsets(&self) -> Vec<u32> {
        let mut cursor = 0usize;
        let mut offsets = Vec::with_capacity(self.pieces.len());
        for piece in &self.pieces {
            let stream_offset = TEXT_AT + cursor;
            let raw = match (self.standard, piece.is_unicode) {
                (false, true) => (STREAM_AT + stream_offset) as u32,
                (false, false) => (STREAM_AT + stream_offset) as u32 | 0x4000_0000,
                (true, true) => stream_offset as u32,
                (true, false) => (stream_offset as u32 * 2) | 0x4000_0000,
            };
            offsets.push(raw);
            cursor += piece.bytes.len();
        }
        for &(index, raw) in &self.raw_offsets {
            offsets[index] = raw;
        }
        offsets
    }

    fn clx(&self) -> Vec<u8> {
        let cps = self.cps.clone().unwrap_or_else(|| {
            let mut cps = vec![0u32];
            for piece in &self.pieces {
                let last = cps[cps.len() - 1];
                cps.push(last + piece.chars);
            }
            cps
        });

        let mut plcf = Vec::new();
        for cp in &cps {
            plcf.extend_from_slice(&cp.to_le_bytes());
        }
        for raw in self.piece_offsets() {
            if self.standard {
                plcf.extend_from_slice(&0u16.to_le_bytes());
                plcf.extend_from_slice(&raw.to_le_bytes());
                plcf.extend_from_slice(&0u16.to_le_bytes());
            } else {
                plcf.extend_from_slice(&raw.to_le_bytes());
                plcf.extend_from_slice(&0u32.to_le_bytes());
            }
        }

        let mut clx = Vec::new();
        for block in &self.prc_blocks {
            clx.push(0x01);
            if self.standard {
                clx.extend_from_slice(&(block.len() as u16).to_le_bytes());
            } else {
                clx.extend_from_slice(&(block.len() as u32).to_le_bytes());
            }
            clx.extend_from_slice(block);
        }
        clx.push(0x02);
        clx.extend_from_slice(&(plcf.len() as u32).to_le_bytes());
        clx.extend_from_slice(&plcf);
        clx
    }

    fn word_document(&self, clx: &[u8]) -> Vec<u8> {
        let text: Vec<u8> = self.pieces.iter().flat_map(|p| p.bytes.clone()).collect();
        let mut stream = vec![0u8; (TEXT_AT + text.len()).max(MINI_STREAM_CUTOFF)];

        put_u16(&mut stream, 0, self.ident);
        put_u16(&mut stream, 2, 0x00C1);
        put_u16(&mut stream, 10, if self.standard { 0x0200 } else { 0 });
        put_u32(&mut stream, 24, TEXT_AT as u32);
        put_u32(&mut stream, 28, (TEXT_AT + text.len()) as u32);

        if self.standard {
            put_u32(&mut stream, 418, 0);
            put_u32(&mut stream, 422, clx.len() as u32);
        } else {
            assert!(CLX_AT + clx.len() <= TEXT_AT, "CLX overflows into text");
            put_u32(&mut stream, 154, CLX_AT as u32);
            put_u32(&mut stream, 158, clx.len() as u32);
            stream[CLX_AT..CLX_AT + clx.len()].copy_from_slice(clx);
        }

        stream[TEXT_AT..TEXT_AT + text.len()].copy_from_slice(&text);
        stream
    }

    /// Assemble the compound file.
    pub fn build(&self) -> Vec<u8> {
        let clx = self.clx();
        let word_document = self.word_document(&clx);
        let table_stream = if self.standard { Some(clx) } else { None };

        let wd_sectors = word_document.len().div_ceil(SECTOR);
        let mini_sectors = table_stream
            .as_ref()
            .map_or(0, |t| t.len().div_ceil(MINI_SECTOR));
        let minifat_sector = 2 + wd_sectors;
        let container_first = minifat_sector + 1;
        let container_sectors = (mini_sectors * MINI_SECTOR).div_ceil(SECTOR);
        let total_sectors = if table_stream.is_some() {
            container_first + container_sectors
        } else {
            minifat_sector
        };
        assert!(total_sectors <= SECTOR / 4, "document too large for one FAT sector");
        assert!(mini_sectors <= SECTOR / 4, "table too large for one mini-FAT sector");

        let mut data = vec![0u8; HEADER_SIZE + total_sectors * SECTOR];

        // Header
        data[..8].copy_from_slice(MAGIC);
        put_u16(&mut data, 24, 0x003E);
        put_u16(&mut data, 26, 3);
        put_u16(&mut data, 28, 0xFFFE);
        put_u16(&mut data, 30, 9);
        put_u16(&mut data, 32, 6);
        put_u32(&mut data, 44, 1);
        put_u32(&mut data, 48, 1);
        put_u32(&mut data, 56, MINI_STREAM_CUTOFF as u32);
        if table_stream.is_some() {
            put_u32(&mut data, 60, minifat_sector as u32);
            put_u32(&mut data, 64, 1);
        } else {
            put_u32(&mut data, 60, ENDOFCHAIN);
        }
        put_u32(&mut data, 68, ENDOFCHAIN);
        put_u32(&mut data, 76, 0);
        for slot in 1..HEADER_DIFAT_ENTRIES {
            put_u32(&mut data, 76 + slot * 4, FREESECT);
        }

        // FAT
        let mut fat = vec![FREESECT; SECTOR / 4];
        fat[0] = FATSECT;
        fat[1] = ENDOFCHAIN;
        link_chain(&mut fat, 2, wd_sectors);
        if table_stream.is_some() {
            link_chain(&mut fat, minifat_sector, 1);
            link_chain(&mut fat, container_first, container_sectors);
        }
        write_u32s(&mut data, HEADER_SIZE, &fat);

        // Directory
        let dir = 2 * SECTOR;
        let (root_start, root_size) = if table_stream.is_some() {
            (container_first as u32, mini_sectors * MINI_SECTOR)
        } else {
            (ENDOFCHAIN, 0)
        };
        write_dir_entry(&mut data, dir, "Root Entry", 5, root_start, root_size);
        write_dir_entry(
            &mut data,
            dir + DIRENTRY_SIZE,
            &self.stream_name,
            2,
            2,
            word_document.len(),
        );

        // Streams
        data[STREAM_AT..STREAM_AT + word_document.len()].copy_from_slice(&word_document);
        if let Some(table) = &table_stream {
            write_dir_entry(
                &mut data,
                dir + 2 * DIRENTRY_SIZE,
                TABLE_STREAM_1,
                2,
                0,
                table.len(),
            );

            let mut minifat = vec![FREESECT; SECTOR / 4];
            link_chain(&mut minifat, 0, mini_sectors);
            write_u32s(&mut data, HEADER_SIZE + minifat_sector * SECTOR, &minifat);

            let at = HEADER_SIZE + container_first * SECTOR;
            data[at..at + table.len()].copy_from_slice(table);
        }

        data
    }
}

fn link_chain(fat: &mut [u32], first: usize, count: usize) {
    for i in 0..count {
        let sector = first + i;
        fat[sector] = if i + 1 == count {
            ENDOFCHAIN
        } else {
            (sector + 1) as u32
        };
    }
}

fn write_dir_entry(
    data: &mut [u8],
    at: usize,
    name: &str,
    entry_type: u8,
    start: u32,
    size: usize,
) {
    let units: Vec<u16> = name.encode_utf16().collect();
    for (i, unit) in units.iter().enumerate() {
        put_u16(data, at + i * 2, *unit);
    }
    put_u16(data, at + 64, ((units.len() + 1) * 2) as u16);
    data[at + 66] = entry_type;
    data[at + 67] = 1;
    put_u32(data, at + 68, NOSTREAM);
    put_u32(data, at + 72, NOSTREAM);
    put_u32(data, at + 76, NOSTREAM);
    put_u32(data, at + 116, start);
    data[at + 120..at + 128].copy_from_slice(&(size as u64).to_le_bytes());
}

fn write_u32s(data: &mut [u8], at: usize, values: &[u32]) {
    for (i, value) in values.iter().enumerate() {
        put_u32(data, at + i * 4, *value);
    }
}

fn put_u16(data: &mut [u8], at: usize, value: u16) {
    data[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(data: &mut [u8], at: usize, value: u32) {
    data[at..at + 4].copy_from_slice(&value.to_le_bytes());
}
