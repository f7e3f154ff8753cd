//! Sector-chain reader for the subset of the compound file format needed to
//! reach a named stream.
//!
//! Every function takes the whole input as a borrowed slice; nothing here
//! keeps state between calls.
use super::consts::*;
use super::header::CfbHeader;
use crate::common::binary::{BinaryError, read_u32_le, utf16le_until_nul};
use fixedbitset::FixedBitSet;
use thiserror::Error;
use tracing::{debug, trace};
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw OLE directory entry structure (128 bytes)
///
/// This represents the on-disk format of a directory entry.
#[allow(dead_code)]
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; DIRENTRY_NAME_SIZE],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    /// Starting sector (offset 116)
    start_sector: U32<LE>,
    /// Stream size (offset 120)
    stream_size: U64<LE>,
}

/// A directory entry that matched a stream lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Entry name (UTF-16 decoded, up to the first null)
    pub name: String,
    /// First sector of the stream
    pub first_sector: u32,
    /// Declared size of the stream in bytes
    pub stream_size: usize,
    /// Stored in the mini stream: `first_sector` is a mini-sector index
    pub in_mini_stream: bool,
}

impl DirectoryEntry {
    fn from_raw(raw: &RawDirectoryEntry, header: &CfbHeader) -> Self {
        // 512-byte sector files only define the low 32 bits
        let stream_size = (raw.stream_size.get() & 0xFFFF_FFFF) as usize;
        Self {
            name: utf16le_until_nul(&raw.name),
            first_sector: raw.start_sector.get(),
            stream_size,
            in_mini_stream: raw.entry_type == STGTY_STREAM
                && stream_size < header.mini_stream_cutoff as usize,
        }
    }
}

/// Error types for compound-file parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OleError {
    /// The 8-byte signature does not match
    #[error("Not an OLE compound document")]
    NotCompoundDocument,
    /// The header is present but unusable
    #[error("Corrupted header: {0}")]
    CorruptedHeader(String),
    /// The master FAT names no FAT sector
    #[error("No FAT sectors declared")]
    NoFatSectors,
    /// A sector lies outside the file
    #[error("Sector {sector} at offset {offset} is beyond the end of the file")]
    SectorOutOfBounds { sector: u32, offset: usize },
    /// A chain points at a sector the FAT does not describe
    #[error("Invalid sector index {0} in FAT chain")]
    InvalidSector(u32),
    /// A chain is longer than the allowed maximum
    #[error("Sector chain from {start} exceeds {cap} sectors")]
    ChainTooLong { start: u32, cap: usize },
    /// A chain revisits a sector
    #[error("Sector chain revisits sector {sector}")]
    ChainCycle { sector: u32 },
    /// No directory entry matched
    #[error("Stream not found: {0}")]
    StreamNotFound(String),
    /// A stream declares a size the file cannot hold
    #[error("Corrupted stream {name}: {reason}")]
    CorruptedStream { name: String, reason: String },
    #[error(transparent)]
    Binary(#[from] BinaryError),
}

/// Slice out one full sector.
fn sector_bytes<'a>(
    data: &'a [u8],
    header: &CfbHeader,
    sector: u32,
) -> Result<&'a [u8], OleError> {
    let offset = header
        .sector_offset(sector)
        .ok_or(OleError::InvalidSector(sector))?;
    offset
        .checked_add(header.sector_size)
        .and_then(|end| data.get(offset..end))
        .ok_or(OleError::SectorOutOfBounds { sector, offset })
}

/// Read the File Allocation Table.
///
/// Reads up to 109 master-FAT slots from the header (stopping at the first
/// free or end-of-chain slot), then concatenates the `sector_size / 4`
/// little-endian entries of every referenced FAT sector.
pub fn read_fat(data: &[u8], header: &CfbHeader) -> Result<Vec<u32>, OleError> {
    let fat_sectors: Vec<u32> = header
        .difat
        .iter()
        .copied()
        .take_while(|&s| s != FREESECT && s != ENDOFCHAIN)
        .collect();

    if fat_sectors.is_empty() {
        return Err(OleError::NoFatSectors);
    }
    if header.fat_sector_count as usize != fat_sectors.len() {
        debug!(
            declared = header.fat_sector_count,
            found = fat_sectors.len(),
            "FAT sector count mismatch"
        );
    }

    let entries_per_sector = header.sector_size / 4;
    let mut fat = Vec::with_capacity(fat_sectors.len() * entries_per_sector);

    for &sector in &fat_sectors {
        let bytes = sector_bytes(data, header, sector)?;
        for i in 0..entries_per_sector {
            fat.push(read_u32_le(bytes, i * 4)?);
        }
    }

    Ok(fat)
}

/// Follow a sector chain from `start` until an end marker.
///
/// `ENDOFCHAIN` and `FREESECT` both terminate the chain. The result never
/// holds more than [`MAX_CHAIN_SECTORS`] entries: a longer chain is
/// [`OleError::ChainTooLong`] and a revisited sector is
/// [`OleError::ChainCycle`].
pub fn chain_sectors(fat: &[u32], start: u32) -> Result<Vec<u32>, OleError> {
    let mut sectors = Vec::new();
    let mut visited = FixedBitSet::with_capacity(fat.len());
    let mut current = start;

    while current != ENDOFCHAIN && current != FREESECT {
        if sectors.len() >= MAX_CHAIN_SECTORS {
            return Err(OleError::ChainTooLong {
                start,
                cap: MAX_CHAIN_SECTORS,
            });
        }
        if current > MAXREGSECT || current as usize >= fat.len() {
            return Err(OleError::InvalidSector(current));
        }
        if visited.contains(current as usize) {
            return Err(OleError::ChainCycle { sector: current });
        }
        visited.insert(current as usize);
        sectors.push(current);
        current = fat[current as usize];
    }

    Ok(sectors)
}

/// Scan the directory for the first entry whose name contains `name`.
///
/// The match is a case-sensitive substring test on the decoded name.
pub fn find_stream(
    data: &[u8],
    header: &CfbHeader,
    fat: &[u32],
    name: &str,
) -> Result<DirectoryEntry, OleError> {
    let dir_sectors = chain_sectors(fat, header.dir_first_sector)?;

    for sector in dir_sectors {
        let bytes = sector_bytes(data, header, sector)?;
        for raw in bytes.chunks_exact(DIRENTRY_SIZE) {
            let Ok(raw) = RawDirectoryEntry::read_from_bytes(raw) else {
                continue;
            };
            let entry = DirectoryEntry::from_raw(&raw, header);
            trace!(name = %entry.name, sector, "directory entry");
            if entry.name.contains(name) {
                return Ok(entry);
            }
        }
    }

    Err(OleError::StreamNotFound(name.to_string()))
}

/// The root storage entry, first in the directory; it owns the mini stream.
fn root_entry(data: &[u8], header: &CfbHeader) -> Result<DirectoryEntry, OleError> {
    let bytes = sector_bytes(data, header, header.dir_first_sector)?;
    let raw = bytes
        .get(..DIRENTRY_SIZE)
        .and_then(|raw| RawDirectoryEntry::read_from_bytes(raw).ok())
        .filter(|raw| raw.entry_type == STGTY_ROOT)
        .ok_or_else(|| OleError::StreamNotFound("Root Entry".to_string()))?;
    Ok(DirectoryEntry::from_raw(&raw, header))
}

/// Concatenate the sectors of a chain, stopping at `size` bytes.
fn collect_chain<'a>(
    sectors: &[u32],
    size: usize,
    mut sector: impl FnMut(u32) -> Result<&'a [u8], OleError>,
) -> Result<Vec<u8>, OleError> {
    let mut stream = Vec::with_capacity(size);

    for &id in sectors {
        let remaining = size - stream.len();
        if remaining == 0 {
            break;
        }
        let bytes = sector(id)?;
        stream.extend_from_slice(&bytes[..remaining.min(bytes.len())]);
    }

    Ok(stream)
}

/// Follow a mini-FAT chain through the root entry's mini stream.
fn read_mini_stream(
    data: &[u8],
    header: &CfbHeader,
    fat: &[u32],
    entry: &DirectoryEntry,
) -> Result<Vec<u8>, OleError> {
    let mini_size = header.mini_sector_size;
    if mini_size == 0 {
        return Err(OleError::CorruptedStream {
            name: entry.name.clone(),
            reason: "mini sector size is zero".to_string(),
        });
    }

    let minifat_chain = chain_sectors(fat, header.minifat_first_sector)?;
    let minifat_bytes = collect_chain(
        &minifat_chain,
        minifat_chain.len() * header.sector_size,
        |id| sector_bytes(data, header, id),
    )?;
    let minifat: Vec<u32> = minifat_bytes
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let mini_sectors = chain_sectors(&minifat, entry.first_sector)?;

    let root = root_entry(data, header)?;
    if root.stream_size > data.len() {
        return Err(OleError::CorruptedStream {
            name: root.name,
            reason: format!("mini stream size {} exceeds file size", root.stream_size),
        });
    }
    let container = read_regular_stream(data, header, fat, &root)?;
    let container: &[u8] = &container;

    collect_chain(&mini_sectors, entry.stream_size, move |id| {
        let offset = (id as usize).saturating_mul(mini_size);
        offset
            .checked_add(mini_size)
            .and_then(|end| container.get(offset..end))
            .ok_or(OleError::SectorOutOfBounds { sector: id, offset })
    })
}

fn read_regular_stream(
    data: &[u8],
    header: &CfbHeader,
    fat: &[u32],
    entry: &DirectoryEntry,
) -> Result<Vec<u8>, OleError> {
    collect_chain(
        &chain_sectors(fat, entry.first_sector)?,
        entry.stream_size,
        |id| sector_bytes(data, header, id),
    )
}

/// Copy a stream's sectors into a fresh buffer of its declared size.
///
/// Streams below the header's mini-stream cutoff are read through the
/// mini-FAT. A chain that ends early yields the bytes that were actually
/// present.
pub fn read_stream(
    data: &[u8],
    header: &CfbHeader,
    fat: &[u32],
    entry: &DirectoryEntry,
) -> Result<Vec<u8>, OleError> {
    if entry.stream_size > data.len() {
        return Err(OleError::CorruptedStream {
            name: entry.name.clone(),
            reason: format!(
                "declared size {} exceeds file size {}",
                entry.stream_size,
                data.len()
            ),
        });
    }

    let stream = if entry.in_mini_stream {
        read_mini_stream(data, header, fat, entry)?
    } else {
        read_regular_stream(data, header, fat, entry)?
    };

    if stream.len() < entry.stream_size {
        debug!(
            stream = %entry.name,
            declared = entry.stream_size,
            read = stream.len(),
            "sector chain ended before declared stream size"
        );
    }

    Ok(stream)
}

/// Check whether `data` starts with the compound-file signature.
#[inline]
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MAGIC.len() && &data[..MAGIC.len()] == MAGIC
}

/// A parsed compound-file view: validated header plus FAT, borrowing the input.
#[derive(Debug)]
pub struct CompoundFile<'a> {
    data: &'a [u8],
    header: CfbHeader,
    fat: Vec<u32>,
}

impl<'a> CompoundFile<'a> {
    /// Validate the header and load the FAT.
    pub fn parse(data: &'a [u8]) -> Result<Self, OleError> {
        let header = CfbHeader::parse(data)?;
        let fat = read_fat(data, &header)?;
        Ok(Self { data, header, fat })
    }

    #[inline]
    pub fn header(&self) -> &CfbHeader {
        &self.header
    }

    #[inline]
    pub fn fat(&self) -> &[u32] {
        &self.fat
    }

    /// Whole input buffer.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn find_stream(&self, name: &str) -> Result<DirectoryEntry, OleError> {
        find_stream(self.data, &self.header, &self.fat, name)
    }

    /// Locate a stream by name and read it.
    pub fn open_stream(&self, name: &str) -> Result<Vec<u8>, OleError> {
        let entry = self.find_stream(name)?;
        read_stream(self.data, &self.header, &self.fat, &entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DocBuilder;
    use proptest::prelude::*;

    #[test]
    fn test_chain_follows_fat() {
        let fat = vec![1, 2, ENDOFCHAIN, FREESECT];
        assert_eq!(chain_sectors(&fat, 0).unwrap(), vec![0, 1, 2]);
        assert_eq!(chain_sectors(&fat, ENDOFCHAIN).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_free_sector_terminates_chain() {
        let fat = vec![FREESECT];
        assert_eq!(chain_sectors(&fat, 0).unwrap(), vec![0]);
    }

    #[test]
    fn test_cyclic_chain_is_corruption() {
        let fat = vec![1, 2, 0];
        assert_eq!(
            chain_sectors(&fat, 0),
            Err(OleError::ChainCycle { sector: 0 })
        );
        let self_loop = vec![0];
        assert!(chain_sectors(&self_loop, 0).is_err());
    }

    #[test]
    fn test_overlong_chain_is_corruption() {
        let mut fat: Vec<u32> = (1..=1500).collect();
        fat.push(ENDOFCHAIN);
        assert_eq!(
            chain_sectors(&fat, 0),
            Err(OleError::ChainTooLong {
                start: 0,
                cap: MAX_CHAIN_SECTORS
            })
        );
    }

    #[test]
    fn test_pointer_outside_fat() {
        let fat = vec![7];
        assert_eq!(chain_sectors(&fat, 0), Err(OleError::InvalidSector(7)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_chain_is_bounded(
            fat in proptest::collection::vec(
                prop_oneof![
                    0u32..2000,
                    Just(ENDOFCHAIN),
                    Just(FREESECT),
                    any::<u32>(),
                ],
                0..2000,
            ),
            start in 0u32..2000,
        ) {
            if let Ok(chain) = chain_sectors(&fat, start) {
                prop_assert!(chain.len() <= MAX_CHAIN_SECTORS);
            }
        }
    }

    #[test]
    fn test_finds_and_reads_word_stream() {
        let data = DocBuilder::new().text_piece("Hello, world.").build();
        let cfb = CompoundFile::parse(&data).unwrap();
        let entry = cfb.find_stream(WORD_DOCUMENT_STREAM).unwrap();
        assert_eq!(entry.name, "WordDocument");
        assert_eq!(entry.first_sector, 2);

        let stream = cfb.open_stream(WORD_DOCUMENT_STREAM).unwrap();
        assert_eq!(stream.len(), entry.stream_size);
        // FIB identifier at the start of the stream
        assert_eq!(&stream[..2], &[0xEC, 0xA5]);
    }

    #[test]
    fn test_missing_stream() {
        let data = DocBuilder::new().text_piece("Hello, world.").build();
        let cfb = CompoundFile::parse(&data).unwrap();
        assert_eq!(
            cfb.find_stream("PowerPoint Document"),
            Err(OleError::StreamNotFound("PowerPoint Document".to_string()))
        );
    }

    #[test]
    fn test_zero_fat_sectors() {
        let mut data = DocBuilder::new().text_piece("Hello, world.").build();
        data[76..80].copy_from_slice(&FREESECT.to_le_bytes());
        let header = CfbHeader::parse(&data).unwrap();
        assert_eq!(read_fat(&data, &header), Err(OleError::NoFatSectors));
    }

    #[test]
    fn test_cyclic_directory_chain_does_not_hang() {
        let mut data = DocBuilder::new().text_piece("Hello, world.").build();
        // FAT entry for the directory sector (1) points back at itself.
        data[512 + 4..512 + 8].copy_from_slice(&1u32.to_le_bytes());
        let cfb = CompoundFile::parse(&data).unwrap();
        assert_eq!(
            cfb.find_stream(WORD_DOCUMENT_STREAM),
            Err(OleError::ChainCycle { sector: 1 })
        );
    }

    #[test]
    fn test_oversized_stream_is_rejected() {
        let data = DocBuilder::new().text_piece("Hello, world.").build();
        let cfb = CompoundFile::parse(&data).unwrap();
        let mut entry = cfb.find_stream(WORD_DOCUMENT_STREAM).unwrap();
        entry.stream_size = data.len() + 1;
        assert!(matches!(
            read_stream(&data, cfb.header(), cfb.fat(), &entry),
            Err(OleError::CorruptedStream { .. })
        ));
    }

    #[test]
    fn test_short_chain_truncates_stream() {
        let mut data = DocBuilder::new().text_piece("Hello, world.").build();
        // end the WordDocument chain after its second sector (2 -> 3 -> end)
        data[512 + 3 * 4..512 + 4 * 4].copy_from_slice(&ENDOFCHAIN.to_le_bytes());
        let cfb = CompoundFile::parse(&data).unwrap();
        let entry = cfb.find_stream(WORD_DOCUMENT_STREAM).unwrap();
        assert_eq!(entry.stream_size, 4096);

        let stream = cfb.open_stream(WORD_DOCUMENT_STREAM).unwrap();
        assert_eq!(stream.len(), 1024);
        assert_eq!(&stream[..2], &[0xEC, 0xA5]);
    }

    #[test]
    fn test_fat_sector_past_end_of_file() {
        let mut data = DocBuilder::new().text_piece("Hello, world.").build();
        data[76..80].copy_from_slice(&1000u32.to_le_bytes());
        let header = CfbHeader::parse(&data).unwrap();
        assert_eq!(
            read_fat(&data, &header),
            Err(OleError::SectorOutOfBounds {
                sector: 1000,
                offset: 1001 * 512
            })
        );
    }

    #[test]
    fn test_small_stream_reads_through_mini_fat() {
        let data = DocBuilder::new()
            .standard_layout()
            .text_piece("Hello, world.")
            .build();
        let cfb = CompoundFile::parse(&data).unwrap();

        let word = cfb.find_stream(WORD_DOCUMENT_STREAM).unwrap();
        assert!(!word.in_mini_stream);
        let table = cfb.find_stream(TABLE_STREAM_1).unwrap();
        assert!(table.in_mini_stream);
        assert_eq!(table.first_sector, 0);

        let stream = cfb.open_stream(TABLE_STREAM_1).unwrap();
        assert_eq!(stream.len(), table.stream_size);
        // CLX piece-table block tag
        assert_eq!(stream[0], 0x02);
    }

    #[test]
    fn test_mini_stream_without_mini_fat_is_an_error() {
        let data = DocBuilder::new().text_piece("Hello, world.").build();
        let cfb = CompoundFile::parse(&data).unwrap();
        // sector 1 is the directory in the regular FAT; as a mini sector it
        // has no mini-FAT entry
        let entry = DirectoryEntry {
            name: TABLE_STREAM_1.to_string(),
            first_sector: 1,
            stream_size: 100,
            in_mini_stream: true,
        };
        assert_eq!(
            read_stream(&data, cfb.header(), cfb.fat(), &entry),
            Err(OleError::InvalidSector(1))
        );
    }
}
