//! Compound File Binary Format header.
use super::consts::*;
use super::file::OleError;
use zerocopy::{FromBytes, LE, U16, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw on-disk header (512 bytes).
#[allow(dead_code)]
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawHeader {
    /// Magic signature
    signature: [u8; 8],
    /// Reserved class ID
    clsid: [u8; 16],
    minor_version: U16<LE>,
    major_version: U16<LE>,
    byte_order: U16<LE>,
    /// Sector size as a power of two (offset 30)
    sector_shift: U16<LE>,
    /// Mini sector size as a power of two (offset 32)
    mini_sector_shift: U16<LE>,
    reserved: [u8; 6],
    num_dir_sectors: U32<LE>,
    /// Number of FAT sectors (offset 44)
    num_fat_sectors: U32<LE>,
    /// First directory sector (offset 48)
    first_dir_sector: U32<LE>,
    transaction_signature: U32<LE>,
    mini_stream_cutoff: U32<LE>,
    /// First mini-FAT sector (offset 60)
    first_minifat_sector: U32<LE>,
    num_minifat_sectors: U32<LE>,
    first_difat_sector: U32<LE>,
    num_difat_sectors: U32<LE>,
    /// Master FAT: the first 109 FAT sector IDs (offset 76)
    difat: [U32<LE>; HEADER_DIFAT_ENTRIES],
}

/// Validated compound-file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfbHeader {
    /// Sector size in bytes (`2^sector_shift`)
    pub sector_size: usize,
    /// Mini sector size in bytes (`2^mini_sector_shift`)
    pub mini_sector_size: usize,
    /// Number of FAT sectors declared by the header
    pub fat_sector_count: u32,
    /// First sector of the directory chain
    pub dir_first_sector: u32,
    /// Streams smaller than this live in the mini stream
    pub mini_stream_cutoff: u32,
    /// First sector of the mini-FAT chain
    pub minifat_first_sector: u32,
    /// First FAT sector (master-FAT slot 0)
    pub fat_first_sector: u32,
    /// Master-FAT slots in header order
    pub difat: Vec<u32>,
}

impl CfbHeader {
    /// Parse and validate the header at the start of `data`.
    ///
    /// Fails with [`OleError::NotCompoundDocument`] when the 8-byte signature
    /// does not match; no partial header is ever returned.
    pub fn parse(data: &[u8]) -> Result<Self, OleError> {
        if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
            return Err(OleError::NotCompoundDocument);
        }
        let raw = data
            .get(..HEADER_SIZE)
            .and_then(|bytes| RawHeader::read_from_bytes(bytes).ok())
            .ok_or_else(|| {
                OleError::CorruptedHeader(format!(
                    "header needs {} bytes, file has {}",
                    HEADER_SIZE,
                    data.len()
                ))
            })?;

        let sector_shift = raw.sector_shift.get();
        if !(MIN_SECTOR_SHIFT..=MAX_SECTOR_SHIFT).contains(&sector_shift) {
            return Err(OleError::CorruptedHeader(format!(
                "sector shift {} out of range",
                sector_shift
            )));
        }
        let mini_sector_size = 1usize
            .checked_shl(raw.mini_sector_shift.get() as u32)
            .unwrap_or(0);

        let difat: Vec<u32> = raw.difat.iter().map(|v| v.get()).collect();

        Ok(Self {
            sector_size: 1usize << sector_shift,
            mini_sector_size,
            fat_sector_count: raw.num_fat_sectors.get(),
            dir_first_sector: raw.first_dir_sector.get(),
            mini_stream_cutoff: raw.mini_stream_cutoff.get(),
            minifat_first_sector: raw.first_minifat_sector.get(),
            fat_first_sector: difat[0],
            difat,
        })
    }

    /// Byte offset of sector `sector` in the file.
    ///
    /// The header occupies the slot before sector 0.
    #[inline]
    pub fn sector_offset(&self, sector: u32) -> Option<usize> {
        (sector as usize)
            .checked_add(1)?
            .checked_mul(self.sector_size)
    }
}
