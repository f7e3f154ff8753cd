/// Magic bytes that should be at the beginning of every OLE file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Size of the fixed compound-file header in bytes
pub const HEADER_SIZE: usize = 512;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Size of the UTF-16LE name field at the start of a directory entry
pub const DIRENTRY_NAME_SIZE: usize = 64;

/// Number of master-FAT (DIFAT) slots stored in the header
pub const HEADER_DIFAT_ENTRIES: usize = 109;

/// Longest sector chain followed before the chain is treated as corrupt
pub const MAX_CHAIN_SECTORS: usize = 1000;

/// Smallest and largest accepted sector shift (128-byte to 64 KiB sectors)
pub const MIN_SECTOR_SHIFT: u16 = 7;
pub const MAX_SECTOR_SHIFT: u16 = 16;

// Sector IDs (from AAF specifications)
/// Maximum regular sector ID
pub const MAXREGSECT: u32 = 0xFFFFFFFA; // -6
/// End of a virtual stream chain
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE; // -2
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFFFFFF; // -1

/// Directory entry types
pub const STGTY_STREAM: u8 = 2;
pub const STGTY_ROOT: u8 = 5;

/// Name of the stream holding the Word document body and FIB
pub const WORD_DOCUMENT_STREAM: &str = "WordDocument";
/// Table stream names selected by FIB flag bit 9
pub const TABLE_STREAM_0: &str = "0Table";
pub const TABLE_STREAM_1: &str = "1Table";
