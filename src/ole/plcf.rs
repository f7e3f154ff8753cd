//! Property List with Character Positions (PLCF).
//!
//! A PLCF is `n + 1` little-endian u32 character positions followed by `n`
//! fixed-size property elements. The piece table is one.
use crate::common::binary::read_u32_le;

/// Borrowed view over a PLCF structure.
#[derive(Debug, Clone, Copy)]
pub struct Plcf<'a> {
    data: &'a [u8],
    count: usize,
    element_size: usize,
}

impl<'a> Plcf<'a> {
    /// Interpret `data` as a PLCF with `element_size`-byte elements.
    ///
    /// The element count is derived from the length:
    /// `n = (len - 4) / (4 + element_size)`.
    pub fn parse(data: &'a [u8], element_size: usize) -> Option<Self> {
        if data.len() < 4 || element_size == 0 {
            return None;
        }
        let count = (data.len() - 4) / (4 + element_size);
        Some(Self {
            data,
            count,
            element_size,
        })
    }

    /// Get the number of elements in the PLCF.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Get character position at index (`0..=count`).
    #[inline]
    pub fn position(&self, index: usize) -> Option<u32> {
        if index > self.count {
            return None;
        }
        read_u32_le(self.data, index * 4).ok()
    }

    /// Get property data at index.
    pub fn property(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.count {
            return None;
        }
        let start = (self.count + 1) * 4 + index * self.element_size;
        self.data.get(start..start + self.element_size)
    }

    /// Get `(start_cp, end_cp)` for element at index.
    pub fn range(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.count {
            return None;
        }
        Some((self.position(index)?, self.position(index + 1)?))
    }
}
