//! Stateless byte-scanning primitives.
//!
//! These routines walk a borrowed byte buffer and decode short runs of
//! ASCII-range text, either single-byte or UTF-16LE. Every other component
//! (piece decoding, the heuristic strategies) is built on them. All decoders
//! stop at buffer exhaustion or at an explicit cap, so no scan is unbounded.

/// A decoded run of text and the byte range it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Run {
    /// First byte of the run
    pub start: usize,
    /// One past the last byte consumed
    pub end: usize,
    /// Decoded text
    pub text: String,
}

impl Run {
    /// Number of decoded characters (all runs are ASCII-range).
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Printable ASCII, `0x20..=0x7E`.
#[inline]
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

/// Tab, line feed or carriage return.
#[inline]
pub fn is_text_control(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\r')
}

/// Printable ASCII or a text control byte.
#[inline]
pub fn is_readable(byte: u8) -> bool {
    is_printable(byte) || is_text_control(byte)
}

/// Map one code unit to the character it contributes to recovered text.
///
/// Printable ASCII passes through, CR and LF become `'\n'`, tab stays a tab.
/// Everything else yields `None`.
#[inline]
pub fn text_char(unit: u16) -> Option<char> {
    match unit {
        0x20..=0x7E => Some(unit as u8 as char),
        0x0D | 0x0A => Some('\n'),
        0x09 => Some('\t'),
        _ => None,
    }
}

/// Decode UTF-16LE code units forward from `start`.
///
/// Each unit must have a zero high byte and map through [`text_char`];
/// the run ends at the first unit that does not, or after `max_chars`.
pub fn utf16_run_at(data: &[u8], start: usize, max_chars: usize) -> Run {
    let mut text = String::new();
    let mut pos = start;

    while pos + 1 < data.len() && text.len() < max_chars {
        if data[pos + 1] != 0 {
            break;
        }
        match text_char(data[pos] as u16) {
            Some(ch) => text.push(ch),
            None => break,
        }
        pos += 2;
    }

    Run {
        start,
        end: pos,
        text,
    }
}

/// Decode UTF-16LE code units backward from `end` (exclusive).
///
/// Returns the longest run of text units that ends exactly at `end`,
/// capped at `max_chars`.
pub fn utf16_run_before(data: &[u8], end: usize, max_chars: usize) -> Run {
    let end = end.min(data.len());
    let mut chars = Vec::new();
    let mut pos = end;

    while pos >= 2 && chars.len() < max_chars {
        if data[pos - 1] != 0 {
            break;
        }
        match text_char(data[pos - 2] as u16) {
            Some(ch) => chars.push(ch),
            None => break,
        }
        pos -= 2;
    }

    Run {
        start: pos,
        end,
        text: chars.into_iter().rev().collect(),
    }
}

/// Decode single-byte text forward from `start`, capped at `max_bytes`.
pub fn ascii_run_at(data: &[u8], start: usize, max_bytes: usize) -> Run {
    let limit = start.saturating_add(max_bytes).min(data.len());
    let mut text = String::new();
    let mut pos = start;

    while pos < limit {
        match text_char(data[pos] as u16) {
            Some(ch) => text.push(ch),
            None => break,
        }
        pos += 1;
    }

    Run {
        start,
        end: pos,
        text,
    }
}

/// Decode text in which single `0x00` bytes are padding.
///
/// Starting at `start`, printable bytes become characters and isolated null
/// bytes are skipped. Two consecutive nulls (a UTF-16 terminator), any other
/// non-text byte, or the `max_bytes` cap end the run.
pub fn null_padded_run_at(data: &[u8], start: usize, max_bytes: usize) -> Run {
    let limit = start.saturating_add(max_bytes).min(data.len());
    let mut text = String::new();
    let mut pos = start;
    let mut prev_nul = false;

    while pos < limit {
        let byte = data[pos];
        if byte == 0 {
            if prev_nul {
                break;
            }
            prev_nul = true;
            pos += 1;
            continue;
        }
        prev_nul = false;
        match text_char(byte as u16) {
            Some(ch) => text.push(ch),
            None => break,
        }
        pos += 1;
    }

    Run {
        start,
        end: pos,
        text,
    }
}

/// Collect maximal runs of readable bytes that are at least `min_len` long.
///
/// Shorter runs are dropped as noise.
pub fn printable_runs(data: &[u8], min_len: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        if !is_readable(data[pos]) {
            pos += 1;
            continue;
        }
        let run = ascii_run_at(data, pos, usize::MAX);
        pos = run.end.max(pos + 1);
        if run.len() >= min_len {
            runs.push(run);
        }
    }

    runs
}

/// Count occurrences of every byte value.
pub fn byte_histogram(data: &[u8]) -> [usize; 256] {
    let mut histogram = [0usize; 256];
    for &byte in data {
        histogram[byte as usize] += 1;
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_text_char_mapping() {
        assert_eq!(text_char(b'A' as u16), Some('A'));
        assert_eq!(text_char(0x0D), Some('\n'));
        assert_eq!(text_char(0x09), Some('\t'));
        assert_eq!(text_char(0x7F), None);
        assert_eq!(text_char(0x0141), None);
    }

    #[test]
    fn test_utf16_run_forward_and_backward() {
        let mut data = vec![0xFF, 0xFE];
        data.extend(utf16("Body text"));
        data.extend([0x13, 0x00]);
        data.extend(utf16("after"));

        let forward = utf16_run_at(&data, 2, 1000);
        assert_eq!(forward.text, "Body text");
        assert_eq!(forward.end, 2 + 18);

        // 0x13 is not a text unit, so a backward scan from the marker stops
        // exactly at the start of the body text.
        let backward = utf16_run_before(&data, 20, 1000);
        assert_eq!(backward.text, "Body text");
        assert_eq!(backward.start, 2);

        assert_eq!(utf16_run_at(&data, 22, 3).text, "aft");
    }

    #[test]
    fn test_null_padded_run_stops_at_terminator() {
        let mut data = utf16("Padded");
        data.extend([0x00, 0x00, b'X', 0x00]);
        let run = null_padded_run_at(&data, 0, 2000);
        assert_eq!(run.text, "Padded");
    }

    #[test]
    fn test_null_padded_run_respects_cap() {
        let data = utf16("abcdefghij");
        let run = null_padded_run_at(&data, 0, 6);
        assert_eq!(run.text, "abc");
    }

    #[test]
    fn test_printable_runs_drop_short_noise() {
        let data = b"\x01\x02short\x00A long enough readable run\xFFxy";
        let runs = printable_runs(data, 12);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "A long enough readable run");
    }

    #[test]
    fn test_byte_histogram() {
        let histogram = byte_histogram(b"aab");
        assert_eq!(histogram[b'a' as usize], 2);
        assert_eq!(histogram[b'b' as usize], 1);
        assert_eq!(histogram[0], 0);
    }
}
