//! Raw run collectors behind each [`HeuristicStrategy`](super::HeuristicStrategy).
//!
//! Every function here is a pure scan over a borrowed buffer returning the
//! text runs it found, in buffer order. Cleaning, validity filtering and
//! deduplication happen in the caller.
use crate::common::scan::{
    byte_histogram, is_printable, is_readable, null_padded_run_at, printable_runs, text_char,
    utf16_run_at, utf16_run_before,
};
use aho_corasick::AhoCorasick;
use memchr::memmem;
use once_cell::sync::Lazy;

/// Field begin, separator, end and the cell mark, as UTF-16LE code units
const FIELD_MARKER_PATTERNS: [[u8; 2]; 4] = [[0x13, 0x00], [0x14, 0x00], [0x15, 0x00], [0x07, 0x00]];

static FIELD_MARKERS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(FIELD_MARKER_PATTERNS)
        .expect("Failed to build field marker matcher")
});

/// Characters read on each side of a field marker
const MARKER_CONTEXT_CHARS: usize = 500;

/// UTF-16 paragraph mark
const PARAGRAPH_MARK: [u8; 2] = [0x0D, 0x00];
/// Runs after a paragraph mark must be longer than this
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Bytes counted by the frequency gate: space and the most common letters
const INDICATIVE_BYTES: [u8; 7] = [b' ', b'e', b't', b'a', b'o', b'i', b'n'];
const MIN_INDICATIVE_RATIO: f64 = 0.01;
const MIN_INDICATIVE_COUNT: usize = 10;
/// Frequency runs must be longer than this and average above the bar
const MIN_CONFIDENT_RUN: usize = 10;
const MIN_AVERAGE_CONFIDENCE: f64 = 6.0;
const MAX_CONFIDENT_RUNS: usize = 10;

/// Null-prefixed ASCII runs.
///
/// Any `0x00` byte followed by a printable byte starts a run; single nulls
/// inside the run are padding. When the bytes after the null interleave
/// with nulls (UTF-16 text), an unread printable byte just before the null
/// is the first character and is read as well. Scanning resumes after each
/// run, so no byte is decoded twice.
pub fn null_prefixed_runs(data: &[u8], max_run_bytes: usize) -> Vec<String> {
    let mut runs = Vec::new();
    let mut i = 0;
    let mut consumed = 0;

    while i + 1 < data.len() {
        if data[i] != 0 || !is_printable(data[i + 1]) {
            i += 1;
            continue;
        }

        let start = if i > consumed && is_printable(data[i - 1]) && data.get(i + 2) == Some(&0) {
            i - 1
        } else {
            i
        };
        let run = null_padded_run_at(data, start, max_run_bytes);
        i = run.end.max(i + 1);
        consumed = i;
        if !run.text.trim().is_empty() {
            runs.push(run.text);
        }
    }

    runs
}

/// Maximal runs of readable single-byte text at least `min_len` long.
pub fn printable_text_runs(data: &[u8], min_len: usize) -> Vec<String> {
    printable_runs(data, min_len)
        .into_iter()
        .map(|run| run.text)
        .collect()
}

/// UTF-16LE runs found anywhere: `(printable, 0x00)` pairs.
///
/// Runs shorter than `min_chars` are dropped; each run is capped at
/// `max_chars`.
pub fn utf16_runs(data: &[u8], min_chars: usize, max_chars: usize) -> Vec<String> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i + 1 < data.len() {
        if data[i + 1] != 0 || !is_printable(data[i]) {
            i += 1;
            continue;
        }

        let run = utf16_run_at(data, i, max_chars);
        i = run.end.max(i + 1);
        if run.len() >= min_chars {
            runs.push(run.text);
        }
    }

    runs
}

/// UTF-16 text on either side of Word's field and cell marks.
pub fn field_marker_runs(data: &[u8]) -> Vec<String> {
    let mut runs = Vec::new();

    for found in FIELD_MARKERS.find_iter(data) {
        let before = utf16_run_before(data, found.start(), MARKER_CONTEXT_CHARS);
        if !before.is_empty() {
            runs.push(before.text);
        }
        let after = utf16_run_at(data, found.end(), MARKER_CONTEXT_CHARS);
        if !after.is_empty() {
            runs.push(after.text);
        }
    }

    runs
}

/// UTF-16 runs that follow a paragraph mark.
///
/// Marks inside a run already read are skipped, so consecutive paragraphs
/// come out once.
pub fn paragraph_marker_runs(data: &[u8], max_chars: usize) -> Vec<String> {
    let mut runs = Vec::new();
    let mut covered = 0;

    for pos in memmem::find_iter(data, &PARAGRAPH_MARK) {
        if pos < covered {
            continue;
        }
        let run = utf16_run_at(data, pos + PARAGRAPH_MARK.len(), max_chars);
        covered = run.end;
        if run.text.trim().chars().count() > MIN_PARAGRAPH_CHARS {
            runs.push(run.text);
        }
    }

    runs
}

/// Per-character confidence that a byte is part of prose.
#[inline]
fn confidence(byte: u8) -> f64 {
    match byte {
        b' ' => 10.0,
        b'a'..=b'z' => 8.0,
        b'A'..=b'Z' => 7.0,
        b'0'..=b'9' => 6.0,
        b'.' | b',' | b'!' | b'?' | b':' | b';' => 5.0,
        b'\t' | b'\n' | b'\r' => 5.0,
        _ => 3.0,
    }
}

/// Whether the buffer holds enough text-indicative bytes to be worth a
/// frequency scan.
pub fn has_text_frequency(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    let histogram = byte_histogram(data);
    let count: usize = INDICATIVE_BYTES.iter().map(|&b| histogram[b as usize]).sum();
    count >= MIN_INDICATIVE_COUNT && count as f64 / data.len() as f64 >= MIN_INDICATIVE_RATIO
}

#[derive(Debug)]
struct ScoredRun {
    start: usize,
    text: String,
    average: f64,
}

/// Confidence-weighted printable runs.
///
/// Fails fast (no runs) when [`has_text_frequency`] says the buffer is
/// unlikely to hold text. Otherwise reads readable runs, treating a null
/// byte followed by a non-null byte as padding, and keeps the ten runs with
/// the highest average confidence, returned in buffer order.
pub fn frequency_runs(data: &[u8], max_run_bytes: usize) -> Vec<String> {
    if !has_text_frequency(data) {
        return Vec::new();
    }

    let mut scored = Vec::new();
    let mut i = 0;

    while i < data.len() {
        if !is_readable(data[i]) {
            i += 1;
            continue;
        }

        let start = i;
        let mut text = String::new();
        let mut total = 0.0;
        while i < data.len() && i - start < max_run_bytes {
            let byte = data[i];
            if byte == 0 && data.get(i + 1).is_some_and(|&next| next != 0) {
                i += 1;
                continue;
            }
            let Some(ch) = text_char(byte as u16) else {
                break;
            };
            text.push(ch);
            total += confidence(byte);
            i += 1;
        }
        i = i.max(start + 1);

        let len = text.chars().count();
        if len > MIN_CONFIDENT_RUN {
            let average = total / len as f64;
            if average > MIN_AVERAGE_CONFIDENCE {
                scored.push(ScoredRun {
                    start,
                    text,
                    average,
                });
            }
        }
    }

    scored.sort_by(|a, b| {
        b.average
            .total_cmp(&a.average)
            .then_with(|| a.start.cmp(&b.start))
    });
    scored.truncate(MAX_CONFIDENT_RUNS);
    scored.sort_by_key(|run| run.start);
    scored.into_iter().map(|run| run.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_null_prefixed_runs() {
        let mut data = vec![0xFF, 0x00];
        data.extend(utf16("Visible text"));
        data.extend([0x00, 0x00, 0xFF]);
        assert_eq!(null_prefixed_runs(&data, 1000), vec!["Visible text"]);
    }

    #[test]
    fn test_null_prefixed_respects_cap() {
        let mut data = vec![0x01, 0x00];
        data.extend(utf16(&"abcdefgh".repeat(100)));
        let runs = null_prefixed_runs(&data, 100);
        assert!(runs.iter().all(|r| r.len() <= 100));
        assert!(!runs.is_empty());
    }

    #[test]
    fn test_printable_text_runs_threshold() {
        let data = b"\x01short\x02this run is long enough\x03";
        assert_eq!(printable_text_runs(data, 12), vec!["this run is long enough"]);
    }

    #[test]
    fn test_null_prefixed_runs_after_non_null_unit() {
        let mut data = vec![0xFF, 0xFF];
        data.extend(utf16("Hello there world"));
        data.extend([0xFF, 0xFF]);
        assert_eq!(null_prefixed_runs(&data, 1000), vec!["Hello there world"]);

        // single-byte text with one padding null
        let data = b"\xFFabc\x00def ghi jkl mno\xFF";
        assert_eq!(null_prefixed_runs(data, 1000), vec!["def ghi jkl mno"]);
    }

    #[test]
    fn test_utf16_runs_anywhere() {
        let mut data = vec![0x41, 0x7F];
        data.extend(utf16("Interleaved words"));
        data.push(0xFF);
        assert_eq!(utf16_runs(&data, 8, 1000), vec!["Interleaved words"]);
        assert!(utf16_runs(&utf16("tiny"), 8, 1000).is_empty());
    }

    #[test]
    fn test_field_marker_runs() {
        let mut data = vec![0xFF, 0xFF];
        data.extend(utf16("Before the field"));
        data.extend([0x13, 0x00]);
        data.extend(utf16("PAGE"));
        data.extend([0x14, 0x00]);
        data.extend(utf16("3"));
        data.extend([0x15, 0x00]);
        data.extend(utf16("after the field"));
        data.extend([0xFF, 0xFF]);

        let runs = field_marker_runs(&data);
        assert!(runs.contains(&"Before the field".to_string()));
        assert!(runs.contains(&"after the field".to_string()));
        assert!(runs.contains(&"PAGE".to_string()));
    }

    #[test]
    fn test_paragraph_marker_runs() {
        let mut data = vec![0xFF, 0xFF];
        data.extend(utf16("\rFirst paragraph is long enough.\rSecond one as well, also long."));
        data.extend([0xFF, 0xFF]);
        data.extend(utf16("\rshort"));
        let runs = paragraph_marker_runs(&data, 1000);
        assert_eq!(
            runs,
            vec!["First paragraph is long enough.\nSecond one as well, also long."]
        );
    }

    #[test]
    fn test_frequency_gate() {
        assert!(!has_text_frequency(&[]));
        assert!(!has_text_frequency(&vec![0u8; 10_000]));
        assert!(has_text_frequency(b"the internet is a network of networks"));
        assert!(frequency_runs(&vec![0xAAu8; 4096], 1000).is_empty());
    }

    #[test]
    fn test_frequency_runs_prefer_prose() {
        let mut data = Vec::new();
        data.extend_from_slice(b"\xFFthe rain in spain stays mainly in the plain\xFF");
        data.extend_from_slice(b"#$%&#$%&#$%&#$%&\xFF");
        data.extend(utf16("and it is wide"));
        data.push(0xFF);
        let runs = frequency_runs(&data, 1000);
        assert_eq!(
            runs,
            vec!["the rain in spain stays mainly in the plain", "and it is wide"]
        );
    }
}
