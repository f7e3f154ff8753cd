//! Text validity filter applied to every heuristic run.
use phf::phf_set;
use serde::{Deserialize, Serialize};

/// Stream and storage names that show up as text inside every compound file.
static CONTAINER_NOISE: phf::Set<&'static str> = phf_set! {
    "Root Entry",
    "WordDocument",
    "1Table",
    "0Table",
    "Data",
    "CompObj",
    "SummaryInformation",
    "DocumentSummaryInformation",
    "Normal.dot",
    "Normal.dotm",
    "MSWordDoc",
    "Word.Document.8",
    "Microsoft Word 97-2003 Document",
};

/// Field instructions that precede field results in the text stream.
const FIELD_INSTRUCTIONS: [&str; 5] = ["HYPERLINK", "MERGEFIELD", "PAGEREF", "INCLUDEPICTURE", "TOC"];

/// Short function words used as a prose signal for long strict runs.
static COMMON_WORDS: phf::Set<&'static str> = phf_set! {
    "the", "and", "of", "to", "in", "is", "that", "for", "it", "with",
    "as", "was", "on", "be", "by", "this", "are", "or", "from", "at",
};

/// How demanding the filter is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Lenient,
    Standard,
    Strict,
}

/// Character-class counts for one string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharStats {
    pub total: usize,
    pub letters: usize,
    pub digits: usize,
    pub printable: usize,
    pub spaces: usize,
    pub distinct: usize,
}

impl CharStats {
    pub fn of(text: &str) -> Self {
        let mut seen = [false; 128];
        let mut stats = CharStats::default();
        let mut distinct_other = std::collections::HashSet::new();

        for ch in text.chars() {
            stats.total += 1;
            if ch.is_ascii_alphabetic() {
                stats.letters += 1;
            } else if ch.is_ascii_digit() {
                stats.digits += 1;
            }
            if (' '..='~').contains(&ch) {
                stats.printable += 1;
            }
            if ch == ' ' {
                stats.spaces += 1;
            }

            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii() {
                seen[lower as usize] = true;
            } else {
                distinct_other.insert(lower);
            }
        }
        stats.distinct = seen.iter().filter(|&&s| s).count() + distinct_other.len();
        stats
    }

    #[inline]
    fn ratio(part: usize, total: usize) -> f64 {
        if total == 0 { 0.0 } else { part as f64 / total as f64 }
    }

    #[inline]
    pub fn letter_ratio(&self) -> f64 {
        Self::ratio(self.letters, self.total)
    }

    #[inline]
    pub fn printable_ratio(&self) -> f64 {
        Self::ratio(self.printable, self.total)
    }

    #[inline]
    pub fn digit_ratio(&self) -> f64 {
        Self::ratio(self.digits, self.total)
    }
}

/// Whether `text` is a compound-file name or a bare field instruction.
///
/// A field keyword only counts as a whole word: `TOC \o` is noise, `TOCSIN`
/// is not.
pub fn is_container_noise(text: &str) -> bool {
    let trimmed = text.trim();
    CONTAINER_NOISE.contains(trimmed)
        || FIELD_INSTRUCTIONS.iter().any(|keyword| {
            trimmed
                .strip_prefix(keyword)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        })
}

fn has_prose_signal(text: &str) -> bool {
    text.contains(['.', '!', '?'])
        || text
            .split(|c: char| !c.is_ascii_alphabetic())
            .any(|word| COMMON_WORDS.contains(word.to_ascii_lowercase().as_str()))
}

/// Decide whether `text` looks like human-readable text.
///
/// | preset   | min len | letters | distinct        | printable | extra                     |
/// |----------|---------|---------|-----------------|-----------|---------------------------|
/// | Lenient  | 3       | 25%     | 3               |           |                           |
/// | Standard | 5       | 30%     | 3               | 80%       |                           |
/// | Strict   | 5       | 40%     | min(len/4, 10)  | 80%       | digits, spaces, prose     |
pub fn is_valid_text(text: &str, strictness: Strictness) -> bool {
    let stats = CharStats::of(text);

    let (min_len, min_letters, min_distinct, min_printable) = match strictness {
        Strictness::Lenient => (3, 0.25, 3, 0.0),
        Strictness::Standard => (5, 0.30, 3, 0.80),
        Strictness::Strict => (5, 0.40, (stats.total / 4).min(10), 0.80),
    };

    if stats.total < min_len
        || stats.letter_ratio() < min_letters
        || stats.distinct < min_distinct
        || stats.printable_ratio() < min_printable
    {
        return false;
    }

    if strictness == Strictness::Strict {
        if stats.digit_ratio() > 0.70 {
            return false;
        }
        if stats.total > 20 && stats.spaces == 0 {
            return false;
        }
        if stats.total > 100 && !has_prose_signal(text) {
            return false;
        }
    }

    true
}
