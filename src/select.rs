//! Candidate scoring and selection.
//!
//! Selection is a pure function of the candidate set: the same candidates in
//! any order always produce the same winner.
use crate::common::text::normalized_key;
use crate::heuristic::HeuristicStrategy;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Score weights
const LENGTH_CAP: usize = 5000;
const LETTER_WEIGHT: f64 = 2.0;
const WORD_WEIGHT: f64 = 10.0;
const SENTENCE_WEIGHT: f64 = 30.0;
const PARAGRAPH_WEIGHT: f64 = 15.0;
const UNIQUE_WORD_WEIGHT: f64 = 5.0;
const READABILITY_WEIGHT: f64 = 100.0;

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Piece-table decoding
    Structural,
    Heuristic(HeuristicStrategy),
}

impl Origin {
    /// Tie-break rank: structural first, then strategies in canonical order.
    #[inline]
    pub fn rank(self) -> usize {
        match self {
            Origin::Structural => 0,
            Origin::Heuristic(strategy) => 1 + strategy.rank(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Structural => "structural",
            Origin::Heuristic(strategy) => strategy.as_str(),
        }
    }
}

/// One candidate text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub origin: Origin,
}

impl Candidate {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }
}

/// The winning candidate and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Selected {
    pub candidate: Candidate,
    pub score: f64,
}

fn is_word(token: &&str) -> bool {
    token.chars().count() > 2
}

/// Quality score of `text`; higher is better.
///
/// Length (capped), letters, words longer than two characters, sentence
/// marks, blank-line separated paragraphs, distinct lowercase words and the
/// share of letters and whitespace all add to the score.
pub fn score(text: &str) -> f64 {
    let mut length = 0usize;
    let mut letters = 0usize;
    let mut whitespace = 0usize;
    let mut sentences = 0usize;

    for ch in text.chars() {
        length += 1;
        if ch.is_alphabetic() {
            letters += 1;
        } else if ch.is_whitespace() {
            whitespace += 1;
        } else if matches!(ch, '.' | '!' | '?') {
            sentences += 1;
        }
    }
    if length == 0 {
        return 0.0;
    }

    let words = text.split_whitespace().filter(is_word).count();
    let unique_words = text
        .split_whitespace()
        .filter(is_word)
        .map(str::to_lowercase)
        .collect::<std::collections::HashSet<_>>()
        .len();
    let paragraphs = text
        .split("\n\n")
        .filter(|segment| !segment.trim().is_empty())
        .count();
    let readability = (letters + whitespace) as f64 / length as f64;

    length.min(LENGTH_CAP) as f64
        + letters as f64 * LETTER_WEIGHT
        + words as f64 * WORD_WEIGHT
        + sentences as f64 * SENTENCE_WEIGHT
        + paragraphs as f64 * PARAGRAPH_WEIGHT
        + unique_words as f64 * UNIQUE_WORD_WEIGHT
        + readability * READABILITY_WEIGHT
}

/// Lower origin rank first, then the lexically smaller text.
fn preferred(a: &Candidate, b: &Candidate) -> Ordering {
    a.origin
        .rank()
        .cmp(&b.origin.rank())
        .then_with(|| a.text.cmp(&b.text))
}

/// Drop candidates whose normalized text repeats another's.
///
/// Of each duplicate group the preferred origin survives, so a heuristic
/// copy of the structural text never displaces it. The result is sorted by
/// origin rank.
pub fn dedup(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut unique: HashMap<String, Candidate> = HashMap::with_capacity(candidates.len());

    for candidate in candidates {
        match unique.entry(normalized_key(&candidate.text)) {
            Entry::Occupied(mut slot) => {
                if preferred(&candidate, slot.get()) == Ordering::Less {
                    slot.insert(candidate);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }

    let mut result: Vec<Candidate> = unique.into_values().collect();
    result.sort_by(preferred);
    result
}

/// Pick the best candidate.
///
/// Candidates under `min_chars` characters (after trimming) are ignored.
/// The highest score wins; ties go to the structural candidate, then to the
/// earlier strategy, then to the smaller text. Returns `None` when nothing
/// is left.
pub fn select_best(candidates: Vec<Candidate>, min_chars: usize) -> Option<Selected> {
    dedup(candidates)
        .into_iter()
        .filter(|c| c.text.trim().chars().count() >= min_chars)
        .map(|candidate| Selected {
            score: score(&candidate.text),
            candidate,
        })
        .max_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| preferred(&b.candidate, &a.candidate))
        })
}
