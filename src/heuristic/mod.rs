//! Heuristic text recovery.
//!
//! When the piece table cannot be trusted, text is recovered straight from
//! the bytes. Each [`HeuristicStrategy`] is an independent scan; none of them
//! depends on another's output, so they can run in any order or in parallel.
//!
//! A strategy's raw runs are cleaned, checked against the validity filter,
//! deduplicated and joined into one candidate.
pub mod strategies;
pub mod validity;

use crate::common::text::{clean_run, normalized_key};
use crate::config::ExtractOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::trace;

pub use validity::{Strictness, is_container_noise, is_valid_text};

/// Separator placed between runs of one candidate
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// The fixed set of heuristic scans.
///
/// Declaration order is the canonical run order and the tie-break rank used
/// by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum HeuristicStrategy {
    /// `0x00` followed by printable bytes, nulls treated as padding
    NullPrefixedRuns,
    /// Maximal printable single-byte runs
    PrintableRuns,
    /// `(printable, 0x00)` pairs anywhere in the buffer
    Utf16Interleave,
    /// Text around field begin/separator/end and cell marks
    FieldMarkers,
    /// Confidence-weighted runs behind a byte-frequency gate
    Frequency,
    /// UTF-16 runs after paragraph marks
    ParagraphMarkers,
}

impl HeuristicStrategy {
    /// Every strategy in canonical order.
    pub const ALL: [HeuristicStrategy; 6] = [
        HeuristicStrategy::NullPrefixedRuns,
        HeuristicStrategy::PrintableRuns,
        HeuristicStrategy::Utf16Interleave,
        HeuristicStrategy::FieldMarkers,
        HeuristicStrategy::Frequency,
        HeuristicStrategy::ParagraphMarkers,
    ];

    /// Position in [`HeuristicStrategy::ALL`].
    #[inline]
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeuristicStrategy::NullPrefixedRuns => "null_prefixed_runs",
            HeuristicStrategy::PrintableRuns => "printable_runs",
            HeuristicStrategy::Utf16Interleave => "utf16_interleave",
            HeuristicStrategy::FieldMarkers => "field_markers",
            HeuristicStrategy::Frequency => "frequency",
            HeuristicStrategy::ParagraphMarkers => "paragraph_markers",
        }
    }

    /// Validity preset applied to this strategy's runs.
    pub fn strictness(self) -> Strictness {
        match self {
            HeuristicStrategy::FieldMarkers => Strictness::Lenient,
            HeuristicStrategy::ParagraphMarkers => Strictness::Strict,
            _ => Strictness::Standard,
        }
    }

    /// Collect this strategy's raw runs from `data`.
    pub fn runs(self, data: &[u8], options: &ExtractOptions) -> Vec<String> {
        match self {
            HeuristicStrategy::NullPrefixedRuns => {
                strategies::null_prefixed_runs(data, options.max_run_bytes)
            }
            HeuristicStrategy::PrintableRuns => {
                strategies::printable_text_runs(data, options.min_printable_run)
            }
            HeuristicStrategy::Utf16Interleave => {
                strategies::utf16_runs(data, options.min_utf16_run, options.max_run_bytes)
            }
            HeuristicStrategy::FieldMarkers => strategies::field_marker_runs(data),
            HeuristicStrategy::Frequency => strategies::frequency_runs(data, options.max_run_bytes),
            HeuristicStrategy::ParagraphMarkers => {
                strategies::paragraph_marker_runs(data, options.max_run_bytes)
            }
        }
    }

    /// Run the strategy and assemble its candidate.
    ///
    /// Returns `None` when nothing survives the filter. Finding nothing is a
    /// normal outcome, never an error.
    pub fn attempt(self, data: &[u8], options: &ExtractOptions) -> Option<String> {
        let runs = self.runs(data, options);
        let found = runs.len();
        let candidate = assemble(runs, self.strictness(), options.max_chunks_per_candidate);
        trace!(
            strategy = self.as_str(),
            runs = found,
            chars = candidate.as_ref().map_or(0, String::len),
            "strategy finished"
        );
        candidate
    }
}

/// Clean, filter and deduplicate runs, then join the survivors.
pub fn assemble(runs: Vec<String>, strictness: Strictness, max_chunks: usize) -> Option<String> {
    let mut seen = HashSet::new();
    let chunks: Vec<String> = runs
        .iter()
        .map(|run| clean_run(run))
        .filter(|text| !text.is_empty())
        .filter(|text| !is_container_noise(text))
        .filter(|text| is_valid_text(text, strictness))
        .filter(|text| seen.insert(normalized_key(text)))
        .take(max_chunks)
        .collect();

    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join(CHUNK_SEPARATOR))
    }
}
