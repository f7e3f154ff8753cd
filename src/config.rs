//! Extraction options.
use crate::heuristic::HeuristicStrategy;
use serde::{Deserialize, Serialize};

/// Configuration options for text extraction.
///
/// Every field has a default, so a configuration file only needs to name the
/// fields it changes.
///
/// # Examples
///
/// ```rust
/// use docsalvage::{ExtractOptions, HeuristicStrategy};
///
/// // Create with defaults
/// let options = ExtractOptions::default();
///
/// // Or customize
/// let options = ExtractOptions::new()
///     .with_strategies(vec![HeuristicStrategy::Utf16Interleave])
///     .with_parallel(false)
///     .with_structural(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Heuristic strategies to run, in order
    pub strategies: Vec<HeuristicStrategy>,
    /// Whether to fan strategies out over the rayon pool
    pub use_parallel: bool,
    /// Run heuristics over the whole input
    pub scan_whole_file: bool,
    /// Run heuristics over the `WordDocument` stream when it can be resolved
    pub scan_word_stream: bool,
    /// Try the piece table before the heuristics
    pub structural: bool,
    /// Candidates shorter than this (trimmed, in characters) are discarded
    pub min_candidate_chars: usize,
    /// Per-run cap for the run scanners
    pub max_run_bytes: usize,
    /// Shortest single-byte run kept by the printable scan
    pub min_printable_run: usize,
    /// Shortest UTF-16 run kept by the interleave scan
    pub min_utf16_run: usize,
    /// Most runs joined into one heuristic candidate
    pub max_chunks_per_candidate: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strategies: HeuristicStrategy::ALL.to_vec(),
            use_parallel: true,
            scan_whole_file: true,
            scan_word_stream: true,
            structural: true,
            min_candidate_chars: 10,
            max_run_bytes: 1000,
            min_printable_run: 12,
            min_utf16_run: 8,
            max_chunks_per_candidate: 400,
        }
    }
}

impl ExtractOptions {
    /// Create a new `ExtractOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the heuristic stage to `strategies`.
    #[inline]
    pub fn with_strategies(mut self, strategies: Vec<HeuristicStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Set whether strategies run in parallel.
    ///
    /// The result is the same either way; only scheduling changes.
    #[inline]
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    #[inline]
    pub fn with_structural(mut self, structural: bool) -> Self {
        self.structural = structural;
        self
    }

    #[inline]
    pub fn with_scan_targets(mut self, whole_file: bool, word_stream: bool) -> Self {
        self.scan_whole_file = whole_file;
        self.scan_word_stream = word_stream;
        self
    }

    #[inline]
    pub fn with_min_candidate_chars(mut self, chars: usize) -> Self {
        self.min_candidate_chars = chars;
        self
    }

    /// Set the per-run cap used by the run scanners.
    #[inline]
    pub fn with_max_run_bytes(mut self, bytes: usize) -> Self {
        self.max_run_bytes = bytes;
        self
    }
}
