//! Extraction orchestration.
//!
//! One call runs the structural stage (compound file, FIB, piece table),
//! then every configured heuristic strategy, then picks the best candidate:
//!
//! ```text
//! Start -> Structural -> Heuristics (always) -> Select -> Done | NoExtractableText
//! ```
//!
//! A failed structural stage is recorded and the cascade moves on; only the
//! final selection can fail the call.
use crate::common::error::{ExtractionError, Result};
use crate::common::text::normalize_output;
use crate::config::ExtractOptions;
use crate::heuristic::HeuristicStrategy;
use crate::ole::doc::{ClxLayout, Package};
use crate::select::{Candidate, Origin, select_best};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Minimum number of strategy runs to justify parallel processing overhead.
const PARALLEL_THRESHOLD: usize = 2;

/// Outcome of one extraction, with the details behind the choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// Normalized output text
    pub text: String,
    /// Origin of the winning candidate
    pub source: Origin,
    /// Selector score of the winning candidate
    pub score: f64,
    /// CLX layout when the structural stage succeeded
    pub layout: Option<ClxLayout>,
    /// Why the structural stage failed, if it did
    pub structural_failure: Option<String>,
    /// Candidates produced before deduplication
    pub candidates_considered: usize,
}

/// Text extractor for legacy Word documents.
///
/// Holds only configuration and an optional cancel flag; every call works
/// on its own input buffer, so one extractor can serve many threads.
///
/// # Examples
///
/// ```rust,no_run
/// use docsalvage::{ExtractOptions, Extractor};
///
/// let bytes = std::fs::read("document.doc")?;
/// let extractor = Extractor::new(ExtractOptions::default());
/// let report = extractor.extract_with_report(&bytes)?;
/// println!("{} (from {})", report.text, report.source.as_str());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Attach a cancel flag, checked before the structural stage and before
    /// each heuristic strategy.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[inline]
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ExtractionError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Decode the body through the piece table only.
    ///
    /// Structural failures are returned as-is instead of falling back.
    pub fn extract_structural(&self, data: &[u8]) -> Result<String> {
        self.check_cancelled()?;
        let package = Package::parse(data)?;
        let text = package.document().text()?;
        Ok(normalize_output(&text.text))
    }

    /// Run the full cascade and return the winning text.
    pub fn extract_text(&self, data: &[u8]) -> Result<String> {
        self.extract_with_report(data).map(|report| report.text)
    }

    /// Run the full cascade and report how the text was chosen.
    pub fn extract_with_report(&self, data: &[u8]) -> Result<Extraction> {
        let mut candidates = Vec::new();
        let mut structural_failure = None;
        let mut layout = None;

        self.check_cancelled()?;
        let package = if self.options.structural || self.options.scan_word_stream {
            match Package::parse(data) {
                Ok(package) => Some(package),
                Err(e) => {
                    debug!(error = %e, "compound file not usable");
                    if self.options.structural {
                        structural_failure = Some(ExtractionError::from(e).to_string());
                    }
                    None
                }
            }
        } else {
            None
        };

        if self.options.structural
            && let Some(package) = &package
        {
            match package.document().text() {
                Ok(text) => {
                    debug!(
                        layout = text.layout.as_str(),
                        chars = text.text.len(),
                        "structural candidate"
                    );
                    layout = Some(text.layout);
                    candidates.push(Candidate::new(text.text, Origin::Structural));
                }
                Err(e) => {
                    debug!(error = %e, "structural stage failed");
                    structural_failure = Some(ExtractionError::from(e).to_string());
                }
            }
        }

        let word_document = package.as_ref().map(|p| p.word_document());
        candidates.extend(self.heuristic_candidates(data, word_document)?);

        let candidates_considered = candidates.len();
        let selected = select_best(candidates, self.options.min_candidate_chars).ok_or_else(|| {
            debug!(candidates_considered, "no candidate passed selection");
            ExtractionError::NoExtractableText
        })?;

        let text = normalize_output(&selected.candidate.text);
        if text.is_empty() {
            return Err(ExtractionError::NoExtractableText);
        }
        debug!(
            source = selected.candidate.origin.as_str(),
            score = selected.score,
            candidates_considered,
            "selected candidate"
        );

        Ok(Extraction {
            text,
            source: selected.candidate.origin,
            score: selected.score,
            layout: layout.filter(|_| selected.candidate.origin == Origin::Structural),
            structural_failure,
            candidates_considered,
        })
    }

    /// Run every configured strategy over every scan target.
    fn heuristic_candidates(
        &self,
        data: &[u8],
        word_document: Option<&[u8]>,
    ) -> Result<Vec<Candidate>> {
        let mut targets: Vec<&[u8]> = Vec::with_capacity(2);
        if self.options.scan_whole_file {
            targets.push(data);
        }
        if self.options.scan_word_stream
            && let Some(stream) = word_document
        {
            targets.push(stream);
        }

        let jobs: Vec<(HeuristicStrategy, &[u8])> = self
            .options
            .strategies
            .iter()
            .flat_map(|&strategy| targets.iter().map(move |&target| (strategy, target)))
            .collect();

        let run = |&(strategy, target): &(HeuristicStrategy, &[u8])| -> Result<Option<Candidate>> {
            self.check_cancelled()?;
            let candidate = strategy.attempt(target, &self.options);
            debug!(
                strategy = strategy.as_str(),
                target_len = target.len(),
                found = candidate.is_some(),
                "heuristic strategy"
            );
            Ok(candidate.map(|text| Candidate::new(text, Origin::Heuristic(strategy))))
        };

        let results: Vec<Option<Candidate>> =
            if self.options.use_parallel && jobs.len() >= PARALLEL_THRESHOLD {
                jobs.par_iter().map(run).collect::<Result<_>>()?
            } else {
                jobs.iter().map(run).collect::<Result<_>>()?
            };

        Ok(results.into_iter().flatten().collect())
    }

    /// Extract many inputs in parallel; results keep input order.
    pub fn extract_batch<T>(&self, inputs: &[T]) -> Vec<Result<String>>
    where
        T: AsRef<[u8]> + Sync,
    {
        inputs
            .par_iter()
            .map(|input| self.extract_text(input.as_ref()))
            .collect()
    }

    /// Read a file and extract its text.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let data = std::fs::read(path)?;
        self.extract_text(&data)
    }

    /// Read a file asynchronously, then extract on the blocking pool.
    pub async fn extract_file_async<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let data = tokio::fs::read(path).await?;
        let extractor = self.clone();
        tokio::task::spawn_blocking(move || extractor.extract_text(&data))
            .await
            .map_err(|e| ExtractionError::Io(std::io::Error::other(e)))?
    }
}

/// Extract text with default options.
///
/// # Examples
///
/// ```rust,no_run
/// let bytes = std::fs::read("document.doc")?;
/// let text = docsalvage::extract_text(&bytes)?;
/// println!("{}", text);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn extract_text(data: &[u8]) -> Result<String> {
    Extractor::default().extract_text(data)
}

/// Piece-table decoding only, with default options.
pub fn extract_structural(data: &[u8]) -> Result<String> {
    Extractor::default().extract_structural(data)
}
