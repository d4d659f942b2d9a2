//! Workspace umbrella crate for the neardup engine.
//!
//! Near-duplicate detection and removal over large text corpora: character
//! shingles → MinHash signatures → LSH band collisions → candidate edges →
//! connected components → one surviving representative per duplicate group
//! → filtered re-emission of the corpus.
//!
//! The engine consumes an abstract stream of normalized documents through
//! the [`Corpus`] trait and hands filtered records back through a
//! [`RecordSink`]; format parsing, normalization, and persistence stay with
//! the collaborators behind those seams.
//!
//! ```
//! use neardup::{detect_duplicates, filter_corpus, CancellationToken,
//!               DedupConfig, MemoryCorpus, MemorySink, SignatureConfig};
//!
//! let mut corpus = MemoryCorpus::new();
//! corpus.push_file("part-0.jsonl", vec![
//!     "the quick brown fox jumps over the lazy dog".into(),
//!     "the quick brown fox jumps over the lazy dog.".into(),
//!     "completely unrelated sentence about something else".into(),
//! ]);
//!
//! let cfg = DedupConfig::new()
//!     .with_signature(SignatureConfig::new().with_shingle_width(6));
//! let report = detect_duplicates(&corpus, &cfg, &CancellationToken::new()).unwrap();
//! assert_eq!(report.summary.documents_flagged, 1);
//!
//! let mut sink = MemorySink::new();
//! let stats = filter_corpus(&corpus, &report.index, &mut sink).unwrap();
//! assert_eq!(stats.records_written, 2);
//! ```

mod config;
mod filter;
mod pipeline;

pub use cluster::{resolve, DuplicateCluster, DuplicateIndex, UnionFind};
pub use corpus::{Corpus, CorpusError, DocumentId, MemoryCorpus, NormalizedRecord, RecordIter};
pub use lsh::{BandStore, BandStoreError, CandidateEdge, EdgeSet};
pub use signature::{
    band_keys, canonicalize_text, estimated_similarity, minhash_signature, shingle_set,
    signature_for_text, BandKey, DocumentSignature, SignatureAccumulator, SignatureConfig,
    SignatureError,
};

pub use crate::config::{ConfigLoadError, NeardupConfig, PipelineSection, SignatureSection};
pub use crate::filter::{filter_corpus, FilterStats, MemorySink, RecordSink};
pub use crate::pipeline::{detect_duplicates, CancellationToken, DedupConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by a deduplication run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Invalid runtime configuration (worker counts, channel capacity).
    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
    /// Corpus source failure (unknown file, read error, invalid document).
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),
    /// Signature configuration or computation failure.
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),
    /// A band store hit its configured capacity bound.
    #[error("band store fault: {0}")]
    BandStore(#[from] BandStoreError),
    /// The run was cancelled before completing.
    #[error("run cancelled")]
    Cancelled,
    /// A worker exited without completing the counted closing handshake.
    #[error("{stage} worker exited without completing its closing handshake")]
    WorkerLost { stage: &'static str },
    /// A worker panicked; the run is aborted rather than left hanging.
    #[error("{stage} worker panicked")]
    WorkerPanicked { stage: &'static str },
}

/// Accounting for one detection run. Includes the full configuration
/// snapshot: changing any parameter changes which pairs are found, so the
/// summary is what makes a run reproducible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents streamed from the corpus.
    pub documents_seen: u64,
    /// Documents whose canonical text produced no shingles; excluded from
    /// candidate generation by construction.
    pub empty_documents: u64,
    /// Deduplicated candidate edges across all bands.
    pub candidate_edges: u64,
    /// Connected components of size > 1.
    pub duplicate_clusters: u64,
    /// Documents marked for removal (cluster members minus representatives).
    pub documents_flagged: u64,
    /// Wall-clock duration of detection plus resolution.
    pub elapsed_ms: u64,
    /// Configuration the run executed with.
    pub config: DedupConfig,
}

/// Result of a detection run: the drop index and the run accounting.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub index: DuplicateIndex,
    pub summary: RunSummary,
}

/// Detect duplicates and immediately filter the corpus into `sink`.
///
/// Convenience wrapper over [`detect_duplicates`] + [`filter_corpus`] for
/// callers that do not need to persist the index between the two passes.
pub fn dedup_corpus(
    corpus: &dyn Corpus,
    cfg: &DedupConfig,
    sink: &mut dyn RecordSink,
) -> Result<(RunReport, FilterStats), PipelineError> {
    let report = detect_duplicates(corpus, cfg, &CancellationToken::new())?;
    let stats = filter_corpus(corpus, &report.index, sink)?;
    Ok((report, stats))
}
