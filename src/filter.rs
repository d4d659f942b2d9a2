//! Corpus filtering: apply a [`DuplicateIndex`] to the record stream.
//!
//! Pure filtering — records pass through byte-for-byte or not at all. This
//! is the only stage that touches persistent output, and it does so through
//! the [`RecordSink`] seam so the writer collaborator owns the actual
//! persistence.

use cluster::DuplicateIndex;
use corpus::{Corpus, CorpusError, NormalizedRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::PipelineError;

/// Destination for surviving records, in stream order per file.
pub trait RecordSink {
    fn write(&mut self, source_file: &str, record: &NormalizedRecord) -> Result<(), CorpusError>;
}

/// Row and word accounting for one filtering pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterStats {
    pub records_read: u64,
    pub records_written: u64,
    pub records_dropped: u64,
    pub words_written: u64,
}

/// Stream the corpus a second time and emit every record whose
/// `(source_file, record_offset)` is not in the index's drop set.
///
/// A file with no index entry has no duplicates and passes through
/// untouched. Filtering is idempotent: the same `(corpus, index)` pair
/// always yields the same output.
pub fn filter_corpus(
    corpus: &dyn Corpus,
    index: &DuplicateIndex,
    sink: &mut dyn RecordSink,
) -> Result<FilterStats, PipelineError> {
    let mut stats = FilterStats::default();

    for file in corpus.files()? {
        for record in corpus.open(&file)? {
            let record = record.map_err(PipelineError::from)?;
            stats.records_read += 1;
            if index.should_drop(&file, record.record_offset) {
                stats.records_dropped += 1;
                continue;
            }
            stats.words_written += record.text.split_whitespace().count() as u64;
            sink.write(&file, &record)?;
            stats.records_written += 1;
        }
        debug!(file = %file, "filtered source file");
    }

    Ok(stats)
}

/// In-memory sink for tests and embedders; keeps surviving records grouped
/// by source file in arrival order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySink {
    files: BTreeMap<String, Vec<NormalizedRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surviving records for one file; empty when nothing survived or the
    /// file was never written.
    pub fn records(&self, source_file: &str) -> &[NormalizedRecord] {
        self.files
            .get(source_file)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Files that received at least one record.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn total_records(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, source_file: &str, record: &NormalizedRecord) -> Result<(), CorpusError> {
        self.files
            .entry(source_file.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }
}
