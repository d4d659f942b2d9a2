//! The input seam between the engine and the upstream normalizer.
//!
//! The engine never parses file formats itself: a [`Corpus`] implementation
//! wraps whatever produced the normalized records (JSON Lines readers,
//! database cursors, in-memory fixtures) and exposes them as per-file
//! iterators. Files can be opened more than once per run — detection streams
//! the corpus once, filtering streams it again.

use std::sync::Arc;

use crate::document::NormalizedRecord;
use crate::error::CorpusError;

/// Boxed per-file record iterator returned by [`Corpus::open`].
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<NormalizedRecord, CorpusError>> + Send + 'a>;

/// Stream of normalized documents, grouped by source file.
///
/// Implementations must be safe to share across reader workers; each worker
/// opens a disjoint set of files, so per-file iterators themselves need no
/// synchronization.
pub trait Corpus: Send + Sync {
    /// All source files in this corpus, in a stable order.
    fn files(&self) -> Result<Vec<Arc<str>>, CorpusError>;

    /// Open one source file and stream its records in offset order.
    fn open(&self, source_file: &str) -> Result<RecordIter<'_>, CorpusError>;
}

/// In-memory corpus, used by tests and by embedders that already hold the
/// normalized records.
#[derive(Debug, Default, Clone)]
pub struct MemoryCorpus {
    files: Vec<(Arc<str>, Vec<String>)>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one source file with its records; offsets are assigned by
    /// position.
    pub fn push_file(&mut self, source_file: impl Into<String>, records: Vec<String>) -> &mut Self {
        self.files.push((Arc::from(source_file.into()), records));
        self
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl Corpus for MemoryCorpus {
    fn files(&self) -> Result<Vec<Arc<str>>, CorpusError> {
        Ok(self.files.iter().map(|(name, _)| Arc::clone(name)).collect())
    }

    fn open(&self, source_file: &str) -> Result<RecordIter<'_>, CorpusError> {
        let records = self
            .files
            .iter()
            .find(|(name, _)| name.as_ref() == source_file)
            .map(|(_, records)| records)
            .ok_or_else(|| CorpusError::UnknownFile(source_file.to_string()))?;
        Ok(Box::new(records.iter().enumerate().map(|(offset, text)| {
            Ok(NormalizedRecord::new(offset as u64, text.clone()))
        })))
    }
}
