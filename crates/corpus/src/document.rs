//! Document identity for a deduplication run.
//!
//! A document is addressed by its source file plus the record offset within
//! that file. The rendered form `{source_file}-{record_offset}` is the
//! stable identifier used everywhere downstream; its lexicographic order is
//! the contract for representative selection, so the ordering here compares
//! the rendered string, not the `(file, offset)` pair.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CorpusError;

/// Stable identifier for one document within a run.
///
/// Cheap to clone: the rendered id and the source file name are shared
/// `Arc<str>`s. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct DocumentId {
    id: Arc<str>,
    source_file: Arc<str>,
    record_offset: u64,
}

impl DocumentId {
    /// Build a document id from its source file and record offset.
    ///
    /// Fails fast with [`CorpusError::InvalidDocument`] when the source file
    /// name is empty; every document must be addressable.
    pub fn new(source_file: &Arc<str>, record_offset: u64) -> Result<Self, CorpusError> {
        if source_file.trim().is_empty() {
            return Err(CorpusError::InvalidDocument(
                "document id requires a non-empty source file".into(),
            ));
        }
        let id: Arc<str> = format!("{source_file}-{record_offset}").into();
        Ok(Self {
            id,
            source_file: Arc::clone(source_file),
            record_offset,
        })
    }

    /// Rendered identifier, `{source_file}-{record_offset}`.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Source file this document was read from.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Record offset within the source file.
    pub fn record_offset(&self) -> u64 {
        self.record_offset
    }
}

impl PartialEq for DocumentId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DocumentId {}

impl Hash for DocumentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for DocumentId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DocumentId {
    // Lexicographic on the rendered id. "f-10" sorts before "f-9".
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// One normalized document as handed over by the upstream normalizer.
///
/// The text is assumed to be cleaned UTF-8; this crate performs no
/// normalization of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Offset of this record within its source file.
    pub record_offset: u64,
    /// Normalized plain-text body.
    pub text: String,
}

impl NormalizedRecord {
    pub fn new(record_offset: u64, text: impl Into<String>) -> Self {
        Self {
            record_offset,
            text: text.into(),
        }
    }
}
