//! Neardup corpus layer.
//!
//! Document identity and the normalized-record stream abstraction shared by
//! every stage of the deduplication engine.
//!
//! ## What lives here
//!
//! - [`DocumentId`]: `{source_file}-{record_offset}` identity with the
//!   lexicographic ordering used for representative selection
//! - [`NormalizedRecord`]: one cleaned document as produced upstream
//! - [`Corpus`]: the seam to the normalizer collaborator, with
//!   [`MemoryCorpus`] as the bundled in-memory implementation
//!
//! ## Invariants worth knowing
//!
//! - Input text is trusted, normalized UTF-8; nothing here re-cleans it
//! - Ids are immutable and stable for the duration of a run
//! - `DocumentId` ordering compares the rendered id string, which is the
//!   documented tie-break contract for duplicate resolution

mod document;
mod error;
mod source;

pub use crate::document::{DocumentId, NormalizedRecord};
pub use crate::error::CorpusError;
pub use crate::source::{Corpus, MemoryCorpus, RecordIter};
