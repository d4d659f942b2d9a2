use thiserror::Error;

/// Errors surfaced by corpus sources and document construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorpusError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("unknown source file: {0}")]
    UnknownFile(String),
    #[error("source read failed: {0}")]
    Read(String),
    #[error("sink write failed: {0}")]
    Write(String),
}
