//! # Neardup signature layer
//!
//! Turns normalized document text into the approximate-similarity artifacts
//! the rest of the engine works with: hashed character shingle sets, MinHash
//! signatures, and LSH band keys.
//!
//! ## Contract
//!
//! - Pure functions of `(text, config)`: no I/O, no clocks, no global state.
//! - Deterministic for a fixed [`SignatureConfig`] — same seed and
//!   parameters produce bit-identical signatures on any machine or thread,
//!   which is what makes a whole deduplication run reproducible.
//! - Empty documents (nothing left after canonicalization, or shorter than
//!   the shingle width) get an all-sentinel signature and are flagged via
//!   [`DocumentSignature::is_empty`] so candidate generation can skip them.
//!
//! ## Pipeline
//!
//! 1. **Canonicalize**: lowercase, delete punctuation, collapse whitespace.
//! 2. **Shingle**: hash every overlapping `shingle_width`-character window
//!    (set semantics — duplicates within a document collapse).
//! 3. **MinHash**: `num_permutations` slot minima over the shingle set,
//!    batch or streaming ([`SignatureAccumulator`]), optionally parallel.
//! 4. **Band**: serialize `band_count` contiguous signature slices to
//!    comparable [`BandKey`]s for locality-sensitive bucketing.

pub mod bands;
pub mod config;
mod minhash;
mod shingles;

pub use crate::bands::{band_keys, BandKey};
pub use crate::config::{SignatureConfig, SignatureError};
pub use crate::minhash::{
    estimated_similarity, minhash_signature, SignatureAccumulator, EMPTY_SLOT,
};
pub use crate::shingles::{canonicalize_text, hash_windows, shingle_set};

/// Signature artifacts for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSignature {
    /// Number of distinct shingles the signature was computed from.
    pub shingle_count: usize,
    /// MinHash signature of length `num_permutations`.
    pub minhash: Vec<u64>,
}

impl DocumentSignature {
    /// True when the document produced no shingles. Empty documents carry
    /// identical sentinel signatures and must never reach banding, otherwise
    /// every empty document would collide with every other one.
    pub fn is_empty(&self) -> bool {
        self.shingle_count == 0
    }

    /// Band keys for this signature under `cfg`'s geometry.
    pub fn band_keys(&self, cfg: &SignatureConfig) -> Vec<BandKey> {
        band_keys(&self.minhash, cfg.band_count, cfg.rows_per_band)
    }
}

/// Compute the full signature for one document (canonicalize → shingle →
/// MinHash).
pub fn signature_for_text(
    text: &str,
    cfg: &SignatureConfig,
) -> Result<DocumentSignature, SignatureError> {
    cfg.validate()?;
    let shingles = shingle_set(text, cfg.shingle_width, cfg.seed);
    let minhash = minhash_signature(&shingles, cfg.num_permutations, cfg);
    Ok(DocumentSignature {
        shingle_count: shingles.len(),
        minhash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SignatureConfig {
        SignatureConfig::new().with_shingle_width(6)
    }

    #[test]
    fn signature_for_text_validates_config() {
        let cfg = SignatureConfig::new().with_band_count(9).with_rows_per_band(14);
        assert!(matches!(
            signature_for_text("anything", &cfg),
            Err(SignatureError::BandGeometryMismatch { .. })
        ));
    }

    #[test]
    fn punctuation_variants_share_a_signature() {
        let cfg = test_config();
        let a = signature_for_text("the quick brown fox jumps over the lazy dog", &cfg).unwrap();
        let b = signature_for_text("the quick brown fox jumps over the lazy dog.", &cfg).unwrap();
        assert_eq!(a.minhash, b.minhash);
        assert!(!a.is_empty());
    }

    #[test]
    fn empty_document_is_flagged() {
        let cfg = test_config();
        let sig = signature_for_text("?!", &cfg).unwrap();
        assert!(sig.is_empty());
        assert!(sig.minhash.iter().all(|&v| v == EMPTY_SLOT));
    }

    #[test]
    fn band_keys_cover_the_signature() {
        let cfg = test_config();
        let sig = signature_for_text("a reasonably long line of plain text", &cfg).unwrap();
        let keys = sig.band_keys(&cfg);
        assert_eq!(keys.len(), cfg.band_count);
        assert_eq!(sig.minhash.len(), cfg.band_count * cfg.rows_per_band);
    }

    #[test]
    fn identical_documents_collide_in_every_band() {
        let cfg = test_config();
        let text = "identical text identical bands identical keys";
        let a = signature_for_text(text, &cfg).unwrap();
        let b = signature_for_text(text, &cfg).unwrap();
        assert_eq!(a.band_keys(&cfg), b.band_keys(&cfg));
    }

    #[test]
    fn unrelated_documents_rarely_collide() {
        let cfg = test_config();
        let a = signature_for_text(
            "the quick brown fox jumps over the lazy dog near the river bank",
            &cfg,
        )
        .unwrap();
        let b = signature_for_text(
            "completely unrelated sentence about compilers and register allocation",
            &cfg,
        )
        .unwrap();
        let shared = a
            .band_keys(&cfg)
            .into_iter()
            .zip(b.band_keys(&cfg))
            .filter(|(x, y)| x == y)
            .count();
        assert_eq!(shared, 0);
    }
}
