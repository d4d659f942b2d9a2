//! Character shingling over canonicalized text.
//!
//! Shingles are all overlapping `width`-character windows of the
//! canonicalized text, hashed to 64 bits. Canonicalization is deliberately
//! minimal — lowercase, punctuation deletion, whitespace collapsing — and is
//! separate from the heavyweight normalization the upstream collaborator
//! performs before text reaches this crate.

use unicode_categories::UnicodeCategories;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Canonicalize text for shingling: lowercase, delete punctuation, collapse
/// whitespace runs to single spaces, trim.
///
/// Punctuation is deleted, not replaced by a space, so `don't` and `dont`
/// shingle identically while `a.b` does not split into two tokens.
pub fn canonicalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
            continue;
        }
        if ch.is_punctuation() {
            continue;
        }
        // Lowercasing can expand one character into several (German ß → ss).
        for lower in ch.to_lowercase() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(lower);
        }
    }
    out
}

/// Hashed shingle set of `text`: every overlapping `width`-character window
/// of the canonicalized text, hashed with XXH3 under `seed`, deduplicated.
///
/// Returns an empty set when the canonical text is shorter than `width`
/// characters. Pure and deterministic for a given `(text, width, seed)`.
pub fn shingle_set(text: &str, width: usize, seed: u64) -> Vec<u64> {
    let canon = canonicalize_text(text);
    hash_windows(&canon, width, seed)
}

/// Windowing over already-canonical text. Split out so callers that batch
/// canonicalization can reuse it.
pub fn hash_windows(canonical: &str, width: usize, seed: u64) -> Vec<u64> {
    if width == 0 {
        return Vec::new();
    }
    // Byte offset of every char boundary; windows are char-based, slices
    // byte-based.
    let bounds: Vec<usize> = canonical.char_indices().map(|(i, _)| i).collect();
    if bounds.len() < width {
        return Vec::new();
    }

    let mut hashes = Vec::with_capacity(bounds.len() - width + 1);
    for start in 0..=(bounds.len() - width) {
        let lo = bounds[start];
        let hi = if start + width < bounds.len() {
            bounds[start + width]
        } else {
            canonical.len()
        };
        hashes.push(xxh3_64_with_seed(canonical[lo..hi].as_bytes(), seed));
    }
    // Set semantics: duplicate windows within one document collapse.
    hashes.sort_unstable();
    hashes.dedup();
    hashes
}
