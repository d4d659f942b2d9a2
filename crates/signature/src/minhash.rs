//! MinHash signature computation.
//!
//! Fixed-length signatures over hashed shingle sets, using a family of hash
//! functions derived from a single 64-bit seed. Deterministic across
//! threads, processes, and machines; the expected fraction of agreeing
//! signature positions approximates the Jaccard similarity of the
//! underlying shingle sets.

use rayon::prelude::*;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::config::SignatureConfig;

/// Sentinel slot value for documents with no shingles. A signature of all
/// sentinels never enters candidate generation, so empty documents cannot
/// flood the clustering with false matches.
pub const EMPTY_SLOT: u64 = u64::MAX;

/// Compute a MinHash signature (parallel if `cfg.use_parallel`).
///
/// Produces `num_perm` values; each is the minimum over all shingles of that
/// slot's permutation hash. An empty shingle set yields all [`EMPTY_SLOT`]s.
pub fn minhash_signature(unique_shingles: &[u64], num_perm: usize, cfg: &SignatureConfig) -> Vec<u64> {
    if num_perm == 0 {
        return Vec::new();
    }
    if unique_shingles.is_empty() {
        return vec![EMPTY_SLOT; num_perm];
    }

    let mut result = Vec::with_capacity(num_perm);
    if cfg.use_parallel {
        (0..num_perm)
            .into_par_iter()
            .map(|slot| compute_slot(unique_shingles, slot, cfg.seed))
            .collect_into_vec(&mut result);
    } else {
        for slot in 0..num_perm {
            result.push(compute_slot(unique_shingles, slot, cfg.seed));
        }
    }
    result
}

/// Estimate Jaccard similarity from two signatures of equal length as the
/// fraction of agreeing positions. Two all-sentinel signatures are reported
/// as dissimilar: empty documents are not near-duplicates of each other.
pub fn estimated_similarity(a: &[u64], b: &[u64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "signatures must share a length");
    if a.is_empty() || a.iter().all(|&v| v == EMPTY_SLOT) || b.iter().all(|&v| v == EMPTY_SLOT) {
        return 0.0;
    }
    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matches as f64 / a.len() as f64
}

/// Streaming MinHash accumulator.
///
/// Feeds shingles one at a time and produces exactly the same signature as
/// [`minhash_signature`]; the minimum per slot is order-independent, so a
/// very large document never needs its full shingle set in memory.
#[derive(Debug, Clone)]
pub struct SignatureAccumulator {
    keys: Vec<u64>,
    mins: Vec<u64>,
}

impl SignatureAccumulator {
    pub fn new(num_perm: usize, seed: u64) -> Self {
        let keys = (0..num_perm).map(|slot| slot_key(slot, seed)).collect();
        Self {
            keys,
            mins: vec![EMPTY_SLOT; num_perm],
        }
    }

    /// Fold one shingle hash into every slot.
    pub fn update(&mut self, shingle: u64) {
        for (min, &key) in self.mins.iter_mut().zip(self.keys.iter()) {
            let h = mix_u64(shingle, key);
            if h < *min {
                *min = h;
            }
        }
    }

    /// Finish and return the signature. All-sentinel when no shingle was
    /// ever folded in.
    pub fn finish(self) -> Vec<u64> {
        self.mins
    }
}

/// Computes a single slot of the signature.
#[inline]
pub(crate) fn compute_slot(unique_shingles: &[u64], slot: usize, seed: u64) -> u64 {
    let key = slot_key(slot, seed);
    let mut minv = u64::MAX;
    for &val in unique_shingles {
        let h = mix_u64(val, key);
        if h < minv {
            minv = h;
        }
    }
    minv
}

/// Derive the per-slot permutation key from the run seed. Each slot gets a
/// distinct key via a golden-ratio step through splitmix64.
#[inline]
fn slot_key(slot: usize, seed: u64) -> u64 {
    let step = (slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    splitmix64(seed.wrapping_add(step))
}

/// Mix a shingle hash with a permutation key into a well-distributed value.
#[inline]
pub(crate) fn mix_u64(x: u64, key: u64) -> u64 {
    let mut h = xxh3_64_with_seed(&x.to_le_bytes(), key);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ceb9fe1a85ec53);
    h ^ (h >> 33)
}

/// Fast 64-bit finalizer with good distribution.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
