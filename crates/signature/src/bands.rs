//! LSH band keys.
//!
//! A signature is split into `band_count` contiguous slices of
//! `rows_per_band` values; each slice serializes to a [`BandKey`]. Documents
//! whose signatures agree on any whole band become candidate duplicates.

use std::fmt;

/// Serialized band: the raw big-endian byte dump of one signature slice.
///
/// Big-endian keeps the serialization endian-consistent across machines, and
/// the raw dump is injective over the slice values, so two documents share a
/// key only when the whole band agrees.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BandKey(Box<[u8]>);

impl BandKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for BandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BandKey(")?;
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Split `signature` into exactly `band_count` band keys.
///
/// Callers validate the geometry up front (`band_count * rows_per_band ==
/// signature.len()`); a partial band would silently drop signature
/// positions, which is exactly the configuration bug the validation exists
/// to catch.
pub fn band_keys(signature: &[u64], band_count: usize, rows_per_band: usize) -> Vec<BandKey> {
    debug_assert_eq!(
        signature.len(),
        band_count * rows_per_band,
        "band geometry must cover the signature exactly"
    );

    let mut keys = Vec::with_capacity(band_count);
    for band in signature.chunks_exact(rows_per_band) {
        let mut bytes = Vec::with_capacity(rows_per_band * 8);
        for value in band {
            bytes.extend_from_slice(&value.to_be_bytes());
        }
        keys.push(BandKey(bytes.into_boxed_slice()));
    }
    keys
}
