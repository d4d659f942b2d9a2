//! Configuration and error types for signature computation.
//!
//! The signature layer is a pure function of `(text, config)`: no I/O, no
//! clocks, no process-global state. Two runs that share a config (seed
//! included) produce bit-identical signatures on any machine, which is what
//! makes the downstream clustering reproducible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters for shingling, MinHash, and LSH banding.
///
/// Changing any field changes which candidate pairs are found, so the whole
/// config is recorded in the run summary alongside output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureConfig {
    /// Configuration schema version. Any algorithmic change that can affect
    /// signatures must bump this so old artifacts stay comparable.
    pub version: u32,
    /// Shingle width in characters (character n-grams over canonicalized
    /// text, not word n-grams).
    pub shingle_width: usize,
    /// Number of MinHash permutations (signature length).
    pub num_permutations: usize,
    /// Number of LSH bands the signature is split into.
    pub band_count: usize,
    /// Number of signature positions per band.
    pub rows_per_band: usize,
    /// Seed for the deterministic hash family.
    pub seed: u64,
    /// Compute MinHash slots with rayon. Output is identical either way.
    pub use_parallel: bool,
}

impl SignatureConfig {
    /// Create a configuration with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shingle width. Typical values: 5-15 characters.
    pub fn with_shingle_width(mut self, width: usize) -> Self {
        self.shingle_width = width;
        self
    }

    /// Set the signature length (number of hash permutations).
    pub fn with_num_permutations(mut self, num_perm: usize) -> Self {
        self.num_permutations = num_perm;
        self
    }

    /// Set the number of LSH bands. More bands raise recall and the false
    /// positive rate; fewer bands do the opposite.
    pub fn with_band_count(mut self, bands: usize) -> Self {
        self.band_count = bands;
        self
    }

    /// Set the rows per band.
    pub fn with_rows_per_band(mut self, rows: usize) -> Self {
        self.rows_per_band = rows;
        self
    }

    /// Set the hash seed for reproducible results.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable parallel MinHash slot computation.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate the configuration.
    ///
    /// Banding must cover the signature exactly: `band_count * rows_per_band
    /// == num_permutations`. A partial final band would silently drop
    /// signature positions from candidate generation, so a mismatch is a
    /// configuration error rather than something to truncate around.
    pub fn validate(&self) -> Result<(), SignatureError> {
        if self.version < 1 {
            return Err(SignatureError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.shingle_width < 1 {
            return Err(SignatureError::InvalidShingleWidth {
                width: self.shingle_width,
            });
        }
        if self.num_permutations < 1 {
            return Err(SignatureError::InvalidPermutations {
                num_perm: self.num_permutations,
            });
        }
        if self.band_count < 1 {
            return Err(SignatureError::InvalidBandCount {
                bands: self.band_count,
            });
        }
        if self.rows_per_band < 1 {
            return Err(SignatureError::InvalidRowsPerBand {
                rows: self.rows_per_band,
            });
        }

        match self.band_count.checked_mul(self.rows_per_band) {
            Some(covered) if covered == self.num_permutations => Ok(()),
            _ => Err(SignatureError::BandGeometryMismatch {
                bands: self.band_count,
                rows: self.rows_per_band,
                num_perm: self.num_permutations,
            }),
        }
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            version: 1,
            shingle_width: 13,
            num_permutations: 128,
            band_count: 16,
            rows_per_band: 8,
            seed: 0xBEEF_FACE_CAFE_F00D,
            use_parallel: false,
        }
    }
}

/// Errors returned by the signature layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: shingle_width must be >= 1 (got {width})")]
    InvalidShingleWidth { width: usize },

    #[error("invalid config: num_permutations must be >= 1 (got {num_perm})")]
    InvalidPermutations { num_perm: usize },

    #[error("invalid config: band_count must be >= 1 (got {bands})")]
    InvalidBandCount { bands: usize },

    #[error("invalid config: rows_per_band must be >= 1 (got {rows})")]
    InvalidRowsPerBand { rows: usize },

    #[error(
        "invalid config: bands={bands} x rows={rows} must cover num_permutations={num_perm} exactly"
    )]
    BandGeometryMismatch {
        bands: usize,
        rows: usize,
        num_perm: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = SignatureConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.shingle_width, 13);
        assert_eq!(cfg.num_permutations, 128);
        assert_eq!(cfg.band_count, 16);
        assert_eq!(cfg.rows_per_band, 8);
        assert!(!cfg.use_parallel);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let cfg = SignatureConfig::new()
            .with_shingle_width(6)
            .with_num_permutations(64)
            .with_band_count(8)
            .with_rows_per_band(8)
            .with_seed(42)
            .with_parallel(true);

        assert_eq!(cfg.shingle_width, 6);
        assert_eq!(cfg.num_permutations, 64);
        assert_eq!(cfg.band_count, 8);
        assert_eq!(cfg.rows_per_band, 8);
        assert_eq!(cfg.seed, 42);
        assert!(cfg.use_parallel);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_validate_rejects_zero_fields() {
        assert!(matches!(
            SignatureConfig::new().with_shingle_width(0).validate(),
            Err(SignatureError::InvalidShingleWidth { width: 0 })
        ));
        assert!(matches!(
            SignatureConfig::new().with_num_permutations(0).validate(),
            Err(SignatureError::InvalidPermutations { num_perm: 0 })
        ));
        assert!(matches!(
            SignatureConfig::new().with_band_count(0).validate(),
            Err(SignatureError::InvalidBandCount { bands: 0 })
        ));
        assert!(matches!(
            SignatureConfig::new().with_rows_per_band(0).validate(),
            Err(SignatureError::InvalidRowsPerBand { rows: 0 })
        ));
    }

    #[test]
    fn config_validate_rejects_version_zero() {
        let cfg = SignatureConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SignatureError::InvalidConfigVersion { version: 0 })
        ));
    }

    #[test]
    fn band_geometry_must_cover_signature_exactly() {
        // 9 x 14 = 126 != 128: two signature positions would never be banded.
        let cfg = SignatureConfig::new().with_band_count(9).with_rows_per_band(14);
        assert!(matches!(
            cfg.validate(),
            Err(SignatureError::BandGeometryMismatch {
                bands: 9,
                rows: 14,
                num_perm: 128,
            })
        ));

        // Over-coverage is just as wrong.
        let cfg = SignatureConfig::new().with_band_count(32).with_rows_per_band(8);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn band_geometry_overflow_is_a_mismatch() {
        let cfg = SignatureConfig::new()
            .with_band_count(usize::MAX)
            .with_rows_per_band(2);
        assert!(matches!(
            cfg.validate(),
            Err(SignatureError::BandGeometryMismatch { .. })
        ));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = SignatureConfig::new().with_shingle_width(6).with_seed(7);
        let serialized = serde_json::to_string(&cfg).unwrap();
        let deserialized: SignatureConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }

    #[test]
    fn error_display_mentions_geometry() {
        let err = SignatureError::BandGeometryMismatch {
            bands: 9,
            rows: 14,
            num_perm: 128,
        };
        let msg = err.to_string();
        assert!(msg.contains("bands=9"));
        assert!(msg.contains("128"));
    }
}
