//! YAML configuration file support.
//!
//! A run can be configured from a single YAML document covering both the
//! signature parameters and the pipeline runtime knobs:
//!
//! ```yaml
//! version: "1.0"
//! name: "nightly corpus dedup"
//!
//! signature:
//!   version: 1
//!   shingle_width: 13
//!   num_permutations: 128
//!   band_count: 16
//!   rows_per_band: 8
//!   seed: 1732584193
//!   use_parallel: false
//!
//! pipeline:
//!   reader_workers: 4
//!   channel_capacity: 1024
//!   max_band_keys: 50000000
//! ```
//!
//! Loading validates the assembled [`DedupConfig`], so a band geometry that
//! fails to cover the signature is rejected at load time, not mid-run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use signature::SignatureConfig;
use thiserror::Error;

use crate::pipeline::DedupConfig;

/// Errors that can occur when loading YAML configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NeardupConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Signature stage parameters.
    #[serde(default)]
    pub signature: SignatureSection,

    /// Pipeline runtime parameters.
    #[serde(default)]
    pub pipeline: PipelineSection,
}

impl NeardupConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: NeardupConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Assemble the runtime [`DedupConfig`] this document describes.
    pub fn to_dedup_config(&self) -> DedupConfig {
        DedupConfig {
            signature: SignatureConfig {
                version: self.signature.version,
                shingle_width: self.signature.shingle_width,
                num_permutations: self.signature.num_permutations,
                band_count: self.signature.band_count,
                rows_per_band: self.signature.rows_per_band,
                seed: self.signature.seed,
                use_parallel: self.signature.use_parallel,
            },
            reader_workers: self.pipeline.reader_workers,
            channel_capacity: self.pipeline.channel_capacity,
            max_band_keys: self.pipeline.max_band_keys,
        }
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.to_dedup_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))
    }
}

impl Default for NeardupConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            signature: SignatureSection::default(),
            pipeline: PipelineSection::default(),
        }
    }
}

/// Signature stage section, mirroring [`SignatureConfig`] with serde
/// defaults so partial documents work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureSection {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_shingle_width")]
    pub shingle_width: usize,

    #[serde(default = "default_num_permutations")]
    pub num_permutations: usize,

    #[serde(default = "default_band_count")]
    pub band_count: usize,

    #[serde(default = "default_rows_per_band")]
    pub rows_per_band: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub use_parallel: bool,
}

impl Default for SignatureSection {
    fn default() -> Self {
        let cfg = SignatureConfig::default();
        Self {
            version: cfg.version,
            shingle_width: cfg.shingle_width,
            num_permutations: cfg.num_permutations,
            band_count: cfg.band_count,
            rows_per_band: cfg.rows_per_band,
            seed: cfg.seed,
            use_parallel: cfg.use_parallel,
        }
    }
}

/// Pipeline runtime section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    #[serde(default = "default_reader_workers")]
    pub reader_workers: usize,

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default)]
    pub max_band_keys: Option<usize>,
}

impl Default for PipelineSection {
    fn default() -> Self {
        let cfg = DedupConfig::default();
        Self {
            reader_workers: cfg.reader_workers,
            channel_capacity: cfg.channel_capacity,
            max_band_keys: cfg.max_band_keys,
        }
    }
}

// Helper functions for serde defaults.
fn default_version() -> u32 {
    SignatureConfig::default().version
}
fn default_shingle_width() -> usize {
    SignatureConfig::default().shingle_width
}
fn default_num_permutations() -> usize {
    SignatureConfig::default().num_permutations
}
fn default_band_count() -> usize {
    SignatureConfig::default().band_count
}
fn default_rows_per_band() -> usize {
    SignatureConfig::default().rows_per_band
}
fn default_seed() -> u64 {
    SignatureConfig::default().seed
}
fn default_reader_workers() -> usize {
    DedupConfig::default().reader_workers
}
fn default_channel_capacity() -> usize {
    DedupConfig::default().channel_capacity
}
