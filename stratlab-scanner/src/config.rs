//! Serializable scan configuration.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a scan run (content-addressable hash).
pub type ScanId = String;

/// Errors from loading a scan configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for a single scan over a ticker universe.
///
/// Captures everything needed to reproduce the scan: the benchmark, the
/// universe selection, the data source, and the worker layout. Every field
/// has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    /// Benchmark symbol for relative-strength ratios.
    #[serde(default = "default_benchmark")]
    pub benchmark: String,

    /// Restrict the scan to one universe theme. `None` scans everything.
    #[serde(default)]
    pub theme: Option<String>,

    /// Universe file (TOML theme map). `None` uses the built-in universe.
    #[serde(default)]
    pub universe_file: Option<PathBuf>,

    /// Directory of per-symbol daily CSV files. `None` means synthetic data.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Scan as-of date: bars after this date are ignored. `None` uses the
    /// full series.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,

    /// Scan worker count: 1 = sequential, 0 = Rayon default.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bars per symbol when generating synthetic data.
    #[serde(default = "default_synthetic_bars")]
    pub synthetic_bars: usize,

    /// Seed for the synthetic generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_benchmark() -> String {
    "SPY".to_string()
}

fn default_workers() -> usize {
    0
}

fn default_synthetic_bars() -> usize {
    500
}

fn default_seed() -> u64 {
    42
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            benchmark: default_benchmark(),
            theme: None,
            universe_file: None,
            data_dir: None,
            as_of: None,
            workers: default_workers(),
            synthetic_bars: default_synthetic_bars(),
            seed: default_seed(),
        }
    }
}

impl ScanConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two scans with identical configs share a ScanId; a rerun under the
    /// same id is an authoritative overwrite of the previous report.
    pub fn scan_id(&self) -> ScanId {
        let json = serde_json::to_string(self).expect("ScanConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}
