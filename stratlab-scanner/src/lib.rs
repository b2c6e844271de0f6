//! StratLab Scanner — universe scanning orchestration over `stratlab-core`.
//!
//! This crate builds on `stratlab-core` to provide:
//! - Scan configuration (TOML) with content-addressed scan IDs
//! - Universe definitions with named themes, built-in or from TOML
//! - Daily-bar loading from CSV directories, with a deterministic synthetic
//!   fallback for offline work
//! - The scan orchestrator: parallel per-ticker pipeline plus the
//!   population-wide RS ranking barrier
//! - JSON/CSV artifact export with schema versioning

pub mod config;
pub mod data;
pub mod report;
pub mod scan;
pub mod universe;

pub use config::{ConfigError, ScanConfig, ScanId};
pub use data::{
    dataset_hash, generate_synthetic_daily, load_daily_csv, load_universe_csv, synthetic_universe,
    DataError, LoadedSeries, SymbolFailure,
};
pub use report::{export_json, export_signals_csv, import_json, load_artifacts, save_artifacts};
pub use scan::{
    apply_percentiles, run_scan, scan_ticker, RsEntry, ScanError, ScanReport, TickerSnapshot,
    SCHEMA_VERSION,
};
pub use universe::{Universe, UniverseError};
