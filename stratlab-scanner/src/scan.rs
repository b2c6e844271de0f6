//! Scan orchestration — per-ticker pipeline fan-out and the ranking barrier.
//!
//! A scan runs in two phases with a hard ordering dependency:
//! 1. Fan-out: every ticker is scanned independently (aggregate, classify,
//!    match, verdicts, performance, raw RS). Tickers share no mutable state,
//!    so this phase runs on parallel workers.
//! 2. Fan-in: once every ticker's raw RS values exist, the percentile pass
//!    converts them population-wide per (timeframe, as-of date) key.
//!
//! A ticker with no data degrades to a recorded failure, and a benchmark
//! with no data leaves every relative strength surface absent; neither
//! aborts the batch.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stratlab_core::domain::{Bar, StratType, Symbol, Timeframe};
use stratlab_core::rs::{rank_snapshot, rs_raw, RsPercentiles, RsRaw, RsSnapshot};
use stratlab_core::{
    aggregate_ladder, classify_series, continuity, scan_latest, triangle_verdict,
    ContinuityVerdict, DailyStats, PerformanceMetrics, SignalMatch,
};

use crate::config::{ScanConfig, ScanId};
use crate::data::{LoadedSeries, SymbolFailure};

/// Current schema version for persisted scan reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from the scan orchestrator.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("universe is empty")]
    EmptyUniverse,
}

/// Relative strength for one (ticker, timeframe): the pass-1 raw values plus
/// the pass-2 percentiles filled in at the barrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsEntry {
    /// Latest aggregated bar date for this timeframe; the ranking population
    /// key is (timeframe, as_of).
    pub as_of: NaiveDate,
    pub raw: RsRaw,
    #[serde(default)]
    pub percentiles: RsPercentiles,
}

/// Everything the pipeline derives for one ticker in one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub symbol: Symbol,
    /// Latest daily bar date at scan time.
    pub as_of: NaiveDate,
    /// Latest daily bar.
    pub latest: Bar,
    /// Latest classification tag per ladder timeframe.
    pub tags: BTreeMap<Timeframe, StratType>,
    pub continuity: ContinuityVerdict,
    pub triangle: bool,
    pub performance: PerformanceMetrics,
    pub stats: DailyStats,
    /// Relative strength per ladder timeframe, against the scan benchmark.
    pub rs: BTreeMap<Timeframe, RsEntry>,
    /// Every catalogue match across the ladder, for the latest bar of each
    /// timeframe.
    pub matches: Vec<SignalMatch>,
}

/// Complete output of one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub scan_id: ScanId,
    pub benchmark: Symbol,
    /// Latest daily date across all scanned tickers; absent when every
    /// ticker failed.
    pub as_of: Option<NaiveDate>,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub snapshots: Vec<TickerSnapshot>,
    pub failures: Vec<SymbolFailure>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ScanReport {
    /// Total catalogue matches across all tickers.
    pub fn signal_count(&self) -> usize {
        self.snapshots.iter().map(|s| s.matches.len()).sum()
    }
}

/// Run the full pipeline for one ticker. `None` when the series is empty.
///
/// Pure over its inputs; the RS percentile fields stay at their default
/// until the population-wide barrier pass.
pub fn scan_ticker(
    symbol: &str,
    daily: &[Bar],
    benchmark_ladder: &BTreeMap<Timeframe, Vec<Bar>>,
) -> Option<TickerSnapshot> {
    let latest = daily.last()?.clone();
    let as_of = latest.date;
    let ladder = aggregate_ladder(daily);

    let mut tags: BTreeMap<Timeframe, StratType> = BTreeMap::new();
    let mut matches: Vec<SignalMatch> = Vec::new();
    let mut rs: BTreeMap<Timeframe, RsEntry> = BTreeMap::new();

    for (tf, bars) in &ladder {
        let series_tags = classify_series(bars);
        if let Some(tag) = series_tags.last() {
            tags.insert(*tf, *tag);
        }
        matches.extend(scan_latest(symbol, *tf, bars, &series_tags));

        if let (Some(bar), Some(bench)) = (bars.last(), benchmark_ladder.get(tf)) {
            rs.insert(
                *tf,
                RsEntry {
                    as_of: bar.date,
                    raw: rs_raw(bars, bench),
                    percentiles: RsPercentiles::default(),
                },
            );
        }
    }

    let verdict = continuity(&ladder);
    let triangle = triangle_verdict(&ladder);
    let performance = PerformanceMetrics::compute(daily, as_of);
    let stats = DailyStats::compute(daily);

    Some(TickerSnapshot {
        symbol: symbol.to_string(),
        as_of,
        latest,
        tags,
        continuity: verdict,
        triangle,
        performance,
        stats,
        rs,
        matches,
    })
}

/// The ranking barrier: convert every snapshot's raw RS values into
/// percentiles, population-wide.
///
/// Populations are keyed by (timeframe, as-of date); tickers whose latest
/// bar for a timeframe lands on a different date rank in separate
/// populations. Requires pass 1 complete for every snapshot — this function
/// must not run while tickers are still being scanned.
pub fn apply_percentiles(snapshots: &mut [TickerSnapshot]) {
    let mut populations: BTreeMap<(Timeframe, NaiveDate), RsSnapshot> = BTreeMap::new();
    for snapshot in snapshots.iter() {
        for (tf, entry) in &snapshot.rs {
            populations
                .entry((*tf, entry.as_of))
                .or_insert_with(|| RsSnapshot::new(*tf, entry.as_of))
                .insert(snapshot.symbol.clone(), entry.raw);
        }
    }

    let ranked: BTreeMap<(Timeframe, NaiveDate), BTreeMap<Symbol, RsPercentiles>> = populations
        .iter()
        .map(|(key, population)| (*key, rank_snapshot(population)))
        .collect();

    for snapshot in snapshots.iter_mut() {
        for (tf, entry) in snapshot.rs.iter_mut() {
            if let Some(percentiles) = ranked
                .get(&(*tf, entry.as_of))
                .and_then(|by_symbol| by_symbol.get(&snapshot.symbol))
            {
                entry.percentiles = *percentiles;
            }
        }
    }
}

/// Bars at or before the as-of cutoff; the whole series when no cutoff.
fn truncate(daily: &[Bar], as_of: Option<NaiveDate>) -> &[Bar] {
    match as_of {
        Some(cutoff) => {
            let end = daily.partition_point(|bar| bar.date <= cutoff);
            &daily[..end]
        }
        None => daily,
    }
}

/// Run a scan over loaded data: fan out per ticker, fan in, rank, report.
///
/// Worker layout from `config.workers`: 1 runs sequentially, 0 uses the
/// global Rayon pool, anything else builds a bounded pool. All three produce
/// identical reports. A benchmark with no bars in the scan range records a
/// failure and leaves every ticker's RS map empty.
pub fn run_scan(
    config: &ScanConfig,
    data: &LoadedSeries,
    symbols: &[Symbol],
) -> Result<ScanReport, ScanError> {
    if symbols.is_empty() {
        return Err(ScanError::EmptyUniverse);
    }

    let benchmark_ladder = data
        .bars
        .get(&config.benchmark)
        .map(|bars| truncate(bars, config.as_of))
        .filter(|bars| !bars.is_empty())
        .map(aggregate_ladder)
        .unwrap_or_default();

    let scan_one = |symbol: &Symbol| -> (Symbol, Option<TickerSnapshot>) {
        let snapshot = data
            .bars
            .get(symbol)
            .map(|bars| truncate(bars, config.as_of))
            .and_then(|daily| scan_ticker(symbol, daily, &benchmark_ladder));
        (symbol.clone(), snapshot)
    };

    let results: Vec<(Symbol, Option<TickerSnapshot>)> = match config.workers {
        1 => symbols.iter().map(scan_one).collect(),
        0 => symbols.par_iter().map(scan_one).collect(),
        n => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .expect("failed to build Rayon thread pool")
            .install(|| symbols.par_iter().map(scan_one).collect()),
    };

    let mut snapshots: Vec<TickerSnapshot> = Vec::new();
    let mut failures: Vec<SymbolFailure> = data.failures.clone();
    if benchmark_ladder.is_empty() && !failures.iter().any(|f| f.symbol == config.benchmark) {
        failures.push(SymbolFailure {
            symbol: config.benchmark.clone(),
            reason: "benchmark has no bar data in the scan range".to_string(),
        });
    }
    for (symbol, snapshot) in results {
        match snapshot {
            Some(s) => snapshots.push(s),
            None => {
                // loading may already have recorded this symbol
                if !failures.iter().any(|f| f.symbol == symbol) {
                    failures.push(SymbolFailure {
                        symbol,
                        reason: "no bar data in scan range".to_string(),
                    });
                }
            }
        }
    }

    apply_percentiles(&mut snapshots);

    let as_of = snapshots.iter().map(|s| s.as_of).max();
    Ok(ScanReport {
        schema_version: SCHEMA_VERSION,
        scan_id: config.scan_id(),
        benchmark: config.benchmark.clone(),
        as_of,
        dataset_hash: data.dataset_hash.clone(),
        has_synthetic: data.synthetic,
        snapshots,
        failures,
    })
}
