//! StratLab CLI — scan, inspect and universe commands.
//!
//! Commands:
//! - `scan` — scan a universe (CSV dir or synthetic) and write artifacts
//! - `inspect` — one ticker's tag ladder, verdicts, performance and raw RS
//! - `universe` — print the resolved universe themes and tickers

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stratlab_core::domain::{Symbol, Timeframe};
use stratlab_core::{aggregate_ladder, ContinuityVerdict};
use stratlab_scanner::{
    load_universe_csv, run_scan, save_artifacts, scan_ticker, synthetic_universe, LoadedSeries,
    ScanConfig, ScanReport, TickerSnapshot, Universe,
};

#[derive(Parser)]
#[command(
    name = "stratlab",
    about = "StratLab CLI — multi-timeframe candlestick scanner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a universe, write report artifacts, and print a summary table.
    Scan {
        /// Path to a TOML scan config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Universe theme (e.g. tech, index). Defaults to every theme.
        #[arg(long)]
        theme: Option<String>,

        /// Universe TOML file. Defaults to the built-in universe.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Directory of per-symbol CSV files. Without it, synthetic data.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Scan as of this date (YYYY-MM-DD). Defaults to the latest bar.
        #[arg(long)]
        as_of: Option<String>,

        /// Benchmark symbol for relative strength.
        #[arg(long)]
        benchmark: Option<String>,

        /// Worker threads: 1 = sequential, 0 = Rayon default.
        #[arg(long)]
        workers: Option<usize>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Print one ticker's tag ladder, verdicts, performance and raw RS.
    Inspect {
        /// Ticker symbol.
        symbol: String,

        /// Directory of per-symbol CSV files. Without it, synthetic data.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Benchmark symbol for relative strength.
        #[arg(long, default_value = "SPY")]
        benchmark: String,

        /// Synthetic series seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Synthetic series length in bars.
        #[arg(long, default_value_t = 500)]
        bars: usize,

        /// Print the full snapshot as JSON instead of the table view.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the resolved universe themes and tickers.
    Universe {
        /// Universe TOML file. Defaults to the built-in universe.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Restrict to one theme.
        #[arg(long)]
        theme: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            theme,
            universe,
            data_dir,
            as_of,
            benchmark,
            workers,
            output_dir,
        } => run_scan_cmd(
            config, theme, universe, data_dir, as_of, benchmark, workers, output_dir,
        ),
        Commands::Inspect {
            symbol,
            data_dir,
            benchmark,
            seed,
            bars,
            json,
        } => run_inspect(&symbol, data_dir, &benchmark, seed, bars, json),
        Commands::Universe { universe, theme } => run_universe_cmd(universe, theme),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_scan_cmd(
    config_path: Option<PathBuf>,
    theme: Option<String>,
    universe_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    as_of: Option<String>,
    benchmark: Option<String>,
    workers: Option<usize>,
    output_dir: PathBuf,
) -> Result<()> {
    // Config file first, CLI flags override named fields
    let mut config = match &config_path {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };
    if let Some(b) = benchmark {
        config.benchmark = b;
    }
    if let Some(t) = theme {
        config.theme = Some(t);
    }
    if let Some(u) = universe_path {
        config.universe_file = Some(u);
    }
    if let Some(d) = data_dir {
        config.data_dir = Some(d);
    }
    if let Some(w) = workers {
        config.workers = w;
    }
    if let Some(s) = as_of {
        config.as_of = Some(NaiveDate::parse_from_str(&s, "%Y-%m-%d")?);
    }

    let universe = match &config.universe_file {
        Some(path) => Universe::from_file(path)?,
        None => Universe::builtin(),
    };
    let tickers = universe.tickers(config.theme.as_deref())?;

    // the benchmark series must load even when it is outside the universe
    let mut load_list = tickers.clone();
    if !load_list.contains(&config.benchmark) {
        load_list.push(config.benchmark.clone());
    }
    let data = load_data(&config, &load_list);

    let report = run_scan(&config, &data, &tickers)?;
    print_scan_summary(&report);

    let scan_dir = save_artifacts(&report, &output_dir)?;
    println!("Artifacts saved to: {}", scan_dir.display());

    Ok(())
}

fn run_inspect(
    symbol: &str,
    data_dir: Option<PathBuf>,
    benchmark: &str,
    seed: u64,
    bars: usize,
    json: bool,
) -> Result<()> {
    let mut load_list: Vec<Symbol> = vec![symbol.to_string()];
    if symbol != benchmark {
        load_list.push(benchmark.to_string());
    }
    let config = ScanConfig {
        data_dir,
        seed,
        synthetic_bars: bars,
        ..ScanConfig::default()
    };
    let data = load_data(&config, &load_list);
    for failure in &data.failures {
        eprintln!("Error for {}: {}", failure.symbol, failure.reason);
    }

    let Some(daily) = data.bars.get(symbol) else {
        bail!("no bar data for '{symbol}'");
    };
    let benchmark_ladder = data
        .bars
        .get(benchmark)
        .map(|series| aggregate_ladder(series))
        .unwrap_or_default();
    let Some(snapshot) = scan_ticker(symbol, daily, &benchmark_ladder) else {
        bail!("no bar data for '{symbol}'");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_inspect(&snapshot, data.synthetic);
    }
    Ok(())
}

fn run_universe_cmd(universe_path: Option<PathBuf>, theme: Option<String>) -> Result<()> {
    let universe = match &universe_path {
        Some(path) => Universe::from_file(path)?,
        None => Universe::builtin(),
    };

    match theme.as_deref() {
        Some(name) => {
            let tickers = universe.tickers(Some(name))?;
            println!("{name} ({} tickers):", tickers.len());
            println!("  {}", tickers.join(" "));
        }
        None => {
            for name in universe.theme_names() {
                let tickers = universe.tickers(Some(name))?;
                println!("{name} ({} tickers):", tickers.len());
                println!("  {}", tickers.join(" "));
            }
            let all = universe.tickers(None)?;
            println!();
            println!("Total: {} unique tickers", all.len());
        }
    }
    Ok(())
}

/// CSV directory when configured, deterministic synthetic series otherwise.
fn load_data(config: &ScanConfig, symbols: &[Symbol]) -> LoadedSeries {
    match &config.data_dir {
        Some(dir) => load_universe_csv(dir, symbols),
        None => synthetic_universe(symbols, config.seed, config.synthetic_bars),
    }
}

fn continuity_label(verdict: ContinuityVerdict) -> &'static str {
    match verdict {
        ContinuityVerdict::Bullish => "bullish",
        ContinuityVerdict::Bearish => "bearish",
        ContinuityVerdict::Mixed => "mixed",
    }
}

fn format_dollars(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else {
        format!("${value:.0}")
    }
}

fn print_scan_summary(report: &ScanReport) {
    println!();
    println!("=== Scan Report ===");
    println!(
        "Scan ID:        {}",
        &report.scan_id[..report.scan_id.len().min(12)]
    );
    println!("Benchmark:      {}", report.benchmark);
    if let Some(as_of) = report.as_of {
        println!("As of:          {as_of}");
    }
    println!(
        "Tickers:        {} scanned, {} failed",
        report.snapshots.len(),
        report.failures.len()
    );
    println!("Signals:        {}", report.signal_count());
    println!(
        "Dataset:        {}",
        &report.dataset_hash[..report.dataset_hash.len().min(12)]
    );

    println!();
    println!(
        "{:<8} {:>4} {:>4} {:>4}  {:<8} {:<4} {:>8} {:>6}",
        "Symbol", "1D", "1W", "1M", "Cont", "Tri", "YTD%", "RS3M"
    );
    println!("{}", "-".repeat(54));
    for snap in &report.snapshots {
        let tag = |tf: Timeframe| {
            snap.tags
                .get(&tf)
                .map(|t| t.as_str())
                .unwrap_or("-")
        };
        let rs_3m = snap
            .rs
            .get(&Timeframe::Day1)
            .and_then(|entry| entry.percentiles.rs_3m)
            .map(|p| format!("{p:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>4} {:>4} {:>4}  {:<8} {:<4} {:>8.2} {:>6}",
            snap.symbol,
            tag(Timeframe::Day1),
            tag(Timeframe::Week1),
            tag(Timeframe::Month1),
            continuity_label(snap.continuity),
            if snap.triangle { "yes" } else { "no" },
            snap.performance.ytd,
            rs_3m,
        );
    }

    if report.signal_count() > 0 {
        println!();
        println!("--- Signals ---");
        for snap in &report.snapshots {
            for m in &snap.matches {
                println!(
                    "{:<8} {:<4} {:<18} [{:?}]",
                    m.symbol,
                    m.timeframe.as_str(),
                    m.setup,
                    m.status
                );
            }
        }
    }

    for failure in &report.failures {
        println!("WARNING: {} skipped: {}", failure.symbol, failure.reason);
    }
    if report.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_inspect(snapshot: &TickerSnapshot, synthetic: bool) {
    println!();
    println!("=== {} ===", snapshot.symbol);
    println!("As of:          {}", snapshot.as_of);
    println!("Latest close:   {:.2}", snapshot.latest.close);
    println!("Continuity:     {}", continuity_label(snapshot.continuity));
    println!(
        "Triangle:       {}",
        if snapshot.triangle { "yes" } else { "no" }
    );

    println!();
    println!("--- Ladder ---");
    println!(
        "{:<4} {:>4} {:>12} {:>8} {:>8} {:>8} {:>8}",
        "TF", "Tag", "Last Bar", "RS 1", "RS 5", "RS 21", "RS 63"
    );
    println!("{}", "-".repeat(58));
    for tf in Timeframe::LADDER {
        let tag = snapshot
            .tags
            .get(&tf)
            .map(|t| t.as_str())
            .unwrap_or("-");
        let entry = snapshot.rs.get(&tf);
        let date = entry
            .map(|e| e.as_of.to_string())
            .unwrap_or_else(|| "-".to_string());
        let rs_cell = |value: Option<f64>| {
            value
                .map(|v| format!("{v:+.4}"))
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "{:<4} {:>4} {:>12} {:>8} {:>8} {:>8} {:>8}",
            tf.as_str(),
            tag,
            date,
            rs_cell(entry.and_then(|e| e.raw.rs_1d)),
            rs_cell(entry.and_then(|e| e.raw.rs_1w)),
            rs_cell(entry.and_then(|e| e.raw.rs_1m)),
            rs_cell(entry.and_then(|e| e.raw.rs_3m)),
        );
    }

    println!();
    println!("--- Performance ---");
    println!("WTD:            {:+.2}%", snapshot.performance.wtd);
    println!("MTD:            {:+.2}%", snapshot.performance.mtd);
    println!("QTD:            {:+.2}%", snapshot.performance.qtd);
    println!("YTD:            {:+.2}%", snapshot.performance.ytd);
    println!("ADR:            {:.2}%", snapshot.stats.adr_pct);
    println!("Gap:            {:+.2}%", snapshot.stats.gap_pct);
    println!(
        "From open:      {:+.2}%",
        snapshot.stats.change_from_open_pct
    );
    match snapshot.stats.perf_3m_pct {
        Some(p) => println!("3M:             {p:+.2}%"),
        None => println!("3M:             - (insufficient history)"),
    }
    println!(
        "Avg $ volume:   {}",
        format_dollars(snapshot.stats.avg_dollar_volume)
    );

    if !snapshot.matches.is_empty() {
        println!();
        println!("--- Signals ---");
        for m in &snapshot.matches {
            println!("{:<4} {:<18} [{:?}]", m.timeframe.as_str(), m.setup, m.status);
        }
    }

    if synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
