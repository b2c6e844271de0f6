//! Reporting and export — JSON and CSV artifact generation.
//!
//! Two export formats for scan results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: the fired-signal tape for spreadsheets and external tools
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use stratlab_core::SignalMatch;

use crate::scan::{ScanReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScanReport` to pretty JSON.
pub fn export_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScanReport to JSON")
}

/// Deserialize a `ScanReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScanReport> {
    let report: ScanReport =
        serde_json::from_str(json).context("failed to deserialize ScanReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the fired-signal tape as CSV, one row per catalogue match.
///
/// Columns: symbol, timeframe, setup, status, sequence, current_tag,
/// prior_tag, prior2_tag, date, open, high, low, close, volume
pub fn export_signals_csv(matches: &[SignalMatch]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Header
    wtr.write_record([
        "symbol",
        "timeframe",
        "setup",
        "status",
        "sequence",
        "current_tag",
        "prior_tag",
        "prior2_tag",
        "date",
        "open",
        "high",
        "low",
        "close",
        "volume",
    ])?;

    for m in matches {
        let sequence = m
            .pattern_sequence
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join("-");
        wtr.write_record([
            &m.symbol,
            &m.timeframe.to_string(),
            &m.setup,
            &format!("{:?}", m.status),
            &sequence,
            m.current_tag.as_str(),
            m.prior_tag.map(|t| t.as_str()).unwrap_or(""),
            m.prior2_tag.map(|t| t.as_str()).unwrap_or(""),
            &m.bar.date.to_string(),
            &format!("{:.4}", m.bar.open),
            &format!("{:.4}", m.bar.high),
            &format!("{:.4}", m.bar.low),
            &format!("{:.4}", m.bar.close),
            &m.bar.volume.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single scan run.
///
/// Creates a directory named `scan_{id8}_{timestamp}/` under `output_dir`
/// containing:
/// - `report.json` — the full `ScanReport`
/// - `signals.csv` — every catalogue match across all tickers
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &ScanReport, output_dir: &Path) -> Result<PathBuf> {
    let id8 = &report.scan_id[..report.scan_id.len().min(8)];
    let dirname = format!(
        "scan_{}_{}",
        id8,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let scan_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&scan_dir)
        .with_context(|| format!("failed to create artifact dir: {}", scan_dir.display()))?;

    // report.json
    let json = export_json(report)?;
    std::fs::write(scan_dir.join("report.json"), &json)?;

    // signals.csv
    let matches: Vec<SignalMatch> = report
        .snapshots
        .iter()
        .flat_map(|s| s.matches.iter().cloned())
        .collect();
    let signals_csv = export_signals_csv(&matches)?;
    std::fs::write(scan_dir.join("signals.csv"), &signals_csv)?;

    Ok(scan_dir)
}

/// Load a `ScanReport` from an artifact directory's report.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<ScanReport> {
    let report_path = dir.join("report.json");
    let json = std::fs::read_to_string(&report_path)
        .with_context(|| format!("failed to read {}", report_path.display()))?;
    import_json(&json)
}
