//! Relative strength — benchmark-ratio changes and cross-sectional ranking.
//!
//! Two passes with a hard ordering dependency. Pass 1 runs per ticker and
//! timeframe: join the ticker's and the benchmark's bars on date, build the
//! close-ratio series, and take the ratio change over each look-back
//! horizon. Pass 2 runs per (timeframe, as-of date) over an immutable
//! snapshot of every ticker's pass-1 output, converting raw values into
//! percentile ranks. Nothing here mutates shared state; the snapshot is the
//! barrier between the passes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Symbol, Timeframe};

/// RS look-back horizons, in bars of the joined series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsHorizon {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
}

impl RsHorizon {
    /// Every horizon, shortest first.
    pub const ALL: [RsHorizon; 4] = [
        RsHorizon::OneDay,
        RsHorizon::OneWeek,
        RsHorizon::OneMonth,
        RsHorizon::ThreeMonths,
    ];

    /// Look-back distance in bars; a value needs `bars_back() + 1` joined
    /// points to exist.
    pub fn bars_back(&self) -> usize {
        match self {
            RsHorizon::OneDay => 1,
            RsHorizon::OneWeek => 5,
            RsHorizon::OneMonth => 21,
            RsHorizon::ThreeMonths => 63,
        }
    }

    /// Short label, e.g. `"1w"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RsHorizon::OneDay => "1d",
            RsHorizon::OneWeek => "1w",
            RsHorizon::OneMonth => "1m",
            RsHorizon::ThreeMonths => "3m",
        }
    }
}

/// Pass-1 output for one (ticker, timeframe): raw ratio changes against the
/// benchmark. Absent means insufficient joined history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RsRaw {
    pub rs_1d: Option<f64>,
    pub rs_1w: Option<f64>,
    pub rs_1m: Option<f64>,
    pub rs_3m: Option<f64>,
}

impl RsRaw {
    pub fn get(&self, horizon: RsHorizon) -> Option<f64> {
        match horizon {
            RsHorizon::OneDay => self.rs_1d,
            RsHorizon::OneWeek => self.rs_1w,
            RsHorizon::OneMonth => self.rs_1m,
            RsHorizon::ThreeMonths => self.rs_3m,
        }
    }

    fn set(&mut self, horizon: RsHorizon, value: Option<f64>) {
        match horizon {
            RsHorizon::OneDay => self.rs_1d = value,
            RsHorizon::OneWeek => self.rs_1w = value,
            RsHorizon::OneMonth => self.rs_1m = value,
            RsHorizon::ThreeMonths => self.rs_3m = value,
        }
    }
}

/// Pass-2 output: percentile ranks by horizon. `None` means the ticker was
/// excluded from that horizon's population (absent or zero raw value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RsPercentiles {
    pub rs_1d: Option<f64>,
    pub rs_1w: Option<f64>,
    pub rs_1m: Option<f64>,
    pub rs_3m: Option<f64>,
}

impl RsPercentiles {
    pub fn get(&self, horizon: RsHorizon) -> Option<f64> {
        match horizon {
            RsHorizon::OneDay => self.rs_1d,
            RsHorizon::OneWeek => self.rs_1w,
            RsHorizon::OneMonth => self.rs_1m,
            RsHorizon::ThreeMonths => self.rs_3m,
        }
    }

    fn set(&mut self, horizon: RsHorizon, value: Option<f64>) {
        match horizon {
            RsHorizon::OneDay => self.rs_1d = value,
            RsHorizon::OneWeek => self.rs_1w = value,
            RsHorizon::OneMonth => self.rs_1m = value,
            RsHorizon::ThreeMonths => self.rs_3m = value,
        }
    }
}

/// Close ratios over the dates both series share, oldest first.
///
/// Dates present on only one side drop out of the join; non-positive
/// benchmark closes are treated as missing rather than dividing into them.
fn ratio_series(ticker: &[Bar], benchmark: &[Bar]) -> Vec<f64> {
    let bench_close: BTreeMap<NaiveDate, f64> = benchmark
        .iter()
        .filter(|bar| bar.close > 0.0)
        .map(|bar| (bar.date, bar.close))
        .collect();
    ticker
        .iter()
        .filter_map(|bar| bench_close.get(&bar.date).map(|bc| bar.close / bc))
        .collect()
}

/// Pass 1 for one ticker/timeframe: raw horizon values off the ratio series.
///
/// Horizon value = ratio_now / ratio_{n bars ago} − 1; a horizon whose
/// look-back exceeds the joined history stays absent. An empty join (missing
/// benchmark) leaves every horizon absent.
pub fn rs_raw(ticker: &[Bar], benchmark: &[Bar]) -> RsRaw {
    let ratios = ratio_series(ticker, benchmark);
    let mut raw = RsRaw::default();
    let n = ratios.len();
    if n == 0 {
        return raw;
    }
    let now = ratios[n - 1];
    for horizon in RsHorizon::ALL {
        let back = horizon.bars_back();
        if n > back {
            let base = ratios[n - 1 - back];
            if base != 0.0 {
                raw.set(horizon, Some(now / base - 1.0));
            }
        }
    }
    raw
}

/// Immutable pass-1 collection for one (timeframe, as-of date) key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsSnapshot {
    pub timeframe: Timeframe,
    pub as_of: NaiveDate,
    pub entries: BTreeMap<Symbol, RsRaw>,
}

impl RsSnapshot {
    pub fn new(timeframe: Timeframe, as_of: NaiveDate) -> Self {
        Self {
            timeframe,
            as_of,
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, symbol: impl Into<Symbol>, raw: RsRaw) {
        self.entries.insert(symbol.into(), raw);
    }
}

/// Percentile of `value` within `population`: strictly-less count over
/// population size, × 100, rounded to one decimal.
pub fn percentile_rank(population: &[f64], value: f64) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let below = population.iter().filter(|&&p| p < value).count();
    round1(below as f64 / population.len() as f64 * 100.0)
}

/// Pass 2: convert one snapshot of raw values into percentile ranks.
///
/// Per horizon, the population is every entry with a present, nonzero raw
/// value. Entries outside the population keep `None` for that horizon; zero
/// is a valid result only after conversion (the population minimum ranks
/// 0.0). Every snapshot entry appears in the output.
pub fn rank_snapshot(snapshot: &RsSnapshot) -> BTreeMap<Symbol, RsPercentiles> {
    let mut out: BTreeMap<Symbol, RsPercentiles> = snapshot
        .entries
        .keys()
        .map(|symbol| (symbol.clone(), RsPercentiles::default()))
        .collect();

    for horizon in RsHorizon::ALL {
        let population: Vec<f64> = snapshot
            .entries
            .values()
            .filter_map(|raw| raw.get(horizon))
            .filter(|v| *v != 0.0)
            .collect();
        if population.is_empty() {
            continue;
        }
        for (symbol, raw) in &snapshot.entries {
            let Some(value) = raw.get(horizon).filter(|v| *v != 0.0) else {
                continue;
            };
            let pct = percentile_rank(&population, value);
            if let Some(ranks) = out.get_mut(symbol) {
                ranks.set(horizon, Some(pct));
            }
        }
    }
    out
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
