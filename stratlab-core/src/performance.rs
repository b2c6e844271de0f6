//! Performance metrics — calendar-anchored returns and daily statistics.
//!
//! Every metric is a pure function over the daily series: bars in, scalar
//! out. Insufficient history returns the documented default (0, or None for
//! the trailing three-month return) rather than erroring.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Trailing window for the average daily range statistic.
pub const ADR_WINDOW: usize = 14;
/// Trailing window for the average dollar volume statistic.
pub const DOLLAR_VOLUME_WINDOW: usize = 20;
/// Daily bars approximating three months.
pub const QUARTER_BARS: usize = 63;

/// Calendar-anchored percentage returns at an as-of date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub wtd: f64,
    pub mtd: f64,
    pub qtd: f64,
    pub ytd: f64,
}

impl PerformanceMetrics {
    /// Compute all four period returns from the daily series.
    pub fn compute(daily: &[Bar], as_of: NaiveDate) -> Self {
        Self {
            wtd: period_return(daily, week_anchor(as_of), as_of),
            mtd: period_return(daily, month_anchor(as_of), as_of),
            qtd: period_return(daily, quarter_anchor(as_of), as_of),
            ytd: period_return(daily, year_anchor(as_of), as_of),
        }
    }
}

/// Daily-series statistics reported alongside the calendar returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Mean high-low range of the trailing 14 bars, percent of latest close.
    pub adr_pct: f64,
    /// Latest open against the prior close, percent.
    pub gap_pct: f64,
    /// Latest close against the latest open, percent.
    pub change_from_open_pct: f64,
    /// 63-bar return, percent; absent with less history.
    pub perf_3m_pct: Option<f64>,
    /// Mean of close × volume over the trailing 20 bars.
    pub avg_dollar_volume: f64,
}

impl DailyStats {
    /// Compute all statistics from the daily series.
    pub fn compute(daily: &[Bar]) -> Self {
        Self {
            adr_pct: adr_pct(daily, ADR_WINDOW),
            gap_pct: gap_pct(daily),
            change_from_open_pct: change_from_open_pct(daily),
            perf_3m_pct: trailing_return_pct(daily, QUARTER_BARS),
            avg_dollar_volume: avg_dollar_volume(daily, DOLLAR_VOLUME_WINDOW),
        }
    }
}

// ─── Calendar anchors ───────────────────────────────────────────────

/// Monday of the week containing `date`.
pub fn week_anchor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day of `date`'s month.
pub fn month_anchor(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// First day of `date`'s quarter (January, April, July or October 1st).
pub fn quarter_anchor(date: NaiveDate) -> NaiveDate {
    let month = ((date.month() - 1) / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// January 1st of `date`'s year.
pub fn year_anchor(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

// ─── Individual metric functions ────────────────────────────────────

/// Percentage return from the first trading day on/after `anchor` to the
/// last bar at or before `as_of`.
///
/// The anchored day contributes its open, the as-of day its close. A window
/// with no bars returns 0.
pub fn period_return(daily: &[Bar], anchor: NaiveDate, as_of: NaiveDate) -> f64 {
    let mut window = daily
        .iter()
        .filter(|bar| bar.date >= anchor && bar.date <= as_of);
    let Some(first) = window.next() else {
        return 0.0;
    };
    let last = window.last().unwrap_or(first);
    if first.open <= 0.0 {
        return 0.0;
    }
    (last.close - first.open) / first.open * 100.0
}

/// Average daily range percent: mean (high − low) of the trailing `window`
/// bars, divided by the latest close, × 100.
///
/// Uses however many bars exist below `window`; 0 for an empty series or a
/// non-positive latest close.
pub fn adr_pct(daily: &[Bar], window: usize) -> f64 {
    let Some(last) = daily.last() else {
        return 0.0;
    };
    if last.close <= 0.0 || window == 0 {
        return 0.0;
    }
    let tail = &daily[daily.len().saturating_sub(window)..];
    let mean_range = tail.iter().map(|bar| bar.high - bar.low).sum::<f64>() / tail.len() as f64;
    mean_range / last.close * 100.0
}

/// Overnight gap: latest open against the prior close, percent.
///
/// Needs at least two bars and a positive prior close; otherwise 0.
pub fn gap_pct(daily: &[Bar]) -> f64 {
    if daily.len() < 2 {
        return 0.0;
    }
    let prev = &daily[daily.len() - 2];
    let last = &daily[daily.len() - 1];
    if prev.close <= 0.0 {
        return 0.0;
    }
    (last.open - prev.close) / prev.close * 100.0
}

/// Intraday move: latest close against the latest open, percent.
pub fn change_from_open_pct(daily: &[Bar]) -> f64 {
    let Some(last) = daily.last() else {
        return 0.0;
    };
    if last.open <= 0.0 {
        return 0.0;
    }
    (last.close - last.open) / last.open * 100.0
}

/// Close-to-close return over the trailing `bars_back` bars, percent.
///
/// `None` when the series is too short or the base close is non-positive.
pub fn trailing_return_pct(daily: &[Bar], bars_back: usize) -> Option<f64> {
    if daily.len() <= bars_back {
        return None;
    }
    let last = daily.last()?;
    let base = &daily[daily.len() - 1 - bars_back];
    if base.close <= 0.0 {
        return None;
    }
    Some((last.close / base.close - 1.0) * 100.0)
}

/// Mean of close × volume over the trailing `window` bars; 0 when empty.
pub fn avg_dollar_volume(daily: &[Bar], window: usize) -> f64 {
    if daily.is_empty() || window == 0 {
        return 0.0;
    }
    let tail = &daily[daily.len().saturating_sub(window)..];
    tail.iter().map(|bar| bar.close * bar.volume as f64).sum::<f64>() / tail.len() as f64
}
