//! Timeframe aggregation — synthetic higher-timeframe bars from a daily series.
//!
//! Two strategies cover the ladder:
//! - trading-day blocks (2D/3D/5D), anchored to the first trading day of each
//!   calendar year so block boundaries stay put as new days arrive;
//! - calendar periods (1W/2W/3W/1M/1Q/1Y), labeled with the calendar period
//!   end and dropping periods with no trading days.
//!
//! Aggregation is total: partial history yields a shorter series, empty input
//! yields empty output, and no input ever produces an error.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::{Bar, Timeframe};

/// Aggregate a sorted daily series into one target timeframe.
///
/// OHLCV aggregation rule everywhere: open = first, high = max, low = min,
/// close = last, volume = sum. `1D` is the identity.
pub fn aggregate(daily: &[Bar], timeframe: Timeframe) -> Vec<Bar> {
    match timeframe {
        Timeframe::Day1 => daily.to_vec(),
        Timeframe::Day2 => trading_day_blocks(daily, 2),
        Timeframe::Day3 => trading_day_blocks(daily, 3),
        Timeframe::Day5 => trading_day_blocks(daily, 5),
        Timeframe::Week1 => calendar_periods(daily, |d| week_period_end(d, 1)),
        Timeframe::Week2 => calendar_periods(daily, |d| week_period_end(d, 2)),
        Timeframe::Week3 => calendar_periods(daily, |d| week_period_end(d, 3)),
        Timeframe::Month1 => calendar_periods(daily, month_period_end),
        Timeframe::Quarter1 => calendar_periods(daily, quarter_period_end),
        Timeframe::Year1 => calendar_periods(daily, year_period_end),
    }
}

/// Aggregate a daily series into every timeframe of the ladder at once.
///
/// The returned map iterates in ladder order (`Timeframe`'s `Ord` follows
/// declaration order).
pub fn aggregate_ladder(daily: &[Bar]) -> BTreeMap<Timeframe, Vec<Bar>> {
    Timeframe::LADDER
        .iter()
        .map(|&tf| (tf, aggregate(daily, tf)))
        .collect()
}

/// N-trading-day blocks, re-anchored at the start of each calendar year.
///
/// Each trading day gets a block index = (zero-based position within its
/// year) / `block_days`; a year's trailing partial block still emits a bar.
/// The synthetic bar anchors to the block's last trading day.
fn trading_day_blocks(daily: &[Bar], block_days: usize) -> Vec<Bar> {
    let mut out: Vec<Bar> = Vec::new();
    // (year, block index) of the bar being accumulated
    let mut current: Option<(i32, usize, Bar)> = None;
    let mut pos_in_year = 0usize;

    for bar in daily {
        let year = bar.date.year();
        if current.as_ref().map(|(y, _, _)| *y) != Some(year) {
            pos_in_year = 0;
        }
        let block = pos_in_year / block_days;
        pos_in_year += 1;

        match current.as_mut() {
            Some((y, b, acc)) if *y == year && *b == block => {
                acc.high = acc.high.max(bar.high);
                acc.low = acc.low.min(bar.low);
                acc.close = bar.close;
                acc.volume += bar.volume;
                acc.date = bar.date;
            }
            _ => {
                if let Some((_, _, done)) = current.take() {
                    out.push(done);
                }
                current = Some((year, block, bar.clone()));
            }
        }
    }
    if let Some((_, _, done)) = current {
        out.push(done);
    }
    out
}

/// Fold consecutive bars sharing a period-end label into one bar.
///
/// The accumulator's date doubles as the period key, so only non-empty
/// periods ever materialize.
fn calendar_periods(daily: &[Bar], period_end: impl Fn(NaiveDate) -> NaiveDate) -> Vec<Bar> {
    let mut out: Vec<Bar> = Vec::new();
    let mut current: Option<Bar> = None;

    for bar in daily {
        let end = period_end(bar.date);
        match current.as_mut() {
            Some(acc) if acc.date == end => {
                acc.high = acc.high.max(bar.high);
                acc.low = acc.low.min(bar.low);
                acc.close = bar.close;
                acc.volume += bar.volume;
            }
            _ => {
                if let Some(done) = current.take() {
                    out.push(done);
                }
                let mut acc = bar.clone();
                acc.date = end;
                current = Some(acc);
            }
        }
    }
    if let Some(done) = current {
        out.push(done);
    }
    out
}

/// Friday that closes the week containing `date`; weeks run Saturday..Friday.
fn week_end_friday(date: NaiveDate) -> NaiveDate {
    let offset = match date.weekday() {
        Weekday::Sat => 6,
        Weekday::Sun => 5,
        Weekday::Mon => 4,
        Weekday::Tue => 3,
        Weekday::Wed => 2,
        Weekday::Thu => 1,
        Weekday::Fri => 0,
    };
    date + Duration::days(offset)
}

/// Closing Friday of the `span`-week period containing `date`.
///
/// Periods are fixed spans of Friday-ending weeks indexed from the day-count
/// epoch, so multi-week boundaries do not drift with where a series starts.
fn week_period_end(date: NaiveDate, span: i64) -> NaiveDate {
    let friday = week_end_friday(date);
    let week = i64::from(friday.num_days_from_ce()).div_euclid(7);
    let period_last_week = (week.div_euclid(span) + 1) * span - 1;
    friday + Duration::days((period_last_week - week) * 7)
}

/// Last calendar day of `date`'s month.
fn month_period_end(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .map(|first_of_next| first_of_next - Duration::days(1))
        .unwrap_or(date)
}

/// Last calendar day of `date`'s quarter.
fn quarter_period_end(date: NaiveDate) -> NaiveDate {
    let last_month = ((date.month() - 1) / 3) * 3 + 3;
    match NaiveDate::from_ymd_opt(date.year(), last_month, 1) {
        Some(first_of_last) => month_period_end(first_of_last),
        None => date,
    }
}

/// December 31st of `date`'s year.
fn year_period_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}
