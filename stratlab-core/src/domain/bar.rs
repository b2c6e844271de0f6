//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar anchored to a single date.
///
/// Bars do not carry their symbol or timeframe; the owning series provides
/// that context and keeps its bars sorted by strictly increasing `date`.
/// Synthetic bars produced by aggregation anchor to the last underlying
/// trading day (2D/3D/5D blocks) or the calendar period end (1W and up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high/low bracket open and close,
    /// prices positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }

    /// Close at or above open. An exact doji (close == open) counts as green.
    pub fn is_green(&self) -> bool {
        self.close >= self.open
    }

    /// Directional color: +1 if close > open, -1 if close < open, 0 for an
    /// exact doji or a void bar.
    pub fn color_signum(&self) -> i8 {
        if self.close > self.open {
            1
        } else if self.close < self.open {
            -1
        } else {
            0
        }
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
