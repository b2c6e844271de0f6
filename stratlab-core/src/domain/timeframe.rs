//! Timeframe — the fixed ladder of supported bar periods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A supported bar period, from daily up to yearly.
///
/// Declaration order is ladder order: `1D, 2D, 3D, 5D, 1W, 2W, 3W, 1M, 1Q, 1Y`.
/// The triangle verdict slides its window over exactly this sequence, so the
/// ordering here is load-bearing, not cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    Day1,
    #[serde(rename = "2D")]
    Day2,
    #[serde(rename = "3D")]
    Day3,
    #[serde(rename = "5D")]
    Day5,
    #[serde(rename = "1W")]
    Week1,
    #[serde(rename = "2W")]
    Week2,
    #[serde(rename = "3W")]
    Week3,
    #[serde(rename = "1M")]
    Month1,
    #[serde(rename = "1Q")]
    Quarter1,
    #[serde(rename = "1Y")]
    Year1,
}

impl Timeframe {
    /// Every supported timeframe, in ladder order.
    pub const LADDER: [Timeframe; 10] = [
        Timeframe::Day1,
        Timeframe::Day2,
        Timeframe::Day3,
        Timeframe::Day5,
        Timeframe::Week1,
        Timeframe::Week2,
        Timeframe::Week3,
        Timeframe::Month1,
        Timeframe::Quarter1,
        Timeframe::Year1,
    ];

    /// The subset whose latest-bar colors feed the continuity verdict.
    pub const CONTINUITY: [Timeframe; 3] =
        [Timeframe::Month1, Timeframe::Week1, Timeframe::Day1];

    /// Canonical short label, e.g. `"2D"` or `"1Q"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day1 => "1D",
            Timeframe::Day2 => "2D",
            Timeframe::Day3 => "3D",
            Timeframe::Day5 => "5D",
            Timeframe::Week1 => "1W",
            Timeframe::Week2 => "2W",
            Timeframe::Week3 => "3W",
            Timeframe::Month1 => "1M",
            Timeframe::Quarter1 => "1Q",
            Timeframe::Year1 => "1Y",
        }
    }

    /// Block size in trading days for the trading-day-block timeframes.
    ///
    /// `None` for `1D` (identity) and for calendar timeframes.
    pub fn block_days(&self) -> Option<usize> {
        match self {
            Timeframe::Day2 => Some(2),
            Timeframe::Day3 => Some(3),
            Timeframe::Day5 => Some(5),
            _ => None,
        }
    }

    /// Span in Friday-ending weeks for the weekly timeframes.
    pub fn week_span(&self) -> Option<i64> {
        match self {
            Timeframe::Week1 => Some(1),
            Timeframe::Week2 => Some(2),
            Timeframe::Week3 => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized timeframe label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized timeframe '{0}' (expected one of 1D, 2D, 3D, 5D, 1W, 2W, 3W, 1M, 1Q, 1Y)")]
pub struct ParseTimeframeError(pub String);

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1D" => Ok(Timeframe::Day1),
            "2D" => Ok(Timeframe::Day2),
            "3D" => Ok(Timeframe::Day3),
            "5D" => Ok(Timeframe::Day5),
            "1W" => Ok(Timeframe::Week1),
            "2W" => Ok(Timeframe::Week2),
            "3W" => Ok(Timeframe::Week3),
            "1M" => Ok(Timeframe::Month1),
            "1Q" => Ok(Timeframe::Quarter1),
            "1Y" => Ok(Timeframe::Year1),
            other => Err(ParseTimeframeError(other.to_string())),
        }
    }
}
