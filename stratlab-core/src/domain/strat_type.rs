//! StratType — the classification alphabet for bar-vs-predecessor structure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural relationship of a bar to its immediate predecessor, with the
/// color variant baked in where it matters.
///
/// The tag labels follow trading convention: `1` inside, `2u`/`2uR` upside
/// break (green/red body), `2d`/`2dG` downside break (red/green body),
/// `3u`/`3d` outside (green/red body). `Unknown` covers the first bar of a
/// series and non-finite inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StratType {
    #[serde(rename = "1")]
    Inside,
    #[serde(rename = "2u")]
    TwoUp,
    #[serde(rename = "2uR")]
    TwoUpRed,
    #[serde(rename = "2d")]
    TwoDown,
    #[serde(rename = "2dG")]
    TwoDownGreen,
    #[serde(rename = "3u")]
    OutsideUp,
    #[serde(rename = "3d")]
    OutsideDown,
    #[serde(rename = "unknown")]
    Unknown,
}

impl StratType {
    /// Every tag, in display order.
    pub const ALL: [StratType; 8] = [
        StratType::Inside,
        StratType::TwoUp,
        StratType::TwoUpRed,
        StratType::TwoDown,
        StratType::TwoDownGreen,
        StratType::OutsideUp,
        StratType::OutsideDown,
        StratType::Unknown,
    ];

    /// Canonical tag label, e.g. `"2uR"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            StratType::Inside => "1",
            StratType::TwoUp => "2u",
            StratType::TwoUpRed => "2uR",
            StratType::TwoDown => "2d",
            StratType::TwoDownGreen => "2dG",
            StratType::OutsideUp => "3u",
            StratType::OutsideDown => "3d",
            StratType::Unknown => "unknown",
        }
    }

    /// Inside bar.
    pub fn is_inside(&self) -> bool {
        matches!(self, StratType::Inside)
    }

    /// Upside directional bar, either color (`2u` or `2uR`).
    pub fn is_two_up(&self) -> bool {
        matches!(self, StratType::TwoUp | StratType::TwoUpRed)
    }

    /// Downside directional bar, either color (`2d` or `2dG`).
    pub fn is_two_down(&self) -> bool {
        matches!(self, StratType::TwoDown | StratType::TwoDownGreen)
    }

    /// Outside bar, either color (`3u` or `3d`).
    pub fn is_outside(&self) -> bool {
        matches!(self, StratType::OutsideUp | StratType::OutsideDown)
    }
}

impl fmt::Display for StratType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized tag label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized strat tag '{0}'")]
pub struct ParseStratTypeError(pub String);

impl FromStr for StratType {
    type Err = ParseStratTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(StratType::Inside),
            "2u" => Ok(StratType::TwoUp),
            "2uR" => Ok(StratType::TwoUpRed),
            "2d" => Ok(StratType::TwoDown),
            "2dG" => Ok(StratType::TwoDownGreen),
            "3u" => Ok(StratType::OutsideUp),
            "3d" => Ok(StratType::OutsideDown),
            "unknown" => Ok(StratType::Unknown),
            other => Err(ParseStratTypeError(other.to_string())),
        }
    }
}
