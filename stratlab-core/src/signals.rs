//! Cross-timeframe signals — continuity and the triangle verdict.
//!
//! Both signals read only the latest bar per timeframe out of an aggregated
//! ladder. Missing timeframes and exact dojis map to color 0 and degrade the
//! verdicts (`Mixed` / skipped window) instead of erroring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Timeframe};

/// Agreement of latest-bar colors across Monthly, Weekly and Daily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuityVerdict {
    Bullish,
    Bearish,
    Mixed,
}

fn latest_color(ladder: &BTreeMap<Timeframe, Vec<Bar>>, timeframe: Timeframe) -> i8 {
    ladder
        .get(&timeframe)
        .and_then(|bars| bars.last())
        .map(|bar| bar.color_signum())
        .unwrap_or(0)
}

/// Full-timeframe continuity over the fixed Monthly/Weekly/Daily set.
///
/// Bullish only when all three latest bars close above their opens; Bearish
/// only when all three close below. Any disagreement, doji or missing
/// timeframe yields Mixed.
pub fn continuity(ladder: &BTreeMap<Timeframe, Vec<Bar>>) -> ContinuityVerdict {
    let colors: Vec<i8> = Timeframe::CONTINUITY
        .iter()
        .map(|&tf| latest_color(ladder, tf))
        .collect();
    if colors.iter().all(|&c| c == 1) {
        ContinuityVerdict::Bullish
    } else if colors.iter().all(|&c| c == -1) {
        ContinuityVerdict::Bearish
    } else {
        ContinuityVerdict::Mixed
    }
}

/// Latest-bar color per ladder rung, in ladder order.
pub fn ladder_colors(ladder: &BTreeMap<Timeframe, Vec<Bar>>) -> [i8; 10] {
    let mut colors = [0i8; 10];
    for (slot, &tf) in Timeframe::LADDER.iter().enumerate() {
        colors[slot] = latest_color(ladder, tf);
    }
    colors
}

/// Triangle verdict over the ten ladder colors.
///
/// Slides a 4-wide window across the ladder (7 windows). Windows containing
/// any 0 are skipped outright. A qualifying window passes when its two
/// boundary values agree and at least 3 of its 4 values equal that boundary
/// value; the verdict is true iff any window passes.
pub fn triangle(colors: &[i8; 10]) -> bool {
    colors.windows(4).any(|w| {
        if w.contains(&0) {
            return false;
        }
        let boundary = w[0];
        w[3] == boundary && w.iter().filter(|&&c| c == boundary).count() >= 3
    })
}

/// Triangle verdict straight off an aggregated ladder.
pub fn triangle_verdict(ladder: &BTreeMap<Timeframe, Vec<Bar>>) -> bool {
    triangle(&ladder_colors(ladder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar_with_signum(signum: i8) -> Bar {
        let (open, close) = match signum {
            1 => (100.0, 101.0),
            -1 => (101.0, 100.0),
            _ => (100.0, 100.0),
        };
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 1_000,
        }
    }

    fn ladder_of(colors: &[(Timeframe, i8)]) -> BTreeMap<Timeframe, Vec<Bar>> {
        colors
            .iter()
            .map(|&(tf, s)| (tf, vec![bar_with_signum(s)]))
            .collect()
    }

    // ── Continuity ──

    #[test]
    fn continuity_bullish_needs_all_three_green() {
        let ladder = ladder_of(&[
            (Timeframe::Month1, 1),
            (Timeframe::Week1, 1),
            (Timeframe::Day1, 1),
        ]);
        assert_eq!(continuity(&ladder), ContinuityVerdict::Bullish);
    }

    #[test]
    fn continuity_bearish_needs_all_three_red() {
        let ladder = ladder_of(&[
            (Timeframe::Month1, -1),
            (Timeframe::Week1, -1),
            (Timeframe::Day1, -1),
        ]);
        assert_eq!(continuity(&ladder), ContinuityVerdict::Bearish);
    }

    #[test]
    fn continuity_disagreement_is_mixed() {
        let ladder = ladder_of(&[
            (Timeframe::Month1, 1),
            (Timeframe::Week1, -1),
            (Timeframe::Day1, 1),
        ]);
        assert_eq!(continuity(&ladder), ContinuityVerdict::Mixed);
    }

    #[test]
    fn continuity_missing_timeframe_is_mixed() {
        // weekly and daily agree, monthly absent
        let ladder = ladder_of(&[(Timeframe::Week1, 1), (Timeframe::Day1, 1)]);
        assert_eq!(continuity(&ladder), ContinuityVerdict::Mixed);
    }

    #[test]
    fn continuity_doji_is_mixed() {
        let ladder = ladder_of(&[
            (Timeframe::Month1, 0),
            (Timeframe::Week1, -1),
            (Timeframe::Day1, -1),
        ]);
        assert_eq!(continuity(&ladder), ContinuityVerdict::Mixed);
    }

    #[test]
    fn continuity_ignores_other_timeframes() {
        let ladder = ladder_of(&[
            (Timeframe::Month1, 1),
            (Timeframe::Week1, 1),
            (Timeframe::Day1, 1),
            (Timeframe::Quarter1, -1),
            (Timeframe::Year1, -1),
        ]);
        assert_eq!(continuity(&ladder), ContinuityVerdict::Bullish);
    }

    // ── Triangle ──

    #[test]
    fn triangle_all_green_passes() {
        assert!(triangle(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 1]));
    }

    #[test]
    fn triangle_alternating_fails() {
        assert!(!triangle(&[1, -1, 1, -1, 1, -1, 1, -1, 1, -1]));
    }

    #[test]
    fn triangle_three_of_four_with_matching_boundaries_passes() {
        // only the first window qualifies; the rest touch zeros
        assert!(triangle(&[1, 1, -1, 1, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn triangle_matching_boundaries_with_split_middle_fails() {
        // [1,-1,-1,1] has agreeing boundaries but only 2 of 4 match
        assert!(!triangle(&[1, -1, -1, 1, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn triangle_zero_poisons_every_window_it_touches() {
        // [1,1,0,1] would pass on counts alone; the embedded 0 skips it and
        // every window clear of zeros fails
        assert!(!triangle(&[1, 1, 0, 1, -1, -1, 1, 1, -1, -1]));
    }

    #[test]
    fn triangle_all_missing_fails() {
        assert!(!triangle(&[0; 10]));
    }

    #[test]
    fn triangle_red_windows_pass_too() {
        assert!(triangle(&[0, 0, 0, 0, 0, 0, -1, -1, -1, -1]));
    }

    #[test]
    fn ladder_colors_follow_ladder_order() {
        let ladder = ladder_of(&[
            (Timeframe::Day1, 1),
            (Timeframe::Day2, -1),
            (Timeframe::Year1, 1),
        ]);
        let colors = ladder_colors(&ladder);
        assert_eq!(colors[0], 1);
        assert_eq!(colors[1], -1);
        assert_eq!(colors[9], 1);
        assert_eq!(colors[4], 0); // 1W missing
    }

    #[test]
    fn triangle_verdict_reads_latest_bars() {
        let mut ladder = ladder_of(&[]);
        for tf in Timeframe::LADDER {
            // two bars: stale red, latest green
            ladder.insert(tf, vec![bar_with_signum(-1), bar_with_signum(1)]);
        }
        assert!(triangle_verdict(&ladder));
    }
}
