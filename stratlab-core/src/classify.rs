//! Bar classification — structural tags and single-bar shape detectors.
//!
//! The structural test is an ordered list of guarded rules, evaluated top to
//! bottom: inside, outside, up, down. The guards are mutually exclusive by
//! construction (the property tests assert exactly one outcome per input),
//! and a pair that satisfies no guard classifies `Unknown` rather than
//! erroring. Equal-range bars (both extremes tying the predecessor) satisfy
//! the inside guard and take tag `1`.

use crate::domain::{Bar, StratType};

/// One structural rule: a range guard plus the tag for each body color.
struct StructuralRule {
    holds: fn(&Bar, &Bar) -> bool,
    green: StratType,
    red: StratType,
}

fn inside(current: &Bar, prev: &Bar) -> bool {
    current.high <= prev.high && current.low >= prev.low
}

fn outside(current: &Bar, prev: &Bar) -> bool {
    current.high > prev.high && current.low < prev.low
}

fn broke_up(current: &Bar, prev: &Bar) -> bool {
    current.high > prev.high && current.low >= prev.low
}

fn broke_down(current: &Bar, prev: &Bar) -> bool {
    current.low < prev.low && current.high <= prev.high
}

/// Rule order is the precedence order; the first guard that holds decides.
const STRUCTURAL_RULES: [StructuralRule; 4] = [
    StructuralRule {
        holds: inside,
        green: StratType::Inside,
        red: StratType::Inside,
    },
    StructuralRule {
        holds: outside,
        green: StratType::OutsideUp,
        red: StratType::OutsideDown,
    },
    StructuralRule {
        holds: broke_up,
        green: StratType::TwoUp,
        red: StratType::TwoUpRed,
    },
    StructuralRule {
        holds: broke_down,
        green: StratType::TwoDownGreen,
        red: StratType::TwoDown,
    },
];

/// Classify `current` against its immediate predecessor.
///
/// A bar with no predecessor classifies `Unknown`. Non-finite prices fail
/// every guard and also land on `Unknown`; classification never errors.
pub fn classify(current: &Bar, previous: Option<&Bar>) -> StratType {
    let Some(prev) = previous else {
        return StratType::Unknown;
    };
    for rule in &STRUCTURAL_RULES {
        if (rule.holds)(current, prev) {
            return if current.is_green() { rule.green } else { rule.red };
        }
    }
    StratType::Unknown
}

/// Tag every bar of a series against its predecessor, in order.
///
/// The first element is always `Unknown`.
pub fn classify_series(bars: &[Bar]) -> Vec<StratType> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| classify(bar, if i == 0 { None } else { Some(&bars[i - 1]) }))
        .collect()
}

/// Hammer shape: tall lower wick, at most body-sized upper wick.
///
/// Zero-range bars (high == low) are never hammers; the wick ratios are
/// undefined there.
pub fn is_hammer(bar: &Bar) -> bool {
    let body = (bar.close - bar.open).abs();
    let lower_wick = bar.close.min(bar.open) - bar.low;
    let upper_wick = bar.high - bar.close.max(bar.open);
    bar.range() > 0.0 && lower_wick >= 2.0 * body && upper_wick <= body
}

/// Shooter shape: mirror image of the hammer.
pub fn is_shooter(bar: &Bar) -> bool {
    let body = (bar.close - bar.open).abs();
    let lower_wick = bar.close.min(bar.open) - bar.low;
    let upper_wick = bar.high - bar.close.max(bar.open);
    bar.range() > 0.0 && upper_wick >= 2.0 * body && lower_wick <= body
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1_000,
        }
    }

    fn prev() -> Bar {
        bar(100.0, 110.0, 90.0, 105.0)
    }

    // ── Structural tags ──

    #[test]
    fn inside_bar_is_one_regardless_of_color() {
        let p = prev();
        assert_eq!(classify(&bar(99.0, 108.0, 92.0, 101.0), Some(&p)), StratType::Inside);
        assert_eq!(classify(&bar(101.0, 108.0, 92.0, 99.0), Some(&p)), StratType::Inside);
    }

    #[test]
    fn outside_bar_follows_body_color() {
        let p = prev();
        assert_eq!(
            classify(&bar(95.0, 112.0, 88.0, 111.0), Some(&p)),
            StratType::OutsideUp
        );
        assert_eq!(
            classify(&bar(111.0, 112.0, 88.0, 89.0), Some(&p)),
            StratType::OutsideDown
        );
    }

    #[test]
    fn up_bar_splits_green_and_red() {
        let p = prev();
        assert_eq!(classify(&bar(105.0, 115.0, 95.0, 114.0), Some(&p)), StratType::TwoUp);
        assert_eq!(
            classify(&bar(114.0, 115.0, 95.0, 106.0), Some(&p)),
            StratType::TwoUpRed
        );
    }

    #[test]
    fn down_bar_splits_red_and_green() {
        let p = prev();
        assert_eq!(classify(&bar(95.0, 105.0, 85.0, 88.0), Some(&p)), StratType::TwoDown);
        assert_eq!(
            classify(&bar(88.0, 105.0, 85.0, 95.0), Some(&p)),
            StratType::TwoDownGreen
        );
    }

    #[test]
    fn doji_body_counts_as_green() {
        let p = prev();
        // up-range doji
        assert_eq!(classify(&bar(111.0, 115.0, 95.0, 111.0), Some(&p)), StratType::TwoUp);
        // down-range doji
        assert_eq!(
            classify(&bar(88.0, 105.0, 85.0, 88.0), Some(&p)),
            StratType::TwoDownGreen
        );
    }

    #[test]
    fn equal_range_ties_resolve_to_inside() {
        let p = prev();
        assert_eq!(
            classify(&bar(100.0, 110.0, 90.0, 95.0), Some(&p)),
            StratType::Inside
        );
    }

    #[test]
    fn single_tied_extreme_still_orders_correctly() {
        let p = prev();
        // tied high, lifted low: inside wins
        assert_eq!(classify(&bar(100.0, 110.0, 95.0, 99.0), Some(&p)), StratType::Inside);
        // tied high, broken low: down
        assert_eq!(classify(&bar(100.0, 110.0, 85.0, 88.0), Some(&p)), StratType::TwoDown);
        // tied low, broken high: up
        assert_eq!(classify(&bar(100.0, 115.0, 90.0, 113.0), Some(&p)), StratType::TwoUp);
    }

    #[test]
    fn first_bar_is_unknown() {
        assert_eq!(classify(&prev(), None), StratType::Unknown);
    }

    #[test]
    fn non_finite_prices_classify_unknown() {
        let p = prev();
        assert_eq!(
            classify(&bar(f64::NAN, f64::NAN, f64::NAN, f64::NAN), Some(&p)),
            StratType::Unknown
        );
    }

    #[test]
    fn series_tags_line_up_with_pairs() {
        let bars = vec![
            prev(),
            bar(99.0, 108.0, 92.0, 101.0),  // inside prev
            bar(101.0, 112.0, 93.0, 110.0), // breaks the inside bar's high
        ];
        let tags = classify_series(&bars);
        assert_eq!(tags, vec![StratType::Unknown, StratType::Inside, StratType::TwoUp]);
    }

    #[test]
    fn empty_series_yields_no_tags() {
        assert!(classify_series(&[]).is_empty());
    }

    // ── Shape detectors ──

    #[test]
    fn hammer_with_long_lower_wick() {
        // body 0.5, lower wick 2.0, upper wick 0.5
        let b = bar(10.0, 11.0, 8.0, 10.5);
        assert!(is_hammer(&b));
        assert!(!is_shooter(&b));
    }

    #[test]
    fn shooter_with_long_upper_wick() {
        // body 0.5, upper wick 1.5, lower wick 0.2
        let b = bar(10.5, 12.0, 9.8, 10.0);
        assert!(is_shooter(&b));
        assert!(!is_hammer(&b));
    }

    #[test]
    fn stubby_wicks_match_neither_shape() {
        let b = bar(10.0, 10.7, 9.8, 10.5);
        assert!(!is_hammer(&b));
        assert!(!is_shooter(&b));
    }

    #[test]
    fn zero_range_bar_matches_neither_shape() {
        let b = bar(10.0, 10.0, 10.0, 10.0);
        assert!(!is_hammer(&b));
        assert!(!is_shooter(&b));
    }

    #[test]
    fn dragonfly_doji_is_a_hammer() {
        // zero body, all range below
        let b = bar(10.0, 10.0, 8.0, 10.0);
        assert!(is_hammer(&b));
        assert!(!is_shooter(&b));
    }

    #[test]
    fn shape_and_structure_are_orthogonal() {
        let p = prev();
        // breaks the low, closes red, hammer shape
        let b = bar(91.0, 91.5, 85.0, 90.5);
        assert_eq!(classify(&b, Some(&p)), StratType::TwoDown);
        assert!(is_hammer(&b));
    }
}
