//! Pattern catalogue — named setups over the trailing classified bars.
//!
//! The catalogue is a static table of (name, status, tags-consumed,
//! predicate) rows evaluated uniformly against a `MatchWindow`. Adding a
//! setup is a data change. Every matching row emits its own `SignalMatch`;
//! rows that need more history than the window carries simply do not fire.

use serde::{Deserialize, Serialize};

use crate::classify::{is_hammer, is_shooter};
use crate::domain::{Bar, StratType, Symbol, Timeframe};

/// Lifecycle status of a matched setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupStatus {
    /// Already confirmed by price action on the latest bar.
    InForce,
    /// Still pending a trigger.
    Setup,
}

/// One fired catalogue row for a (symbol, timeframe, latest bar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMatch {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub setup: String,
    pub status: SetupStatus,
    /// Tags the rule consumed, oldest first.
    pub pattern_sequence: Vec<StratType>,
    /// Trailing tag context at the match site, consumed or not.
    pub current_tag: StratType,
    pub prior_tag: Option<StratType>,
    pub prior2_tag: Option<StratType>,
    pub bar: Bar,
}

/// Everything a catalogue rule may inspect: the latest bar and up to three
/// trailing tags.
#[derive(Debug, Clone, Copy)]
pub struct MatchWindow<'a> {
    pub bar: &'a Bar,
    pub current: StratType,
    pub prior: Option<StratType>,
    pub prior2: Option<StratType>,
}

impl<'a> MatchWindow<'a> {
    /// Window over the last bar of a tagged series; `None` if either slice
    /// is empty. `tags` must parallel `bars`.
    pub fn latest(bars: &'a [Bar], tags: &[StratType]) -> Option<MatchWindow<'a>> {
        debug_assert_eq!(bars.len(), tags.len());
        let bar = bars.last()?;
        let current = *tags.last()?;
        let n = tags.len();
        let prior = if n >= 2 { Some(tags[n - 2]) } else { None };
        let prior2 = if n >= 3 { Some(tags[n - 3]) } else { None };
        Some(MatchWindow {
            bar,
            current,
            prior,
            prior2,
        })
    }

    /// The trailing `tags_used` tags, oldest first.
    fn sequence(&self, tags_used: usize) -> Vec<StratType> {
        let mut seq = Vec::with_capacity(tags_used);
        if tags_used >= 3 {
            if let Some(t) = self.prior2 {
                seq.push(t);
            }
        }
        if tags_used >= 2 {
            if let Some(t) = self.prior {
                seq.push(t);
            }
        }
        seq.push(self.current);
        seq
    }
}

/// One catalogue row.
struct SetupRule {
    name: &'static str,
    status: SetupStatus,
    /// Trailing tags the predicate consumes (1..=3), recorded in
    /// `pattern_sequence` when the rule fires.
    tags_used: usize,
    matches: fn(&MatchWindow) -> bool,
}

fn two_down_green(w: &MatchWindow) -> bool {
    w.current == StratType::TwoDownGreen
}

fn reversal_bullish(w: &MatchWindow) -> bool {
    w.current.is_two_up() && w.prior.is_some_and(|t| t.is_two_down())
}

fn reversal_bearish(w: &MatchWindow) -> bool {
    w.current.is_two_down() && w.prior.is_some_and(|t| t.is_two_up())
}

fn two_one_two_bullish(w: &MatchWindow) -> bool {
    w.current.is_two_up()
        && w.prior.is_some_and(|t| t.is_inside())
        && w.prior2.is_some_and(|t| t.is_two_down())
}

fn two_one_two_bearish(w: &MatchWindow) -> bool {
    w.current.is_two_down()
        && w.prior.is_some_and(|t| t.is_inside())
        && w.prior2.is_some_and(|t| t.is_two_up())
}

fn three_one_two_bullish(w: &MatchWindow) -> bool {
    w.current.is_two_up()
        && w.prior.is_some_and(|t| t.is_inside())
        && w.prior2.is_some_and(|t| t.is_outside())
}

fn three_one_two_bearish(w: &MatchWindow) -> bool {
    w.current.is_two_down()
        && w.prior.is_some_and(|t| t.is_inside())
        && w.prior2.is_some_and(|t| t.is_outside())
}

fn inside_bar(w: &MatchWindow) -> bool {
    w.current.is_inside()
}

fn hammer(w: &MatchWindow) -> bool {
    is_hammer(w.bar)
}

fn shooter(w: &MatchWindow) -> bool {
    is_shooter(w.bar)
}

const CATALOGUE: [SetupRule; 10] = [
    SetupRule {
        name: "2d Green",
        status: SetupStatus::InForce,
        tags_used: 1,
        matches: two_down_green,
    },
    SetupRule {
        name: "Reversal Bullish",
        status: SetupStatus::InForce,
        tags_used: 2,
        matches: reversal_bullish,
    },
    SetupRule {
        name: "Reversal Bearish",
        status: SetupStatus::InForce,
        tags_used: 2,
        matches: reversal_bearish,
    },
    SetupRule {
        name: "2-1-2 Bullish",
        status: SetupStatus::InForce,
        tags_used: 3,
        matches: two_one_two_bullish,
    },
    SetupRule {
        name: "2-1-2 Bearish",
        status: SetupStatus::InForce,
        tags_used: 3,
        matches: two_one_two_bearish,
    },
    SetupRule {
        name: "3-1-2 Bullish",
        status: SetupStatus::InForce,
        tags_used: 3,
        matches: three_one_two_bullish,
    },
    SetupRule {
        name: "3-1-2 Bearish",
        status: SetupStatus::InForce,
        tags_used: 3,
        matches: three_one_two_bearish,
    },
    SetupRule {
        name: "Inside Bar",
        status: SetupStatus::Setup,
        tags_used: 1,
        matches: inside_bar,
    },
    SetupRule {
        name: "Hammer",
        status: SetupStatus::Setup,
        tags_used: 1,
        matches: hammer,
    },
    SetupRule {
        name: "Shooter",
        status: SetupStatus::Setup,
        tags_used: 1,
        matches: shooter,
    },
];

/// Evaluate every catalogue row against one window.
pub fn scan_window(symbol: &str, timeframe: Timeframe, window: &MatchWindow) -> Vec<SignalMatch> {
    CATALOGUE
        .iter()
        .filter(|rule| (rule.matches)(window))
        .map(|rule| SignalMatch {
            symbol: symbol.to_string(),
            timeframe,
            setup: rule.name.to_string(),
            status: rule.status,
            pattern_sequence: window.sequence(rule.tags_used),
            current_tag: window.current,
            prior_tag: window.prior,
            prior2_tag: window.prior2,
            bar: window.bar.clone(),
        })
        .collect()
}

/// Evaluate the catalogue at the latest bar of a tagged series.
pub fn scan_latest(
    symbol: &str,
    timeframe: Timeframe,
    bars: &[Bar],
    tags: &[StratType],
) -> Vec<SignalMatch> {
    match MatchWindow::latest(bars, tags) {
        Some(window) => scan_window(symbol, timeframe, &window),
        None => Vec::new(),
    }
}
