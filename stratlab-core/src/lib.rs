//! StratLab Core — the multi-timeframe classification pipeline.
//!
//! Pure functions over bar series, leaves first:
//! - Domain types (bars, timeframes, the Strat tag alphabet)
//! - Timeframe aggregation (trading-day blocks and calendar periods)
//! - Bar classification (ordered structural rules, shape detectors)
//! - Pattern catalogue (static setup table over trailing tags)
//! - Cross-timeframe signals (continuity and the triangle verdict)
//! - Performance and relative strength (calendar returns, two-pass ranking)
//!
//! Nothing in this crate performs I/O or owns persistence; the scanner crate
//! feeds it materialized series and carries its records outward.

pub mod aggregate;
pub mod classify;
pub mod domain;
pub mod patterns;
pub mod performance;
pub mod rs;
pub mod signals;

pub use aggregate::{aggregate, aggregate_ladder};
pub use classify::{classify, classify_series, is_hammer, is_shooter};
pub use domain::{Bar, StratType, Symbol, Timeframe};
pub use patterns::{scan_latest, scan_window, MatchWindow, SetupStatus, SignalMatch};
pub use performance::{DailyStats, PerformanceMetrics};
pub use rs::{percentile_rank, rank_snapshot, rs_raw, RsHorizon, RsPercentiles, RsRaw, RsSnapshot};
pub use signals::{continuity, ladder_colors, triangle, triangle_verdict, ContinuityVerdict};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the scanner shares across workers is
    /// Send + Sync. If any type loses the bound, the build breaks here.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Timeframe>();
        require_sync::<domain::Timeframe>();
        require_send::<domain::StratType>();
        require_sync::<domain::StratType>();

        require_send::<patterns::SignalMatch>();
        require_sync::<patterns::SignalMatch>();
        require_send::<patterns::SetupStatus>();
        require_sync::<patterns::SetupStatus>();

        require_send::<signals::ContinuityVerdict>();
        require_sync::<signals::ContinuityVerdict>();

        require_send::<performance::PerformanceMetrics>();
        require_sync::<performance::PerformanceMetrics>();
        require_send::<performance::DailyStats>();
        require_sync::<performance::DailyStats>();

        require_send::<rs::RsRaw>();
        require_sync::<rs::RsRaw>();
        require_send::<rs::RsPercentiles>();
        require_sync::<rs::RsPercentiles>();
        require_send::<rs::RsSnapshot>();
        require_sync::<rs::RsSnapshot>();
    }

    /// The classifier is a total function: for any pair it answers, and the
    /// answer never needs a panic path. This test documents the contract at
    /// the API level; the property tests drive it with generated bars.
    #[test]
    fn classification_is_total_over_the_api() {
        use chrono::NaiveDate;

        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bar = Bar {
            date,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: 0,
        };
        assert_eq!(classify(&bar, Some(&bar)), StratType::Unknown);
        assert_eq!(classify(&bar, None), StratType::Unknown);
    }
}
