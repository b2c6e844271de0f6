//! Integration tests for the full classification pipeline.
//!
//! Tests:
//! 1. Ladder flow: aggregate -> classify -> match -> verdicts on one series
//! 2. Known sequences: hand-built bars produce the documented setups
//! 3. Graceful degradation: thin and empty histories stay well-defined
//! 4. Determinism: the whole pipeline reproduces itself exactly

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use stratlab_core::domain::{Bar, StratType, Timeframe};
use stratlab_core::{
    aggregate_ladder, classify_series, continuity, ladder_colors, rank_snapshot, rs_raw,
    scan_latest, triangle, ContinuityVerdict, DailyStats, PerformanceMetrics, RsSnapshot,
    SetupStatus,
};

/// Helper: deterministic wavy daily series on consecutive weekdays.
fn demo_series(n: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(n);
    let mut date = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut price = 100.0_f64;
    for i in 0..n {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += Duration::days(1);
        }
        let swing = (i as f64 * 0.7).sin() * 2.0 + ((i % 7) as f64 - 3.0) * 0.4;
        let open = price;
        let close = (price + swing).max(1.0);
        bars.push(Bar {
            date,
            open,
            high: open.max(close) + 0.8,
            low: (open.min(close) - 0.8).max(0.5),
            close,
            volume: 1_000 + (i as u64 % 17) * 100,
        });
        price = close;
        date += Duration::days(1);
    }
    bars
}

/// Helper: bar from explicit OHLC.
fn bar(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        date,
        open,
        high,
        low,
        close,
        volume: 10_000,
    }
}

#[test]
fn ladder_flow_stays_consistent_end_to_end() {
    let daily = demo_series(300);
    let ladder = aggregate_ladder(&daily);
    assert_eq!(ladder.len(), 10);

    for (tf, bars) in &ladder {
        let tags = classify_series(bars);
        assert_eq!(tags.len(), bars.len());
        assert_eq!(tags.first(), Some(&StratType::Unknown));
        // finite input never leaves the structural alphabet after bar 0
        for tag in &tags[1..] {
            assert_ne!(*tag, StratType::Unknown, "{tf} produced a hole");
        }

        for m in scan_latest("DEMO", *tf, bars, &tags) {
            assert_eq!(m.symbol, "DEMO");
            assert_eq!(m.timeframe, *tf);
            assert!(!m.pattern_sequence.is_empty() && m.pattern_sequence.len() <= 3);
            assert_eq!(m.pattern_sequence.last(), Some(&m.current_tag));
            assert_eq!(m.bar.date, bars.last().map(|b| b.date).unwrap());
        }
    }

    // verdicts agree with their own inputs
    let colors = ladder_colors(&ladder);
    assert_eq!(triangle(&colors), colors.windows(4).any(|w| {
        !w.contains(&0) && w[0] == w[3] && w.iter().filter(|&&c| c == w[0]).count() >= 3
    }));
    let verdict = continuity(&ladder);
    if verdict != ContinuityVerdict::Mixed {
        // a decisive verdict implies all three slots agree
        let m = colors[7];
        let w = colors[4];
        let d = colors[0];
        assert!(m == w && w == d && m != 0);
    }
}

#[test]
fn two_one_two_bullish_emerges_from_real_bars() {
    let d0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = vec![
        bar(d0, 100.0, 110.0, 90.0, 105.0),
        // red bar breaking the low: 2d
        bar(d0 + Duration::days(1), 95.0, 100.0, 85.0, 88.0),
        // inside the 2d bar: 1
        bar(d0 + Duration::days(2), 90.0, 96.0, 87.0, 92.0),
        // green bar breaking the inside bar's high: 2u
        bar(d0 + Duration::days(3), 92.0, 102.0, 88.0, 101.0),
    ];
    let tags = classify_series(&bars);
    assert_eq!(
        tags,
        vec![
            StratType::Unknown,
            StratType::TwoDown,
            StratType::Inside,
            StratType::TwoUp,
        ]
    );

    let matches = scan_latest("AAPL", Timeframe::Day1, &bars, &tags);
    let names: Vec<&str> = matches.iter().map(|m| m.setup.as_str()).collect();
    assert_eq!(names, vec!["2-1-2 Bullish"]);
    assert_eq!(matches[0].status, SetupStatus::InForce);
    assert_eq!(
        matches[0].pattern_sequence,
        vec![StratType::TwoDown, StratType::Inside, StratType::TwoUp]
    );
}

#[test]
fn inside_bar_setup_and_shape_fire_together() {
    let d0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = vec![
        bar(d0, 100.0, 120.0, 80.0, 110.0),
        // inside bar with a hammer shape: body 0.5 up top, long tail
        bar(d0 + Duration::days(1), 110.0, 111.0, 100.0, 110.5),
    ];
    let tags = classify_series(&bars);
    assert_eq!(tags[1], StratType::Inside);

    let matches = scan_latest("X", Timeframe::Day1, &bars, &tags);
    let names: Vec<&str> = matches.iter().map(|m| m.setup.as_str()).collect();
    assert!(names.contains(&"Inside Bar"));
    assert!(names.contains(&"Hammer"));
    for m in &matches {
        assert_eq!(m.status, SetupStatus::Setup);
    }
}

#[test]
fn thin_history_degrades_without_errors() {
    let daily = demo_series(3);
    let ladder = aggregate_ladder(&daily);

    // higher timeframes collapse to one bar and classify Unknown
    let yearly = &ladder[&Timeframe::Year1];
    assert_eq!(yearly.len(), 1);
    assert_eq!(classify_series(yearly), vec![StratType::Unknown]);

    let as_of = daily.last().map(|b| b.date).unwrap();
    let perf = PerformanceMetrics::compute(&daily, as_of);
    assert!(perf.wtd.is_finite());
    let stats = DailyStats::compute(&daily);
    assert_eq!(stats.perf_3m_pct, None);

    // empty input everywhere
    let empty = aggregate_ladder(&[]);
    assert!(empty.values().all(|bars| bars.is_empty()));
    assert_eq!(continuity(&empty), ContinuityVerdict::Mixed);
    assert!(!triangle(&ladder_colors(&empty)));
}

#[test]
fn benchmark_tracking_ticker_is_excluded_from_ranking() {
    let daily = demo_series(80);
    // a ticker that is the benchmark at half scale, tick for tick
    let scaled: Vec<Bar> = daily
        .iter()
        .map(|b| Bar {
            close: b.close * 0.5,
            open: b.open * 0.5,
            high: b.high * 0.5,
            low: b.low * 0.5,
            ..b.clone()
        })
        .collect();

    let raw = rs_raw(&scaled, &daily);
    assert!(raw.rs_1d.is_some());
    assert!(raw.rs_1m.is_some());
    assert!(raw.rs_1d.unwrap().abs() < 1e-9);

    let as_of = daily.last().map(|b| b.date).unwrap();
    let mut snapshot = RsSnapshot::new(Timeframe::Day1, as_of);
    snapshot.insert("MIRROR", raw);
    let ranked = rank_snapshot(&snapshot);
    assert_eq!(ranked["MIRROR"].rs_1d, None);
}

#[test]
fn pipeline_reproduces_itself() {
    let daily = demo_series(200);
    let run = |daily: &[Bar]| {
        let ladder = aggregate_ladder(daily);
        let mut all = Vec::new();
        for (tf, bars) in &ladder {
            let tags = classify_series(bars);
            all.extend(scan_latest("RPT", *tf, bars, &tags));
        }
        let colors = ladder_colors(&ladder);
        (all.len(), continuity(&ladder), triangle(&colors), colors)
    };
    assert_eq!(run(&daily), run(&daily));
}
