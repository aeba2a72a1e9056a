//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use omen::{Bar, OhlcvSeries};

/// Daily bars from closes: high/low one unit around close, constant volume.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        })
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> OhlcvSeries {
    OhlcvSeries::new(bars_from_closes(closes)).unwrap()
}

/// `len` closes starting at `start`, moving `step` per bar.
pub fn linear(len: usize, start: f64, step: f64) -> Vec<f64> {
    (0..len).map(|i| start + i as f64 * step).collect()
}

/// 150 daily PETR4-like bars: a rally over the first 90 sessions, then a
/// decline.
pub fn petr4_daily() -> OhlcvSeries {
    let raw = include_str!("../fixtures/petr4_daily.json");
    let bars: Vec<Bar> = serde_json::from_str(raw).unwrap();
    OhlcvSeries::new(bars).unwrap()
}
