//! Scoring engine scenarios

mod common;

use common::{bars_from_closes, linear, petr4_daily, series_from_closes};
use omen::{OhlcvSeries, Recommendation, ScoringEngine, ScoringParameters, SignalError, Strategy};

#[test]
fn test_linear_uptrend_scores_buy() {
    let series = series_from_closes(&linear(120, 100.0, 0.5));
    let outcome = ScoringEngine::evaluate(&series, &ScoringParameters::default()).unwrap();

    assert_eq!(outcome.recommendation, Recommendation::Buy);
    assert_eq!(outcome.confidence, 0.75);
    // no losses at all: RSI is undefined and scored as neutral
    assert_eq!(outcome.indicators.scalar("rsi"), Some(50.0));
    assert_eq!(outcome.rationale.len(), 2);
    assert!(outcome.rationale[0].starts_with("Bullish trend"));
    assert!(outcome.rationale[1].starts_with("Low volatility"));
}

#[test]
fn test_linear_downtrend_offsets_to_hold() {
    // bearish trend (-20) against oversold RSI (+15) and calm volatility (+5)
    let series = series_from_closes(&linear(120, 200.0, -0.5));
    let score = ScoringEngine::score(&series, &ScoringParameters::default()).unwrap();

    assert_eq!(score.inputs.rsi, 0.0);
    assert_eq!(score.score, 50.0);
    assert_eq!(score.recommendation, Recommendation::Hold);
    assert_eq!(score.contributions.len(), 3);
}

#[test]
fn test_flat_series_holds_at_half_confidence() {
    let series = series_from_closes(&[42.0; 120]);
    let outcome = ScoringEngine::evaluate(&series, &ScoringParameters::default()).unwrap();

    assert_eq!(outcome.recommendation, Recommendation::Hold);
    assert_eq!(outcome.confidence, 0.5);
    assert_eq!(outcome.rationale.len(), 1);
    assert_eq!(outcome.indicators.scalar("volatility"), Some(0.0));
}

#[test]
fn test_volume_spike_and_drought() {
    let mut bars = bars_from_closes(&[42.0; 60]);
    bars.last_mut().unwrap().volume = 3_000.0;
    let spike = ScoringEngine::score(&OhlcvSeries::new(bars).unwrap(), &ScoringParameters::default())
        .unwrap();
    assert_eq!(spike.score, 55.0);
    assert!(spike.inputs.volume_ratio > 1.2);

    let mut bars = bars_from_closes(&[42.0; 60]);
    bars.last_mut().unwrap().volume = 100.0;
    let drought = ScoringEngine::score(&OhlcvSeries::new(bars).unwrap(), &ScoringParameters::default())
        .unwrap();
    assert_eq!(drought.score, 45.0);
    assert_eq!(drought.confidence, 0.45);
}

#[test]
fn test_insufficient_history_is_validation_error() {
    let series = series_from_closes(&linear(30, 100.0, 0.5));
    let err = ScoringEngine::evaluate(&series, &ScoringParameters::default()).unwrap_err();
    match err {
        SignalError::Validation { field, .. } => assert_eq!(field, "long_window"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_shorter_windows_accept_shorter_history() {
    let params = ScoringParameters::builder()
        .short_window(5)
        .long_window(10)
        .rsi_period(5)
        .volume_window(5)
        .volatility_window(5)
        .build()
        .unwrap();
    assert_eq!(params.min_bars(), 10);

    let series = series_from_closes(&linear(12, 100.0, 1.0));
    let outcome = ScoringEngine::evaluate(&series, &params).unwrap();
    assert_eq!(outcome.recommendation, Recommendation::Buy);
}

#[test]
fn test_evaluation_is_deterministic() {
    let series = petr4_daily();
    let params = ScoringParameters::default();
    let first = ScoringEngine::evaluate(&series, &params).unwrap();
    let second = ScoringEngine::evaluate(&series, &params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_confidence_and_recommendation_agree_across_parameters() {
    let series = petr4_daily();
    for short in [3, 9, 14, 30] {
        for long in [10, 50, 120] {
            for rsi in [2, 14, 30] {
                let params = ScoringParameters::builder()
                    .short_window(short)
                    .long_window(long)
                    .rsi_period(rsi)
                    .build()
                    .unwrap();
                let result = ScoringEngine::score(&series, &params).unwrap();

                assert!((0.0..=100.0).contains(&result.score));
                assert!((0.0..=1.0).contains(&result.confidence));
                assert_eq!(result.confidence, (result.confidence * 100.0).round() / 100.0);
                match result.recommendation {
                    Recommendation::Buy => assert!(result.score >= 60.0),
                    Recommendation::Sell => assert!(result.score <= 40.0),
                    Recommendation::Hold => {
                        assert!(result.score > 40.0 && result.score < 60.0)
                    }
                }
            }
        }
    }
}

#[test]
fn test_snapshot_covers_scoring_inputs_and_extras() {
    let outcome = ScoringEngine::evaluate(&petr4_daily(), &ScoringParameters::default()).unwrap();
    for key in [
        "close", "sma_short", "sma_long", "rsi", "volume", "volume_ratio", "volatility",
    ] {
        let value = outcome.indicators.scalar(key).unwrap();
        assert!(value.is_finite(), "{key} not finite");
    }
    assert!(outcome.indicators.contains("macd"));
    assert!(outcome.indicators.contains("bollinger"));
    assert_eq!(outcome.indicators.scalar("close"), Some(25.24));
}

#[test]
fn test_every_strategy_handles_fixture() {
    let series = petr4_daily();
    for strategy in [
        Strategy::default(),
        Strategy::sma_crossover(),
        Strategy::rsi_threshold(),
        Strategy::Consensus,
    ] {
        let outcome = strategy.evaluate(&series).unwrap();
        assert!((0.0..=1.0).contains(&outcome.confidence), "{}", strategy.name());
        assert!(!outcome.rationale.is_empty());
        assert!(outcome.rationale.len() <= 3);
    }
}
